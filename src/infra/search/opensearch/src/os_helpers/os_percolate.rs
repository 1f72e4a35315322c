// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use catalog_search::CatalogSearchRequest;

use crate::os_helpers::os_query_builder::OsQueryBuilder;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Compiles saved-search parameters into the stored percolator query:
/// the regular query tree with every child-join clause stripped, since
/// percolation evaluates a single document and cannot execute joins.
pub(crate) fn compile_subscription_query(original: &CatalogSearchRequest) -> serde_json::Value {
    let query = OsQueryBuilder::build_query(original);
    serde_json::json!({"query": remove_child_queries(&query)})
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Drops every `has_child` clause from a query tree, pruning any container
/// the removal emptied. A tree without such clauses comes back unchanged,
/// including legitimately empty leaves like `{"match_all": {}}`.
pub(crate) fn remove_child_queries(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (key, child) in map {
                if key == "has_child" {
                    continue;
                }
                let cleaned = remove_child_queries(child);
                if emptied_by_stripping(child, &cleaned) {
                    continue;
                }
                out.insert(key.clone(), cleaned);
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|item| (item, remove_child_queries(item)))
                .filter(|(item, cleaned)| !emptied_by_stripping(item, cleaned))
                .map(|(_, cleaned)| cleaned)
                .collect(),
        ),
        other => other.clone(),
    }
}

/// An empty container is only pruned when stripping made it empty; an
/// originally-empty node is part of the query's meaning
fn emptied_by_stripping(original: &serde_json::Value, cleaned: &serde_json::Value) -> bool {
    let cleaned_empty = match cleaned {
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    };
    let original_empty = match original {
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    };
    cleaned_empty && !original_empty
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Inverted search body: which stored queries match this document
pub(crate) fn percolate_body(document: &serde_json::Value, size: usize) -> serde_json::Value {
    serde_json::json!({
        "query": {
            "percolate": {
                "field": "query",
                "document": document,
            }
        },
        "_source": false,
        "size": size,
    })
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
