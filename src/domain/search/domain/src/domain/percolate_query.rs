// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeSet;

use crate::UserId;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub type PercolateQueryId = i64;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionSourceType {
    SearchSubscription,
    ChannelSubscription,
}

/// Both saved-search flavors, iterated when the whole stored-query set has
/// to be replayed into a rebuilt percolator index
pub const SUBSCRIPTION_SOURCE_TYPES: [SubscriptionSourceType; 2] = [
    SubscriptionSourceType::SearchSubscription,
    SubscriptionSourceType::ChannelSubscription,
];

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// A persisted saved-search: the raw parameter dict a user saved
/// (`original_query`), the compiled engine query with child-join clauses
/// stripped (`query`), and the subscriber set.
///
/// Uniqueness invariant: `(source_type, normalized original_query)` —
/// duplicate saved searches consolidate their subscribers onto one row.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PercolateQuery {
    pub id: PercolateQueryId,
    pub source_type: SubscriptionSourceType,
    pub original_query: serde_json::Value,
    pub query: serde_json::Value,
    pub display_label: String,
    pub users: BTreeSet<UserId>,
}

impl PercolateQuery {
    pub fn normalized_original_query(&self) -> serde_json::Value {
        normalize_original_query(&self.original_query)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Canonical form of a saved search's parameter dict, used as the
/// deduplication key across literally-different but equivalent saves:
/// empty/null parameters are dropped, scalars fold into single-element
/// lists, list values are sorted, and the `endpoint` marker param is
/// ignored entirely.
pub fn normalize_original_query(original: &serde_json::Value) -> serde_json::Value {
    let serde_json::Value::Object(params) = original else {
        return original.clone();
    };

    let mut normalized = serde_json::Map::new();
    for (key, value) in params {
        if key == "endpoint" {
            continue;
        }

        let values = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::String(s) if s.is_empty() => continue,
            serde_json::Value::Array(items) if items.is_empty() => continue,
            serde_json::Value::Array(items) => {
                let mut items = items.clone();
                items.sort_by_key(serde_json::Value::to_string);
                items
            }
            scalar => vec![scalar.clone()],
        };

        normalized.insert(key.clone(), serde_json::Value::Array(values));
    }

    serde_json::Value::Object(normalized)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
