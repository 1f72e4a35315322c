// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use catalog_search::{CatalogSearchRequest, FacetField};

use crate::os_helpers::os_index_mappings::TRIGRAM_ANALYZER;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Bucket ceiling for facet aggregations; facet cardinality is far below
/// this in practice
const AGGREGATION_SIZE: usize = 10_000;

const SOURCE_EXCLUDES: [&str; 2] = ["content", "course.course_numbers.sort_coursenum"];

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub(crate) struct OsQueryBuilder {}

impl OsQueryBuilder {
    pub fn build_search_body(req: &CatalogSearchRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "from": req.offset,
            "size": req.limit,
            "query": Self::build_query(req),
            "_source": {"excludes": SOURCE_EXCLUDES},
        });

        if let Some(post_filter) = Self::post_filter(req) {
            body["post_filter"] = post_filter;
        }

        if let Some(aggregations) = Self::aggregations(req) {
            body["aggs"] = aggregations;
        }

        if let Some(q) = Self::normalized_text(req) {
            body["suggest"] = Self::suggest(&q);
        }

        if let Some(sortby) = &req.sortby {
            body["sort"] = Self::sort(sortby);
        }

        body
    }

    /// The scoring query tree alone, without pagination/aggregation
    /// decoration. Also the part a percolated subscription stores.
    pub fn build_query(req: &CatalogSearchRequest) -> serde_json::Value {
        let mut filter = Vec::new();

        if !req.ids.is_empty() {
            filter.push(serde_json::json!({"terms": {"id": req.ids}}));
        }

        match Self::normalized_text(req) {
            Some(q) => {
                let clauses = Self::text_clauses(&q);

                // The same disjunction once in scoring context and once in
                // filter context: `should` next to `filter` is optional, so
                // without the duplicate a filtered query would match
                // everything
                filter.push(serde_json::json!({"bool": {"should": clauses.clone()}}));

                serde_json::json!({
                    "bool": {
                        "should": clauses,
                        "filter": filter,
                    }
                })
            }
            None if filter.is_empty() => serde_json::json!({"match_all": {}}),
            None => serde_json::json!({
                "bool": {
                    "must": {"match_all": {}},
                    "filter": filter,
                }
            }),
        }
    }

    /// Text query with curly quotes straightened so a phrase pasted from a
    /// word processor still triggers exact-phrase matching
    fn normalized_text(req: &CatalogSearchRequest) -> Option<String> {
        let q = req.q.as_deref()?.trim();
        if q.is_empty() {
            return None;
        }
        Some(
            q.replace(['\u{201C}', '\u{201D}'], "\"")
                .replace(['\u{2018}', '\u{2019}'], "'"),
        )
    }

    fn as_quoted_phrase(q: &str) -> Option<&str> {
        let inner = q.strip_prefix('"')?.strip_suffix('"')?;
        if inner.is_empty() { None } else { Some(inner) }
    }

    /// The `should` disjunction over everything searchable: top-level
    /// resource fields (nested sub-fields reach it through
    /// `include_in_root`), nested topics, a readable-id prefix wildcard,
    /// nested course numbers, run fields, doubly-nested instructors, and
    /// child content files
    fn text_clauses(q: &str) -> Vec<serde_json::Value> {
        let (query, match_type) = match Self::as_quoted_phrase(q) {
            Some(phrase) => (phrase, "phrase"),
            None => (q, "best_fields"),
        };

        vec![
            serde_json::json!({
                "multi_match": {
                    "query": query,
                    "type": match_type,
                    "fields": [
                        "title^3",
                        "description^2",
                        "full_description",
                        "topics.name",
                        "readable_id",
                        "platform",
                        "offered_by",
                        "departments.name",
                        "resource_content_tags",
                        "course.course_numbers.value",
                    ],
                }
            }),
            serde_json::json!({
                "nested": {
                    "path": "topics",
                    "query": {"match": {"topics.name": query}},
                }
            }),
            // Course codes are stored uppercase, so "6.00" or "6.00S" as
            // typed still prefix-matches
            serde_json::json!({
                "wildcard": {
                    "readable_id": {
                        "value": format!("{}*", query.to_uppercase()),
                        "case_insensitive": true,
                    }
                }
            }),
            serde_json::json!({
                "nested": {
                    "path": "course.course_numbers",
                    "query": {"match": {"course.course_numbers.value": query}},
                }
            }),
            serde_json::json!({
                "nested": {
                    "path": "runs",
                    "query": {
                        "multi_match": {
                            "query": query,
                            "type": match_type,
                            // Lenient: year is numeric and most queries are not
                            "lenient": true,
                            "fields": ["runs.year", "runs.semester", "runs.level"],
                        }
                    },
                }
            }),
            serde_json::json!({
                "nested": {
                    "path": "runs",
                    "query": {
                        "nested": {
                            "path": "runs.instructors",
                            "query": {
                                "multi_match": {
                                    "query": query,
                                    "type": match_type,
                                    "fields": [
                                        "runs.instructors.full_name^2",
                                        "runs.instructors.first_name",
                                        "runs.instructors.last_name",
                                    ],
                                }
                            },
                        }
                    },
                }
            }),
            serde_json::json!({
                "has_child": {
                    "type": "content_file",
                    "query": {
                        "multi_match": {
                            "query": query,
                            "type": match_type,
                            "fields": ["content", "content_title^2"],
                        }
                    },
                    "score_mode": "avg",
                }
            }),
        ]
    }

    /// Term filter of one facet: OR across its values, wrapped in `nested`
    /// when the facet lives in a nested sub-object
    fn facet_filter(req: &CatalogSearchRequest, facet: FacetField) -> serde_json::Value {
        let terms = serde_json::json!({
            "terms": {facet.field_path(): req.facet_values(facet)}
        });

        match facet.nested_path() {
            Some(path) => serde_json::json!({
                "nested": {"path": path, "query": terms}
            }),
            None => terms,
        }
    }

    /// AND across facets, OR within each. Applied as `post_filter` so
    /// aggregations run on the pre-filter result set.
    fn post_filter(req: &CatalogSearchRequest) -> Option<serde_json::Value> {
        let clauses: Vec<_> = req
            .active_facets()
            .into_iter()
            .map(|facet| Self::facet_filter(req, facet))
            .collect();

        if clauses.is_empty() {
            return None;
        }

        Some(serde_json::json!({"bool": {"must": clauses}}))
    }

    /// One sibling `filter` aggregation per requested facet, applying every
    /// active facet's filter except the aggregated facet's own. Counts of a
    /// facet's other values stay visible while it is filtered on.
    fn aggregations(req: &CatalogSearchRequest) -> Option<serde_json::Value> {
        if req.aggregations.is_empty() {
            return None;
        }

        let mut aggs = serde_json::Map::new();
        for facet in &req.aggregations {
            let sibling_filters: Vec<_> = req
                .active_facets()
                .into_iter()
                .filter(|active| active != facet)
                .map(|active| Self::facet_filter(req, active))
                .collect();

            let terms = serde_json::json!({
                "terms": {"field": facet.field_path(), "size": AGGREGATION_SIZE}
            });

            let inner = match facet.nested_path() {
                Some(path) => serde_json::json!({
                    "nested": {"path": path},
                    "aggs": {facet.to_string(): terms},
                }),
                None => terms,
            };

            aggs.insert(
                facet.to_string(),
                serde_json::json!({
                    "filter": {"bool": {"must": sibling_filters}},
                    "aggs": {facet.to_string(): inner},
                }),
            );
        }

        Some(serde_json::Value::Object(aggs))
    }

    /// `-` prefix sorts descending. A dotted sort key addresses a field
    /// inside a nested sub-object; the enclosing path is the `nested.path`
    /// qualifier the engine needs to pick the right value.
    fn sort(sortby: &str) -> serde_json::Value {
        let (field, order) = match sortby.strip_prefix('-') {
            Some(field) => (field, "desc"),
            None => (sortby, "asc"),
        };

        let order_body = match field.rsplit_once('.') {
            Some((path, _)) => serde_json::json!({"order": order, "nested": {"path": path}}),
            None => serde_json::json!({"order": order}),
        };

        serde_json::json!([{field: order_body}])
    }

    /// Phrase suggesters over the trigram-analyzed title/description
    /// shadow fields, each re-validated with a collate match so only
    /// phrases that actually occur in the corpus come back
    fn suggest(q: &str) -> serde_json::Value {
        let mut suggest = serde_json::Map::new();
        suggest.insert("text".to_string(), serde_json::json!(q));

        for field in ["title.trigram", "description.trigram"] {
            suggest.insert(
                field.to_string(),
                serde_json::json!({
                    "phrase": {
                        "field": field,
                        "analyzer": TRIGRAM_ANALYZER,
                        "confidence": 0.0001,
                        "max_errors": 3,
                        "collate": {
                            "query": {
                                "source": {
                                    "match_phrase": {"{{field_name}}": "{{suggestion}}"}
                                }
                            },
                            "params": {"field_name": field},
                            "prune": true,
                        },
                    }
                }),
            );
        }

        serde_json::Value::Object(suggest)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
