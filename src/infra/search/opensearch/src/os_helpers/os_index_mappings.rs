// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use catalog_search::ObjectType;

use crate::OpenSearchCatalogConfig;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Analyzer used for all searchable text so accented queries match
/// unaccented content and vice versa
pub(crate) const FOLDING_ANALYZER: &str = "folding";

/// Shingle analyzer backing the phrase suggesters
pub(crate) const TRIGRAM_ANALYZER: &str = "trigram";

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn analysis_settings() -> serde_json::Value {
    serde_json::json!({
        "analyzer": {
            FOLDING_ANALYZER: {
                "type": "custom",
                "tokenizer": "standard",
                "filter": ["lowercase", "asciifolding"],
            },
            TRIGRAM_ANALYZER: {
                "type": "custom",
                "tokenizer": "standard",
                "filter": ["lowercase", "shingle"],
            },
        },
        "filter": {
            "shingle": {
                "type": "shingle",
                "min_shingle_size": 2,
                "max_shingle_size": 3,
            },
        },
    })
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Properties shared by every resource index, and embedded verbatim into
/// the percolator mapping so stored queries validate against the same
/// field set they will later match documents on
fn resource_properties() -> serde_json::Value {
    serde_json::json!({
        "id": {"type": "long"},
        "readable_id": {"type": "keyword"},
        "resource_type": {"type": "keyword"},
        "title": {
            "type": "text",
            "analyzer": FOLDING_ANALYZER,
            "fields": {
                "trigram": {"type": "text", "analyzer": TRIGRAM_ANALYZER},
                "raw": {"type": "keyword"},
            },
        },
        "description": {
            "type": "text",
            "analyzer": FOLDING_ANALYZER,
            "fields": {
                "trigram": {"type": "text", "analyzer": TRIGRAM_ANALYZER},
            },
        },
        "full_description": {"type": "text", "analyzer": FOLDING_ANALYZER},
        "platform": {"type": "keyword"},
        "offered_by": {"type": "keyword"},
        "professional": {"type": "boolean"},
        "certification": {"type": "keyword"},
        "resource_content_tags": {"type": "keyword"},
        "created_on": {"type": "date"},
        // include_in_root re-indexes these sub-fields on the parent
        // document, so the flat text multi_match reaches them without a
        // nested wrapper
        "topics": {
            "type": "nested",
            "include_in_root": true,
            "properties": {
                "name": {"type": "keyword"},
            },
        },
        "departments": {
            "type": "nested",
            "include_in_root": true,
            "properties": {
                "department_id": {"type": "keyword"},
                "name": {"type": "keyword"},
            },
        },
        "course": {
            "properties": {
                "course_numbers": {
                    "type": "nested",
                    "include_in_root": true,
                    "properties": {
                        "value": {
                            "type": "text",
                            "analyzer": FOLDING_ANALYZER,
                            "fields": {"raw": {"type": "keyword"}},
                        },
                        "listing_type": {"type": "keyword"},
                        "primary": {"type": "boolean"},
                        "sort_coursenum": {"type": "keyword"},
                    },
                },
            },
        },
        "runs": {
            "type": "nested",
            "properties": {
                "run_id": {"type": "long"},
                "year": {"type": "integer"},
                "semester": {"type": "keyword"},
                "level": {"type": "keyword"},
                "instructors": {
                    "type": "nested",
                    "properties": {
                        "first_name": {"type": "text", "analyzer": FOLDING_ANALYZER},
                        "last_name": {"type": "text", "analyzer": FOLDING_ANALYZER},
                        "full_name": {"type": "text", "analyzer": FOLDING_ANALYZER},
                    },
                },
            },
        },
        // Content-file children live in the parent's index
        "key": {"type": "keyword"},
        "run_id": {"type": "long"},
        "content_type": {"type": "keyword"},
        "content_title": {
            "type": "text",
            "analyzer": FOLDING_ANALYZER,
            "fields": {
                "trigram": {"type": "text", "analyzer": TRIGRAM_ANALYZER},
            },
        },
        "content": {"type": "text", "analyzer": FOLDING_ANALYZER},
        "url": {"type": "keyword"},
        "relation_type": {
            "type": "join",
            "relations": {"resource": "content_file"},
        },
    })
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Full creation body of a backing index: analysis + shard settings, and a
/// mapping that for the percolator index also carries the `query` field
/// stored queries are parsed into
pub(crate) fn index_body(
    object_type: ObjectType,
    config: &OpenSearchCatalogConfig,
) -> serde_json::Value {
    let mut properties = resource_properties();

    if object_type == ObjectType::Percolator {
        properties["query"] = serde_json::json!({"type": "percolator"});
    }

    serde_json::json!({
        "settings": {
            "number_of_shards": config.shard_count,
            "number_of_replicas": config.replica_count,
            "analysis": analysis_settings(),
        },
        "mappings": {
            "properties": properties,
        },
    })
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
