// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone)]
pub struct OpenSearchCatalogConfig {
    pub url: url::Url,
    pub index_prefix: String,
    pub timeout_secs: u64,

    /// Documents per bulk write before size-based re-splitting kicks in
    pub indexing_chunk_size: usize,

    /// Serialized-size ceiling of a single bulk request, in bytes
    pub max_request_size: usize,

    /// Phrase suggestions are suppressed when a query matches more
    /// documents than this; the query was specific enough already
    pub max_suggest_hits: u64,

    /// Suggestions returned per response after deduplication
    pub max_suggestions: usize,

    pub shard_count: u32,
    pub replica_count: u32,
}

impl Default for OpenSearchCatalogConfig {
    fn default() -> Self {
        Self {
            // Safety: the literal is a valid URL
            url: url::Url::parse("http://localhost:9200").unwrap(),
            index_prefix: "catalog".to_string(),
            timeout_secs: 30,
            indexing_chunk_size: 100,
            max_request_size: 10 * 1024 * 1024,
            max_suggest_hits: 1000,
            max_suggestions: 3,
            shard_count: 2,
            replica_count: 2,
        }
    }
}
