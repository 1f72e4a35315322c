// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;

use catalog_search::RetryPolicy;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone)]
pub struct ResourceIndexerConfig {
    /// How many resource ids are fetched and serialized per bulk write
    pub indexing_chunk_size: usize,

    /// Upper bound on chunk sub-tasks in flight during a full rebuild
    pub max_concurrent_chunk_tasks: usize,

    pub retry_policy: RetryPolicy,
}

impl Default for ResourceIndexerConfig {
    fn default() -> Self {
        Self {
            indexing_chunk_size: 100,
            max_concurrent_chunk_tasks: 4,
            retry_policy: RetryPolicy::default(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone)]
pub struct SubscriptionMatcherConfig {
    /// Base URL the digest links back to, with the saved search's surviving
    /// parameters appended as a query string
    pub saved_search_base_url: String,

    /// Raw facet value -> human-readable digest section heading; values
    /// missing from the map fall back to the raw string
    pub facet_display_names: BTreeMap<String, String>,
}

impl Default for SubscriptionMatcherConfig {
    fn default() -> Self {
        Self {
            saved_search_base_url: "https://learn.example.org/search".to_string(),
            facet_display_names: BTreeMap::new(),
        }
    }
}
