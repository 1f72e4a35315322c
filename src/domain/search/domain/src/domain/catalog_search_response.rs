// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CatalogSearchResponse {
    pub took_ms: u64,
    pub timed_out: bool,
    pub total_hits: u64,
    pub hits: Vec<CatalogSearchHit>,

    /// Facet buckets passed through in engine shape for the API layer
    pub aggregations: Option<serde_json::Value>,

    /// Typo-tolerant phrase suggestions, already deduplicated and capped;
    /// empty when the hit count made suggesting pointless
    pub suggestions: Vec<String>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CatalogSearchHit {
    pub id: Option<String>,
    pub index: String,
    pub score: Option<f64>,
    pub source: Option<serde_json::Value>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
