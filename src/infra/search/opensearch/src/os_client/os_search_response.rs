// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;

use catalog_search::{CatalogSearchHit, CatalogSearchResponse};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Engine-shaped search response, kept intentionally partial: only the
/// parts the catalog consumes are deserialized, the rest is ignored.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct OsSearchResponse {
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
    pub hits: OsHits,
    #[serde(default)]
    pub aggregations: Option<serde_json::Value>,
    #[serde(default)]
    pub suggest: Option<BTreeMap<String, Vec<OsSuggest>>>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct OsHits {
    pub total: OsTotal,
    #[serde(default)]
    pub hits: Vec<OsHit>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct OsTotal {
    pub value: u64,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct OsHit {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_score")]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Option<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct OsSuggest {
    #[allow(dead_code)]
    pub text: String,
    #[serde(default)]
    pub options: Vec<OsSuggestOption>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct OsSuggestOption {
    pub text: String,
    pub score: f64,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl OsSearchResponse {
    pub fn into_catalog_response(
        self,
        max_suggest_hits: u64,
        max_suggestions: usize,
    ) -> CatalogSearchResponse {
        let suggestions = extract_suggestions(
            self.suggest.as_ref(),
            self.hits.total.value,
            max_suggest_hits,
            max_suggestions,
        );

        CatalogSearchResponse {
            took_ms: self.took,
            timed_out: self.timed_out,
            total_hits: self.hits.total.value,
            hits: self
                .hits
                .hits
                .into_iter()
                .map(|hit| CatalogSearchHit {
                    id: hit.id,
                    index: hit.index,
                    score: hit.score,
                    source: hit.source,
                })
                .collect(),
            aggregations: self.aggregations,
            suggestions,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Merges per-field suggesters into one ranked list. A query that already
/// found plenty of results gets no suggestions: they would only second-guess
/// a search that worked.
fn extract_suggestions(
    suggest: Option<&BTreeMap<String, Vec<OsSuggest>>>,
    total_hits: u64,
    max_suggest_hits: u64,
    max_suggestions: usize,
) -> Vec<String> {
    let Some(suggest) = suggest else {
        return Vec::new();
    };
    if total_hits > max_suggest_hits {
        return Vec::new();
    }

    // Sum scores across suggesters so a phrase both fields agree on ranks
    // above a single-field candidate
    let mut scores: BTreeMap<String, f64> = BTreeMap::new();
    for entries in suggest.values() {
        for entry in entries {
            for option in &entry.options {
                *scores.entry(option.text.clone()).or_default() += option.score;
            }
        }
    }

    let mut ranked: Vec<(String, f64)> = scores.into_iter().collect();
    ranked.sort_by(|(a_text, a_score), (b_text, b_score)| {
        b_score
            .partial_cmp(a_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a_text.cmp(b_text))
    });

    ranked
        .into_iter()
        .take(max_suggestions)
        .map(|(text, _)| text)
        .collect()
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
