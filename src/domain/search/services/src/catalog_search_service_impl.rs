// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use catalog_search::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[dill::component(pub)]
#[dill::interface(dyn CatalogSearchService)]
pub struct CatalogSearchServiceImpl {
    search_repo: Arc<dyn SearchIndexRepository>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl CatalogSearchServiceImpl {
    fn validate_request(req: &CatalogSearchRequest) -> Result<(), CatalogSearchError> {
        if req.limit == 0 {
            return Err(CatalogSearchError::InvalidRequest {
                reason: "limit must be positive".to_string(),
            });
        }
        if req.limit > MAX_SEARCH_PAGE_SIZE {
            return Err(CatalogSearchError::InvalidRequest {
                reason: format!("limit exceeds the maximum of {MAX_SEARCH_PAGE_SIZE}"),
            });
        }
        // The engine rejects result windows past this point, so fail fast
        // with a clear message instead
        if req
            .offset
            .checked_add(req.limit)
            .is_none_or(|window| window > MAX_SEARCH_PAGE_SIZE)
        {
            return Err(CatalogSearchError::InvalidRequest {
                reason: format!(
                    "offset + limit must not exceed the result window of {MAX_SEARCH_PAGE_SIZE}"
                ),
            });
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl CatalogSearchService for CatalogSearchServiceImpl {
    #[tracing::instrument(level = "debug", name = "CatalogSearchServiceImpl_search", skip_all)]
    async fn search(
        &self,
        req: CatalogSearchRequest,
    ) -> Result<CatalogSearchResponse, CatalogSearchError> {
        Self::validate_request(&req)?;

        let response = self.search_repo.search(&req).await?;

        tracing::debug!(
            total_hits = response.total_hits,
            num_suggestions = response.suggestions.len(),
            took_ms = response.took_ms,
            "Search executed",
        );

        Ok(response)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
