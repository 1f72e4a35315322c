// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;

use crate::{CatalogSearchRequest, CatalogSearchResponse, SearchBackendError};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Front door for catalog search: validates the request, targets the active
/// aliases for the requested resource types, and post-processes suggestions
#[async_trait::async_trait]
pub trait CatalogSearchService: Send + Sync {
    async fn search(
        &self,
        req: CatalogSearchRequest,
    ) -> Result<CatalogSearchResponse, CatalogSearchError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug)]
pub enum CatalogSearchError {
    #[error("Invalid search request: {reason}")]
    InvalidRequest { reason: String },

    #[error(transparent)]
    Backend(#[from] SearchBackendError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}
