// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;

use crate::{PercolateQuery, PercolateQueryId, SubscriptionSourceType, UserId};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Persistence of saved-search rows with the uniqueness invariant on
/// `(source_type, normalized original_query)`: upserting parameters that
/// normalize to an existing row's key returns that row instead of creating
/// a duplicate.
#[async_trait::async_trait]
pub trait PercolateQueryRepository: Send + Sync {
    async fn upsert_query(
        &self,
        source_type: SubscriptionSourceType,
        original_query: serde_json::Value,
        query: serde_json::Value,
        display_label: &str,
    ) -> Result<PercolateQuery, InternalError>;

    async fn get_by_id(&self, query_id: PercolateQueryId)
    -> Result<PercolateQuery, GetPercolateQueryError>;

    async fn get_by_ids(
        &self,
        query_ids: &[PercolateQueryId],
    ) -> Result<Vec<PercolateQuery>, InternalError>;

    async fn list_by_source_type(
        &self,
        source_type: SubscriptionSourceType,
    ) -> Result<Vec<PercolateQuery>, InternalError>;

    async fn add_user(
        &self,
        query_id: PercolateQueryId,
        user: UserId,
    ) -> Result<(), GetPercolateQueryError>;

    async fn remove_user(
        &self,
        query_id: PercolateQueryId,
        user: UserId,
    ) -> Result<(), GetPercolateQueryError>;

    /// Moves every subscriber of `from` onto `to` (set union)
    async fn move_users(
        &self,
        from: PercolateQueryId,
        to: PercolateQueryId,
    ) -> Result<(), GetPercolateQueryError>;

    async fn delete_query(&self, query_id: PercolateQueryId)
    -> Result<(), GetPercolateQueryError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug)]
pub enum GetPercolateQueryError {
    #[error("Percolate query '{query_id}' not found")]
    NotFound { query_id: PercolateQueryId },

    #[error(transparent)]
    Internal(#[from] InternalError),
}
