// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;

use crate::{
    CatalogSearchRequest,
    GetPercolateQueryError,
    ObjectType,
    PercolateQuery,
    PercolateQueryId,
    ResourceId,
    SearchBackendError,
    SubscriptionSourceType,
    UserId,
};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Saved-search subscriptions backed by percolation: registration
/// consolidates equivalent searches onto one stored query, matching answers
/// "who cares about this new resource"
#[async_trait::async_trait]
pub trait SubscriptionMatcher: Send + Sync {
    /// Subscribes the user to the search described by `original`. Parameter
    /// sets that normalize identically share a single stored query.
    async fn register_saved_search(
        &self,
        user: UserId,
        source_type: SubscriptionSourceType,
        original: &CatalogSearchRequest,
        display_label: &str,
    ) -> Result<PercolateQuery, RegisterSavedSearchError>;

    /// Removes the user from the stored query; the query itself (and its
    /// percolator document) is deleted once its last subscriber leaves
    async fn unsubscribe(
        &self,
        user: UserId,
        query_id: PercolateQueryId,
    ) -> Result<(), UnsubscribeError>;

    /// Percolates the resource's document and expands the matching stored
    /// queries into one row per (subscriber, query)
    async fn match_resource(
        &self,
        object_type: ObjectType,
        id: ResourceId,
    ) -> Result<Vec<PercolateMatchRow>, MatchResourceError>;

    /// Rebuilds channel-derived subscriptions from the channel list,
    /// merging duplicate rows onto the lowest-id canonical query and
    /// deleting the rest
    async fn realign_channel_subscriptions(&self)
    -> Result<RealignmentReport, RealignSubscriptionsError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// One (subscriber, matched query) pair for a freshly indexed resource
#[derive(Debug, Clone, PartialEq)]
pub struct PercolateMatchRow {
    pub user: UserId,
    pub query_id: PercolateQueryId,
    pub source_type: SubscriptionSourceType,

    /// Digest section heading inferred from the query's most specific facet
    pub group_label: String,

    /// Link back to the saved search in the catalog UI
    pub source_url: String,

    pub resource: serde_json::Value,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealignmentReport {
    pub queries_merged: usize,
    pub queries_deleted: usize,
    pub users_moved: usize,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug)]
pub enum RegisterSavedSearchError {
    #[error(transparent)]
    Backend(#[from] SearchBackendError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[derive(thiserror::Error, Debug)]
pub enum UnsubscribeError {
    #[error(transparent)]
    NotFound(#[from] GetPercolateQueryError),

    #[error(transparent)]
    Backend(#[from] SearchBackendError),
}

#[derive(thiserror::Error, Debug)]
pub enum MatchResourceError {
    #[error(transparent)]
    Backend(#[from] SearchBackendError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[derive(thiserror::Error, Debug)]
pub enum RealignSubscriptionsError {
    #[error(transparent)]
    Backend(#[from] SearchBackendError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}
