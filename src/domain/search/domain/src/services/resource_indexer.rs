// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;

use crate::{BulkIndexError, IndexSelector, ObjectType, ResourceId, RunId, SearchBackendError};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Keeps the search indices in step with the catalog: incremental updates
/// into the live aliases and full zero-downtime rebuilds
#[async_trait::async_trait]
pub trait ResourceIndexer: Send + Sync {
    /// Fetches documents for the given resources and upserts them into the
    /// active aliases of their type
    async fn index_resources(
        &self,
        object_type: ObjectType,
        ids: Vec<ResourceId>,
        selector: IndexSelector,
    ) -> Result<(), IndexResourcesError>;

    async fn deindex_resources(
        &self,
        object_type: ObjectType,
        ids: Vec<ResourceId>,
    ) -> Result<(), IndexResourcesError>;

    /// Indexes a run's content files as child documents routed to their
    /// parent resource
    async fn index_run_content_files(
        &self,
        run_id: RunId,
        selector: IndexSelector,
    ) -> Result<(), IndexResourcesError>;

    /// Removes a run's content-file documents, e.g. when the run stops
    /// being the best run of its resource
    async fn deindex_run_content_files(&self, run_id: RunId) -> Result<(), IndexResourcesError>;

    /// Full rebuild behind the `reindexing` aliases followed by an atomic
    /// alias switch per type; on any failure nothing switches and the
    /// half-built indices are garbage-collected
    async fn reindex_all(&self, object_types: Vec<ObjectType>) -> Result<(), ReindexAllError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug)]
pub enum IndexResourcesError {
    #[error(transparent)]
    Bulk(#[from] BulkIndexError),

    #[error(transparent)]
    Backend(#[from] SearchBackendError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug)]
pub enum ReindexAllError {
    #[error("Rebuild of '{object_type}' failed: {source}")]
    TypeFailed {
        object_type: ObjectType,
        #[source]
        source: IndexResourcesError,
    },

    #[error(transparent)]
    Backend(#[from] SearchBackendError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}
