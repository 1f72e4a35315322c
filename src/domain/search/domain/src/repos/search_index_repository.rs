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
    CatalogSearchResponse,
    IndexSelector,
    ObjectType,
    PercolateQuery,
    PercolateQueryId,
    RunId,
    SearchDocument,
};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Gateway to the document-search engine: alias-managed index lifecycle,
/// chunked bulk writes, query execution, and percolation.
#[async_trait::async_trait]
pub trait SearchIndexRepository: Send + Sync {
    async fn cluster_health(&self) -> Result<serde_json::Value, SearchBackendError>;

    /// Creates a fresh backing index with mappings/analyzers and points the
    /// `reindexing` alias at it (detaching the alias from any previous
    /// target first, without deleting those indices). Returns the new
    /// backing index name.
    async fn create_backing_index(&self, object_type: ObjectType)
    -> Result<String, SearchBackendError>;

    /// Atomically moves the `default` (and cross-type `all`) alias onto the
    /// new backing index, refreshes it, deletes the orphaned old backing
    /// index(es), and removes the graduated `reindexing` alias.
    async fn switch_indices(
        &self,
        new_backing_index: &str,
        object_type: ObjectType,
    ) -> Result<(), SearchBackendError>;

    /// Recovery sweep after failed/aborted rebuilds: strips stale
    /// `reindexing` aliases and deletes backing indices left with no
    /// aliases at all.
    async fn delete_orphaned_indices(&self) -> Result<(), SearchBackendError>;

    /// Alias names that actually exist for the requested types/selector,
    /// current before reindexing per type
    async fn active_aliases(
        &self,
        object_types: &[ObjectType],
        selector: IndexSelector,
    ) -> Result<Vec<String>, SearchBackendError>;

    /// Upserts documents in size-bounded batches into every active alias
    /// for the type/selector
    async fn bulk_index(
        &self,
        object_type: ObjectType,
        selector: IndexSelector,
        documents: Vec<SearchDocument>,
    ) -> Result<(), BulkIndexError>;

    /// Deletes documents by id; absent documents count as success
    async fn bulk_deindex(
        &self,
        object_type: ObjectType,
        ids: Vec<String>,
    ) -> Result<(), BulkIndexError>;

    /// Deletes a run's child documents by query; works even after the run's
    /// content list is gone from the catalog database
    async fn delete_children_by_run(&self, run_id: RunId) -> Result<(), SearchBackendError>;

    async fn documents_of_kind(&self, object_type: ObjectType) -> Result<u64, SearchBackendError>;

    async fn search(
        &self,
        req: &CatalogSearchRequest,
    ) -> Result<CatalogSearchResponse, SearchBackendError>;

    /// Compiles saved-search parameters into the engine query tree with all
    /// child-join clauses stripped (percolators cannot execute joins)
    fn build_subscription_query(&self, original: &CatalogSearchRequest) -> serde_json::Value;

    async fn index_percolate_query(&self, query: &PercolateQuery)
    -> Result<(), SearchBackendError>;

    async fn deindex_percolate_query(
        &self,
        query_id: PercolateQueryId,
    ) -> Result<(), SearchBackendError>;

    /// Inverted search: which stored queries does this document satisfy.
    /// Malformed stored queries are skipped by the implementation, not
    /// surfaced as errors.
    async fn percolate_document(
        &self,
        document: &serde_json::Value,
    ) -> Result<Vec<PercolateQueryId>, SearchBackendError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug)]
pub enum SearchBackendError {
    /// Connection refused / timed out; safe to retry with backoff
    #[error("Search backend unreachable: {reason}")]
    Transient { reason: String },

    /// Engine rejected the request (invalid query syntax, mapping conflict);
    /// surfaced to the caller with the same meaning, never retried
    #[error("Search request rejected: {reason}")]
    BadRequest { reason: String },

    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl SearchBackendError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Aggregated per-item failures of a bulk write; a hard failure of the
/// indexing run
#[derive(thiserror::Error, Debug)]
#[error("Bulk indexing reported {} item error(s)", errors.len())]
pub struct ReindexError {
    pub errors: Vec<serde_json::Value>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug)]
pub enum BulkIndexError {
    #[error(transparent)]
    Reindex(#[from] ReindexError),

    #[error(transparent)]
    Backend(#[from] SearchBackendError),
}

impl BulkIndexError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Reindex(_) => false,
            Self::Backend(e) => e.is_transient(),
        }
    }
}
