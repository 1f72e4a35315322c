// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use catalog_search::*;
use internal_error::ErrorIntoInternal;

use crate::{ResourceIndexerConfig, run_with_retry};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[dill::component(pub)]
#[dill::interface(dyn ResourceIndexer)]
pub struct ResourceIndexerImpl {
    config: Arc<ResourceIndexerConfig>,
    search_repo: Arc<dyn SearchIndexRepository>,
    document_provider: Arc<dyn ResourceDocumentProvider>,
    percolate_query_repo: Arc<dyn PercolateQueryRepository>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl ResourceIndexerImpl {
    async fn bulk_index_with_retry(
        &self,
        object_type: ObjectType,
        selector: IndexSelector,
        documents: Vec<SearchDocument>,
    ) -> Result<(), BulkIndexError> {
        let repo = Arc::clone(&self.search_repo);
        run_with_retry(self.config.retry_policy, BulkIndexError::is_transient, || {
            let repo = Arc::clone(&repo);
            let documents = documents.clone();
            async move { repo.bulk_index(object_type, selector, documents).await }
        })
        .await
    }

    /// Rebuilds one type's corpus behind its `reindexing` alias. Returns
    /// the staged backing index; the `default` alias is not touched here.
    #[tracing::instrument(
        level = "info",
        name = "ResourceIndexerImpl_stage_rebuild",
        skip_all,
        fields(object_type = %object_type)
    )]
    async fn stage_rebuild(&self, object_type: ObjectType) -> Result<String, IndexResourcesError> {
        let backing_index = self.search_repo.create_backing_index(object_type).await?;

        // The percolator corpus is the stored saved-search set, not catalog
        // resources; replay it from the database instead of the provider
        if object_type == ObjectType::Percolator {
            self.replay_percolate_queries().await?;
            return Ok(backing_index);
        }

        let ids = self.document_provider.all_resource_ids(object_type).await?;
        tracing::info!(
            backing_index,
            num_resources = ids.len(),
            "Staging full rebuild",
        );

        let mut pending: VecDeque<Vec<ResourceId>> = ids
            .chunks(self.config.indexing_chunk_size.max(1))
            .map(Vec::from)
            .collect();

        let mut join_set = tokio::task::JoinSet::new();
        let mut first_error: Option<IndexResourcesError> = None;

        while !pending.is_empty() || !join_set.is_empty() {
            while join_set.len() < self.config.max_concurrent_chunk_tasks {
                let Some(chunk) = pending.pop_front() else {
                    break;
                };

                let provider = Arc::clone(&self.document_provider);
                let repo = Arc::clone(&self.search_repo);
                let retry_policy = self.config.retry_policy;

                join_set.spawn(async move {
                    let documents = provider
                        .documents_for_resources(object_type, &chunk)
                        .await?;
                    let documents: Vec<_> = documents
                        .into_iter()
                        .map(ResourceDocument::into_search_document)
                        .collect();

                    run_with_retry(retry_policy, BulkIndexError::is_transient, || {
                        let repo = Arc::clone(&repo);
                        let documents = documents.clone();
                        async move {
                            repo.bulk_index(object_type, IndexSelector::Reindexing, documents)
                                .await
                        }
                    })
                    .await?;

                    Ok::<_, IndexResourcesError>(())
                });
            }

            if let Some(joined) = join_set.join_next().await {
                let result = match joined {
                    Ok(result) => result,
                    Err(join_error) => Err(IndexResourcesError::Internal(join_error.int_err())),
                };

                if let Err(e) = result {
                    tracing::error!(
                        error = ?e,
                        error_msg = %e,
                        "Rebuild chunk failed, draining remaining sub-tasks",
                    );
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                    pending.clear();
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(backing_index),
        }
    }

    /// Writes every stored saved-search into the active percolator aliases,
    /// which during a rebuild includes the freshly staged index
    async fn replay_percolate_queries(&self) -> Result<(), IndexResourcesError> {
        for source_type in SUBSCRIPTION_SOURCE_TYPES {
            for query in self
                .percolate_query_repo
                .list_by_source_type(source_type)
                .await?
            {
                self.search_repo.index_percolate_query(&query).await?;
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl ResourceIndexer for ResourceIndexerImpl {
    #[tracing::instrument(
        level = "info",
        name = "ResourceIndexerImpl_index_resources",
        skip_all,
        fields(object_type = %object_type, num_ids = ids.len())
    )]
    async fn index_resources(
        &self,
        object_type: ObjectType,
        ids: Vec<ResourceId>,
        selector: IndexSelector,
    ) -> Result<(), IndexResourcesError> {
        let documents = self
            .document_provider
            .documents_for_resources(object_type, &ids)
            .await?;

        // Requested resources the provider no longer serves (unpublished or
        // deleted since the event fired) leave the index instead
        let mut missing: BTreeSet<ResourceId> = ids.iter().copied().collect();
        for document in &documents {
            missing.remove(&document.id);
        }

        if !documents.is_empty() {
            let documents: Vec<_> = documents
                .into_iter()
                .map(ResourceDocument::into_search_document)
                .collect();
            self.bulk_index_with_retry(object_type, selector, documents)
                .await?;
        }

        if !missing.is_empty() {
            self.deindex_resources(object_type, missing.into_iter().collect())
                .await?;
        }

        Ok(())
    }

    #[tracing::instrument(
        level = "info",
        name = "ResourceIndexerImpl_deindex_resources",
        skip_all,
        fields(object_type = %object_type, num_ids = ids.len())
    )]
    async fn deindex_resources(
        &self,
        object_type: ObjectType,
        ids: Vec<ResourceId>,
    ) -> Result<(), IndexResourcesError> {
        let doc_ids: Vec<String> = ids.iter().map(ToString::to_string).collect();

        let repo = Arc::clone(&self.search_repo);
        run_with_retry(self.config.retry_policy, BulkIndexError::is_transient, || {
            let repo = Arc::clone(&repo);
            let doc_ids = doc_ids.clone();
            async move { repo.bulk_deindex(object_type, doc_ids).await }
        })
        .await?;

        Ok(())
    }

    #[tracing::instrument(
        level = "info",
        name = "ResourceIndexerImpl_index_run_content_files",
        skip_all,
        fields(run_id)
    )]
    async fn index_run_content_files(
        &self,
        run_id: RunId,
        selector: IndexSelector,
    ) -> Result<(), IndexResourcesError> {
        let Some(documents) = self
            .document_provider
            .documents_for_run_content_files(run_id)
            .await?
        else {
            // Run vanished between the event and its processing
            return self.deindex_run_content_files(run_id).await;
        };

        if documents.is_empty() {
            return Ok(());
        }

        let documents: Vec<_> = documents
            .into_iter()
            .map(ContentFileDocument::into_search_document)
            .collect();

        self.bulk_index_with_retry(ContentFileDocument::PARENT_OBJECT_TYPE, selector, documents)
            .await?;

        Ok(())
    }

    #[tracing::instrument(
        level = "info",
        name = "ResourceIndexerImpl_deindex_run_content_files",
        skip_all,
        fields(run_id)
    )]
    async fn deindex_run_content_files(&self, run_id: RunId) -> Result<(), IndexResourcesError> {
        let repo = Arc::clone(&self.search_repo);
        run_with_retry(
            self.config.retry_policy,
            SearchBackendError::is_transient,
            || {
                let repo = Arc::clone(&repo);
                async move { repo.delete_children_by_run(run_id).await }
            },
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(level = "info", name = "ResourceIndexerImpl_reindex_all", skip_all)]
    async fn reindex_all(&self, object_types: Vec<ObjectType>) -> Result<(), ReindexAllError> {
        // An empty request means everything, the percolator index included
        let object_types: Vec<ObjectType> = if object_types.is_empty() {
            RESOURCE_OBJECT_TYPES
                .into_iter()
                .chain([ObjectType::Percolator])
                .collect()
        } else {
            object_types
        };

        // Stage every type first; aliases only move once the whole rebuild
        // succeeded, so a failed run leaves search traffic untouched
        let mut staged = Vec::new();
        for object_type in object_types {
            match self.stage_rebuild(object_type).await {
                Ok(backing_index) => staged.push((object_type, backing_index)),
                Err(source) => {
                    if let Err(e) = self.search_repo.delete_orphaned_indices().await {
                        tracing::error!(
                            error = ?e,
                            error_msg = %e,
                            "Failed to clean up after aborted rebuild",
                        );
                    }
                    return Err(ReindexAllError::TypeFailed {
                        object_type,
                        source,
                    });
                }
            }
        }

        for (object_type, backing_index) in staged {
            self.search_repo
                .switch_indices(&backing_index, object_type)
                .await?;
            tracing::info!(
                object_type = %object_type,
                backing_index,
                "Promoted rebuilt index",
            );
        }

        Ok(())
    }
}
