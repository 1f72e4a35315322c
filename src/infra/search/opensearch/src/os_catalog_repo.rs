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
use dill::*;
use internal_error::InternalError;
use random_strings::get_random_hex_string;
use tokio::sync::OnceCell;

use crate::OpenSearchCatalogConfig;
use crate::os_client::OsClient;
use crate::os_helpers::os_bulk::{
    delete_body,
    extract_bulk_errors,
    index_body,
    plan_bulk_requests,
    plan_chunks,
};
use crate::os_helpers::os_index_mappings;
use crate::os_helpers::os_index_naming::{
    DEFAULT_SUFFIX,
    alias_name,
    all_alias_name,
    backing_index_name,
};
use crate::os_helpers::os_percolate::{compile_subscription_query, percolate_body};
use crate::os_helpers::os_query_builder::OsQueryBuilder;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

const BACKING_INDEX_SUFFIX_LENGTH: usize = 16;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// OpenSearch-backed implementation of the search gateway. Physical indices
/// stay hidden behind generation aliases, so rebuilds populate a fresh index
/// while readers keep hitting the old one until a single atomic alias swap.
pub struct OpenSearchCatalogRepo {
    config: Arc<OpenSearchCatalogConfig>,
    client: OnceCell<OsClient>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[component(pub)]
#[interface(dyn SearchIndexRepository)]
#[scope(Singleton)]
impl OpenSearchCatalogRepo {
    pub fn new(config: Arc<OpenSearchCatalogConfig>) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl OpenSearchCatalogRepo {
    async fn client(&self) -> Result<&OsClient, SearchBackendError> {
        self.client
            .get_or_try_init(|| async { OsClient::init(&self.config) })
            .await
    }

    fn prefix(&self) -> &str {
        &self.config.index_prefix
    }

    fn is_generation_alias(alias: &str, suffix: &str) -> bool {
        alias.ends_with(&format!("_{suffix}"))
    }

    /// Search targets: per-type `default` aliases when the request restricts
    /// resource types, the cross-type `all` alias otherwise
    fn search_targets(&self, req: &CatalogSearchRequest) -> Vec<String> {
        if req.resource_types.is_empty() {
            vec![all_alias_name(self.prefix(), false)]
        } else {
            req.resource_types
                .iter()
                .map(|object_type| alias_name(self.prefix(), *object_type, false))
                .collect()
        }
    }

    async fn bulk_write(
        &self,
        alias: &str,
        body: Vec<opensearch::http::request::JsonBody<serde_json::Value>>,
    ) -> Result<(), BulkIndexError> {
        let client = self.client().await?;

        let response = client.bulk(alias, body).await?;
        let errors = extract_bulk_errors(&response);
        if !errors.is_empty() {
            return Err(ReindexError { errors }.into());
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl SearchIndexRepository for OpenSearchCatalogRepo {
    #[tracing::instrument(level = "debug", name = "OpenSearchCatalogRepo_cluster_health", skip_all)]
    async fn cluster_health(&self) -> Result<serde_json::Value, SearchBackendError> {
        self.client().await?.cluster_health().await
    }

    #[tracing::instrument(
        level = "info",
        name = "OpenSearchCatalogRepo_create_backing_index",
        skip_all,
        fields(%object_type)
    )]
    async fn create_backing_index(
        &self,
        object_type: ObjectType,
    ) -> Result<String, SearchBackendError> {
        let client = self.client().await?;

        let suffix = get_random_hex_string(BACKING_INDEX_SUFFIX_LENGTH);
        let new_index = backing_index_name(self.prefix(), object_type, &suffix);

        client
            .create_index(&new_index, os_index_mappings::index_body(object_type, &self.config))
            .await?;

        // Detach the reindexing generation from whatever previous rebuild
        // left it on, then point it at the fresh index. The old targets keep
        // their other aliases and are not deleted here.
        let reindexing_alias = alias_name(self.prefix(), object_type, true);
        let all_reindexing_alias = all_alias_name(self.prefix(), true);

        let mut actions = Vec::new();
        for (index, aliases) in client.index_aliases().await? {
            if !aliases.contains(&reindexing_alias) {
                continue;
            }
            actions.push(serde_json::json!({
                "remove": {"index": index, "alias": reindexing_alias}
            }));
            if aliases.contains(&all_reindexing_alias) {
                actions.push(serde_json::json!({
                    "remove": {"index": index, "alias": all_reindexing_alias}
                }));
            }
        }

        actions.push(serde_json::json!({
            "add": {"index": new_index, "alias": reindexing_alias}
        }));
        if object_type != ObjectType::Percolator {
            actions.push(serde_json::json!({
                "add": {"index": new_index, "alias": all_reindexing_alias}
            }));
        }

        client.update_aliases(actions).await?;

        tracing::info!(index = %new_index, "Created backing index");
        Ok(new_index)
    }

    #[tracing::instrument(
        level = "info",
        name = "OpenSearchCatalogRepo_switch_indices",
        skip_all,
        fields(%new_backing_index, %object_type)
    )]
    async fn switch_indices(
        &self,
        new_backing_index: &str,
        object_type: ObjectType,
    ) -> Result<(), SearchBackendError> {
        let client = self.client().await?;

        let default_alias = alias_name(self.prefix(), object_type, false);
        let all_default_alias = all_alias_name(self.prefix(), false);

        let catalog = client.index_aliases().await?;
        let old_holders: Vec<_> = catalog
            .iter()
            .filter(|(index, aliases)| {
                index.as_str() != new_backing_index && aliases.contains(&default_alias)
            })
            .collect();

        // One atomic action set: readers observe either the old or the new
        // generation, never an alias-less gap or both at once
        let mut actions = vec![serde_json::json!({
            "add": {"index": new_backing_index, "alias": default_alias}
        })];
        if object_type != ObjectType::Percolator {
            actions.push(serde_json::json!({
                "add": {"index": new_backing_index, "alias": all_default_alias}
            }));
        }
        for (index, aliases) in &old_holders {
            actions.push(serde_json::json!({
                "remove": {"index": index, "alias": default_alias}
            }));
            if aliases.contains(&all_default_alias) {
                actions.push(serde_json::json!({
                    "remove": {"index": index, "alias": all_default_alias}
                }));
            }
        }
        client.update_aliases(actions).await?;

        client.refresh_index(new_backing_index).await?;

        for (index, _) in &old_holders {
            tracing::info!(%index, "Deleting superseded backing index");
            client.delete_index(index).await?;
        }

        // The new index has graduated; strip its reindexing-generation
        // aliases so the next rebuild starts from a clean slate
        let mut cleanup = vec![serde_json::json!({
            "remove": {
                "index": new_backing_index,
                "alias": alias_name(self.prefix(), object_type, true),
            }
        })];
        if object_type != ObjectType::Percolator {
            cleanup.push(serde_json::json!({
                "remove": {
                    "index": new_backing_index,
                    "alias": all_alias_name(self.prefix(), true),
                }
            }));
        }
        client.update_aliases(cleanup).await?;

        Ok(())
    }

    #[tracing::instrument(
        level = "info",
        name = "OpenSearchCatalogRepo_delete_orphaned_indices",
        skip_all
    )]
    async fn delete_orphaned_indices(&self) -> Result<(), SearchBackendError> {
        let client = self.client().await?;
        let catalog = client.index_aliases().await?;

        let own_prefix = format!("{}_", self.prefix());
        for (index, aliases) in catalog {
            if !index.starts_with(&own_prefix) {
                continue;
            }
            let serves_readers = aliases
                .iter()
                .any(|alias| Self::is_generation_alias(alias, DEFAULT_SUFFIX));
            if serves_readers {
                continue;
            }

            // Left behind by a failed or aborted rebuild: carries at most a
            // stale reindexing alias. Deletion drops its aliases with it.
            tracing::info!(%index, ?aliases, "Deleting orphaned backing index");
            client.delete_index(&index).await?;
        }

        Ok(())
    }

    async fn active_aliases(
        &self,
        object_types: &[ObjectType],
        selector: IndexSelector,
    ) -> Result<Vec<String>, SearchBackendError> {
        let client = self.client().await?;

        let mut aliases = Vec::new();
        for object_type in object_types {
            for is_reindexing in [false, true] {
                let wanted = if is_reindexing {
                    selector.wants_reindexing()
                } else {
                    selector.wants_current()
                };
                if !wanted {
                    continue;
                }

                let alias = alias_name(self.prefix(), *object_type, is_reindexing);
                if client.alias_exists(&alias).await? {
                    aliases.push(alias);
                }
            }
        }
        Ok(aliases)
    }

    #[tracing::instrument(
        level = "debug",
        name = "OpenSearchCatalogRepo_bulk_index",
        skip_all,
        fields(%object_type, ?selector, num_documents = documents.len())
    )]
    async fn bulk_index(
        &self,
        object_type: ObjectType,
        selector: IndexSelector,
        documents: Vec<SearchDocument>,
    ) -> Result<(), BulkIndexError> {
        if documents.is_empty() {
            return Ok(());
        }

        let aliases = self.active_aliases(&[object_type], selector).await?;
        let chunks = plan_chunks(
            documents,
            self.config.indexing_chunk_size,
            self.config.max_request_size,
        );

        for (alias, chunk) in plan_bulk_requests(&aliases, &chunks) {
            self.bulk_write(alias, index_body(chunk)).await?;
        }
        Ok(())
    }

    #[tracing::instrument(
        level = "debug",
        name = "OpenSearchCatalogRepo_bulk_deindex",
        skip_all,
        fields(%object_type, num_ids = ids.len())
    )]
    async fn bulk_deindex(
        &self,
        object_type: ObjectType,
        ids: Vec<String>,
    ) -> Result<(), BulkIndexError> {
        if ids.is_empty() {
            return Ok(());
        }

        let aliases = self
            .active_aliases(&[object_type], IndexSelector::All)
            .await?;
        for alias in &aliases {
            self.bulk_write(alias, delete_body(&ids)).await?;
        }
        Ok(())
    }

    #[tracing::instrument(
        level = "debug",
        name = "OpenSearchCatalogRepo_delete_children_by_run",
        skip_all,
        fields(%run_id)
    )]
    async fn delete_children_by_run(&self, run_id: RunId) -> Result<(), SearchBackendError> {
        // Child documents live in their parent course index; only they carry
        // a top-level run_id field, so the term query cannot hit resources
        let aliases = self
            .active_aliases(&[ContentFileDocument::PARENT_OBJECT_TYPE], IndexSelector::All)
            .await?;
        if aliases.is_empty() {
            return Ok(());
        }

        let targets: Vec<&str> = aliases.iter().map(String::as_str).collect();
        self.client()
            .await?
            .delete_by_query(
                &targets,
                serde_json::json!({"query": {"term": {"run_id": run_id}}}),
            )
            .await
    }

    async fn documents_of_kind(&self, object_type: ObjectType) -> Result<u64, SearchBackendError> {
        let client = self.client().await?;

        let alias = alias_name(self.prefix(), object_type, false);
        if !client.alias_exists(&alias).await? {
            return Ok(0);
        }
        client.count(&alias).await
    }

    #[tracing::instrument(level = "debug", name = "OpenSearchCatalogRepo_search", skip_all)]
    async fn search(
        &self,
        req: &CatalogSearchRequest,
    ) -> Result<CatalogSearchResponse, SearchBackendError> {
        let targets = self.search_targets(req);
        let target_refs: Vec<&str> = targets.iter().map(String::as_str).collect();

        let response = self
            .client()
            .await?
            .search(&target_refs, OsQueryBuilder::build_search_body(req))
            .await?;

        Ok(response
            .into_catalog_response(self.config.max_suggest_hits, self.config.max_suggestions))
    }

    fn build_subscription_query(&self, original: &CatalogSearchRequest) -> serde_json::Value {
        compile_subscription_query(original)
    }

    #[tracing::instrument(
        level = "debug",
        name = "OpenSearchCatalogRepo_index_percolate_query",
        skip_all,
        fields(query_id = %query.id)
    )]
    async fn index_percolate_query(
        &self,
        query: &PercolateQuery,
    ) -> Result<(), SearchBackendError> {
        let client = self.client().await?;

        let aliases = self
            .active_aliases(&[ObjectType::Percolator], IndexSelector::All)
            .await?;
        if aliases.is_empty() {
            // Reporting success here would silently lose the subscription
            return InternalError::bail(
                "Percolator index does not exist; run a full rebuild to provision it",
            )
            .map_err(Into::into);
        }

        let id = query.id.to_string();
        for alias in &aliases {
            client.put_document(alias, &id, query.query.clone()).await?;
        }
        Ok(())
    }

    #[tracing::instrument(
        level = "debug",
        name = "OpenSearchCatalogRepo_deindex_percolate_query",
        skip_all,
        fields(%query_id)
    )]
    async fn deindex_percolate_query(
        &self,
        query_id: PercolateQueryId,
    ) -> Result<(), SearchBackendError> {
        let client = self.client().await?;

        let aliases = self
            .active_aliases(&[ObjectType::Percolator], IndexSelector::All)
            .await?;
        let id = query_id.to_string();
        for alias in &aliases {
            client.delete_document(alias, &id).await?;
        }
        Ok(())
    }

    #[tracing::instrument(
        level = "debug",
        name = "OpenSearchCatalogRepo_percolate_document",
        skip_all
    )]
    async fn percolate_document(
        &self,
        document: &serde_json::Value,
    ) -> Result<Vec<PercolateQueryId>, SearchBackendError> {
        let aliases = self
            .active_aliases(&[ObjectType::Percolator], IndexSelector::Current)
            .await?;
        if aliases.is_empty() {
            return Ok(Vec::new());
        }

        let targets: Vec<&str> = aliases.iter().map(String::as_str).collect();
        let response = self
            .client()
            .await?
            .search(&targets, percolate_body(document, MAX_SEARCH_PAGE_SIZE))
            .await?;

        let mut query_ids = Vec::new();
        for hit in response.hits.hits {
            match hit.id.as_deref().map(str::parse::<PercolateQueryId>) {
                Some(Ok(query_id)) => query_ids.push(query_id),
                _ => {
                    tracing::warn!(
                        hit_id = ?hit.id,
                        "Skipping percolator hit with a non-numeric id",
                    );
                }
            }
        }
        Ok(query_ids)
    }
}
