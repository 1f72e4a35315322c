// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use catalog_search::*;
use internal_error::InternalError;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn selector_name(selector: IndexSelector) -> &'static str {
    match selector {
        IndexSelector::Current => "current",
        IndexSelector::Reindexing => "reindexing",
        IndexSelector::All => "all",
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// FakeSearchIndexRepository
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Records every repository call as an event string; optionally fails bulk
/// writes for one object type to exercise abort paths.
pub struct FakeSearchIndexRepository {
    pub events: Arc<Mutex<Vec<String>>>,
    pub fail_bulk_for: Option<ObjectType>,
    pub percolator_ids: Mutex<BTreeSet<PercolateQueryId>>,
}

impl FakeSearchIndexRepository {
    pub fn new(events: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            events,
            fail_bulk_for: None,
            percolator_ids: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn failing_bulk_for(events: Arc<Mutex<Vec<String>>>, object_type: ObjectType) -> Self {
        Self {
            fail_bulk_for: Some(object_type),
            ..Self::new(events)
        }
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait::async_trait]
impl SearchIndexRepository for FakeSearchIndexRepository {
    async fn cluster_health(&self) -> Result<serde_json::Value, SearchBackendError> {
        Ok(serde_json::json!({"status": "green"}))
    }

    async fn create_backing_index(
        &self,
        object_type: ObjectType,
    ) -> Result<String, SearchBackendError> {
        self.record(format!("create_index:{object_type}"));
        Ok(format!("catalog_{object_type}_test"))
    }

    async fn switch_indices(
        &self,
        new_backing_index: &str,
        object_type: ObjectType,
    ) -> Result<(), SearchBackendError> {
        self.record(format!("switch:{object_type}:{new_backing_index}"));
        Ok(())
    }

    async fn delete_orphaned_indices(&self) -> Result<(), SearchBackendError> {
        self.record("delete_orphaned".to_string());
        Ok(())
    }

    async fn active_aliases(
        &self,
        object_types: &[ObjectType],
        selector: IndexSelector,
    ) -> Result<Vec<String>, SearchBackendError> {
        Ok(object_types
            .iter()
            .map(|t| format!("catalog_{t}_{}", selector_name(selector)))
            .collect())
    }

    async fn bulk_index(
        &self,
        object_type: ObjectType,
        selector: IndexSelector,
        documents: Vec<SearchDocument>,
    ) -> Result<(), BulkIndexError> {
        if self.fail_bulk_for == Some(object_type) {
            self.record(format!("bulk_index_failed:{object_type}"));
            return Err(BulkIndexError::Backend(SearchBackendError::BadRequest {
                reason: "mapping conflict".to_string(),
            }));
        }
        self.record(format!(
            "bulk_index:{object_type}:{}:{}",
            selector_name(selector),
            documents.len()
        ));
        Ok(())
    }

    async fn bulk_deindex(
        &self,
        object_type: ObjectType,
        ids: Vec<String>,
    ) -> Result<(), BulkIndexError> {
        self.record(format!("bulk_deindex:{object_type}:{}", ids.join(",")));
        Ok(())
    }

    async fn delete_children_by_run(&self, run_id: RunId) -> Result<(), SearchBackendError> {
        self.record(format!("delete_children:{run_id}"));
        Ok(())
    }

    async fn documents_of_kind(&self, _object_type: ObjectType) -> Result<u64, SearchBackendError> {
        Ok(0)
    }

    async fn search(
        &self,
        _req: &CatalogSearchRequest,
    ) -> Result<CatalogSearchResponse, SearchBackendError> {
        Ok(CatalogSearchResponse::default())
    }

    fn build_subscription_query(&self, original: &CatalogSearchRequest) -> serde_json::Value {
        serde_json::json!({
            "bool": {
                "must": [{"multi_match": {"query": original.q.clone().unwrap_or_default()}}],
            }
        })
    }

    async fn index_percolate_query(
        &self,
        query: &PercolateQuery,
    ) -> Result<(), SearchBackendError> {
        self.percolator_ids.lock().unwrap().insert(query.id);
        self.record(format!("percolate_index:{}", query.id));
        Ok(())
    }

    async fn deindex_percolate_query(
        &self,
        query_id: PercolateQueryId,
    ) -> Result<(), SearchBackendError> {
        self.percolator_ids.lock().unwrap().remove(&query_id);
        self.record(format!("percolate_deindex:{query_id}"));
        Ok(())
    }

    /// Every indexed percolator matches every document
    async fn percolate_document(
        &self,
        _document: &serde_json::Value,
    ) -> Result<Vec<PercolateQueryId>, SearchBackendError> {
        self.record("percolate_document".to_string());
        Ok(self.percolator_ids.lock().unwrap().iter().copied().collect())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// FakeResourceDocumentProvider
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Default)]
pub struct FakeResourceDocumentProvider {
    resources: Mutex<BTreeMap<ResourceId, ResourceDocument>>,
    run_content: Mutex<BTreeMap<RunId, Vec<ContentFileDocument>>>,
}

impl FakeResourceDocumentProvider {
    pub fn with_resources(resources: impl IntoIterator<Item = ResourceDocument>) -> Self {
        let this = Self::default();
        {
            let mut guard = this.resources.lock().unwrap();
            for doc in resources {
                guard.insert(doc.id, doc);
            }
        }
        this
    }

    pub fn add_run_content(&self, run_id: RunId, docs: Vec<ContentFileDocument>) {
        self.run_content.lock().unwrap().insert(run_id, docs);
    }

    pub fn remove_resource(&self, id: ResourceId) {
        self.resources.lock().unwrap().remove(&id);
    }
}

#[async_trait::async_trait]
impl ResourceDocumentProvider for FakeResourceDocumentProvider {
    async fn all_resource_ids(
        &self,
        object_type: ObjectType,
    ) -> Result<Vec<ResourceId>, InternalError> {
        Ok(self
            .resources
            .lock()
            .unwrap()
            .values()
            .filter(|doc| doc.resource_type == object_type.as_str())
            .map(|doc| doc.id)
            .collect())
    }

    async fn documents_for_resources(
        &self,
        object_type: ObjectType,
        ids: &[ResourceId],
    ) -> Result<Vec<ResourceDocument>, InternalError> {
        let guard = self.resources.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| guard.get(id))
            .filter(|doc| doc.resource_type == object_type.as_str())
            .cloned()
            .collect())
    }

    async fn documents_for_run_content_files(
        &self,
        run_id: RunId,
    ) -> Result<Option<Vec<ContentFileDocument>>, InternalError> {
        Ok(self.run_content.lock().unwrap().get(&run_id).cloned())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Fixtures
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub fn course_document(id: ResourceId, title: &str) -> ResourceDocument {
    ResourceDocument {
        id,
        readable_id: format!("course-{id}"),
        resource_type: "course".to_string(),
        title: title.to_string(),
        platform: Some("ocw".to_string()),
        offered_by: Some("OCW".to_string()),
        topics: vec![ResourceTopic {
            name: "Mathematics".to_string(),
        }],
        ..Default::default()
    }
}

pub fn program_document(id: ResourceId, title: &str) -> ResourceDocument {
    ResourceDocument {
        id,
        readable_id: format!("program-{id}"),
        resource_type: "program".to_string(),
        title: title.to_string(),
        ..Default::default()
    }
}
