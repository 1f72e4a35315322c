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
use internal_error::{InternalError, ResultIntoInternal};

use crate::group_matches_into_digests;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Wires catalog lifecycle events to the index, the percolator, and digest
/// delivery. Registered explicitly at startup; replaces implicit
/// framework-level persistence hooks.
#[dill::component(pub)]
#[dill::interface(dyn ResourceChangeListener)]
pub struct SearchIndexingListenerImpl {
    indexer: Arc<dyn ResourceIndexer>,
    subscription_matcher: Arc<dyn SubscriptionMatcher>,
    digest_sender: Arc<dyn DigestSender>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl ResourceChangeListener for SearchIndexingListenerImpl {
    #[tracing::instrument(
        level = "info",
        name = "SearchIndexingListenerImpl_on_resource_upserted",
        skip_all,
        fields(object_type = %object_type, id)
    )]
    async fn on_resource_upserted(
        &self,
        object_type: ObjectType,
        id: ResourceId,
    ) -> Result<(), InternalError> {
        // `All` so an in-flight rebuild also receives the update
        self.indexer
            .index_resources(object_type, vec![id], IndexSelector::All)
            .await
            .int_err()?;

        let rows = self
            .subscription_matcher
            .match_resource(object_type, id)
            .await
            .int_err()?;

        if !rows.is_empty() {
            let digests = group_matches_into_digests(rows);
            self.digest_sender.send_digests(digests).await?;
        }

        Ok(())
    }

    #[tracing::instrument(
        level = "info",
        name = "SearchIndexingListenerImpl_on_resource_unpublished",
        skip_all,
        fields(object_type = %object_type, id)
    )]
    async fn on_resource_unpublished(
        &self,
        object_type: ObjectType,
        id: ResourceId,
    ) -> Result<(), InternalError> {
        self.indexer
            .deindex_resources(object_type, vec![id])
            .await
            .int_err()
    }

    #[tracing::instrument(
        level = "info",
        name = "SearchIndexingListenerImpl_on_resource_deleted",
        skip_all,
        fields(object_type = %object_type, id)
    )]
    async fn on_resource_deleted(
        &self,
        object_type: ObjectType,
        id: ResourceId,
    ) -> Result<(), InternalError> {
        self.indexer
            .deindex_resources(object_type, vec![id])
            .await
            .int_err()
    }

    #[tracing::instrument(
        level = "info",
        name = "SearchIndexingListenerImpl_on_run_upserted",
        skip_all,
        fields(run_id)
    )]
    async fn on_run_upserted(&self, run_id: RunId) -> Result<(), InternalError> {
        self.indexer
            .index_run_content_files(run_id, IndexSelector::All)
            .await
            .int_err()
    }

    #[tracing::instrument(
        level = "info",
        name = "SearchIndexingListenerImpl_on_run_unpublished",
        skip_all,
        fields(run_id)
    )]
    async fn on_run_unpublished(&self, run_id: RunId) -> Result<(), InternalError> {
        self.indexer
            .deindex_run_content_files(run_id)
            .await
            .int_err()
    }
}
