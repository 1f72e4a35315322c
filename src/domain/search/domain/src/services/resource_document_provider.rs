// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;

use crate::{ContentFileDocument, ObjectType, ResourceDocument, ResourceId, RunId};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Source of truth the indexer reads from. Backed by the catalog database
/// in production and by fixture providers in tests.
#[async_trait::async_trait]
pub trait ResourceDocumentProvider: Send + Sync {
    /// Ids of all published resources of a type, in ascending order, for
    /// chunked full-rebuild fetching
    async fn all_resource_ids(
        &self,
        object_type: ObjectType,
    ) -> Result<Vec<ResourceId>, InternalError>;

    /// Serialized documents for the given resources; unpublished or deleted
    /// resources are simply absent from the result
    async fn documents_for_resources(
        &self,
        object_type: ObjectType,
        ids: &[ResourceId],
    ) -> Result<Vec<ResourceDocument>, InternalError>;

    /// Content-file documents of a run, or `None` when the run no longer
    /// exists
    async fn documents_for_run_content_files(
        &self,
        run_id: RunId,
    ) -> Result<Option<Vec<ContentFileDocument>>, InternalError>;
}
