// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;

use crate::{ObjectType, ResourceId, RunId};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Catalog lifecycle hooks that keep the live indices current. Invoked by
/// the application layer whenever resources or runs change.
#[async_trait::async_trait]
pub trait ResourceChangeListener: Send + Sync {
    /// Resource created or updated while published
    async fn on_resource_upserted(
        &self,
        object_type: ObjectType,
        id: ResourceId,
    ) -> Result<(), InternalError>;

    /// Resource withdrawn from the catalog but not deleted
    async fn on_resource_unpublished(
        &self,
        object_type: ObjectType,
        id: ResourceId,
    ) -> Result<(), InternalError>;

    async fn on_resource_deleted(
        &self,
        object_type: ObjectType,
        id: ResourceId,
    ) -> Result<(), InternalError>;

    /// Run became (or stayed) the best run of its resource
    async fn on_run_upserted(&self, run_id: RunId) -> Result<(), InternalError>;

    /// Run unpublished or demoted; its content files leave the index
    async fn on_run_unpublished(&self, run_id: RunId) -> Result<(), InternalError>;
}
