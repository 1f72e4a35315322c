// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;

use crate::UserId;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// One subscriber's digest: sections in first-seen order, each holding the
/// resources that matched a saved search with that label
#[derive(Debug, Clone, PartialEq)]
pub struct UserDigest {
    pub user: UserId,
    pub sections: Vec<DigestSection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DigestSection {
    pub label: String,
    pub source_url: String,
    pub resources: Vec<serde_json::Value>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Delivery channel for assembled digests. The production implementation
/// renders and emails them; tests record them.
#[async_trait::async_trait]
pub trait DigestSender: Send + Sync {
    async fn send_digests(&self, digests: Vec<UserDigest>) -> Result<(), InternalError>;
}
