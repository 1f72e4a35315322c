// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// The unit the bulk chunker batches: an opaque JSON source plus the
/// engine-level identity and an optional shard-routing hint.
///
/// Child documents (content files) set `routing` to their parent resource id
/// so they co-locate with the parent for join-style queries.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SearchDocument {
    pub id: String,
    pub routing: Option<String>,
    pub source: serde_json::Value,
}

impl SearchDocument {
    pub fn new(id: impl Into<String>, source: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            routing: None,
            source,
        }
    }

    pub fn with_routing(mut self, routing: impl Into<String>) -> Self {
        self.routing = Some(routing.into());
        self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
