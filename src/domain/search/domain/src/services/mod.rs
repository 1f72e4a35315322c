// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod catalog_search_service;
mod digest;
mod resource_change_listener;
mod resource_document_provider;
mod resource_indexer;
mod subscription_matcher;

pub use catalog_search_service::*;
pub use digest::*;
pub use resource_change_listener::*;
pub use resource_document_provider::*;
pub use resource_indexer::*;
pub use subscription_matcher::*;
