// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod catalog_search_service_impl;
mod config;
mod digest_grouping;
mod resource_indexer_impl;
mod retry;
mod search_indexing_listener_impl;
mod subscription_matcher_impl;

pub use catalog_search_service_impl::*;
pub use config::*;
pub use digest_grouping::*;
pub use resource_indexer_impl::*;
pub use retry::*;
pub use search_indexing_listener_impl::*;
pub use subscription_matcher_impl::*;
