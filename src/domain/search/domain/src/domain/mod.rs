// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod catalog_search_request;
mod catalog_search_response;
mod object_type;
mod percolate_query;
mod resource_document;
mod retry_policy;
mod search_document;

pub use catalog_search_request::*;
pub use catalog_search_response::*;
pub use object_type::*;
pub use percolate_query::*;
pub use resource_document::*;
pub use retry_policy::*;
pub use search_document::*;
