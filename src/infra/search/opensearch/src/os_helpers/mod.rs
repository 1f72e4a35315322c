// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

pub(crate) mod os_bulk;
pub(crate) mod os_index_mappings;
pub(crate) mod os_index_naming;
pub(crate) mod os_percolate;
pub(crate) mod os_query_builder;
