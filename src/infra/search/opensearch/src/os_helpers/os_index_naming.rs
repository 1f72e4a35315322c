// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use catalog_search::ObjectType;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

// Physical indices are never addressed directly by readers or writers; each
// object type sits behind two generation aliases, plus one pair of
// cross-type aliases spanning every resource index.

pub(crate) const DEFAULT_SUFFIX: &str = "default";
pub(crate) const REINDEXING_SUFFIX: &str = "reindexing";

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub(crate) fn backing_index_name(prefix: &str, object_type: ObjectType, suffix: &str) -> String {
    format!("{prefix}_{object_type}_{suffix}")
}

pub(crate) fn alias_name(prefix: &str, object_type: ObjectType, is_reindexing: bool) -> String {
    let generation = if is_reindexing {
        REINDEXING_SUFFIX
    } else {
        DEFAULT_SUFFIX
    };
    format!("{prefix}_{object_type}_{generation}")
}

pub(crate) fn all_alias_name(prefix: &str, is_reindexing: bool) -> String {
    let generation = if is_reindexing {
        REINDEXING_SUFFIX
    } else {
        DEFAULT_SUFFIX
    };
    format!("{prefix}_all_{generation}")
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
