// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use catalog_search::{DigestSection, PercolateMatchRow, UserDigest};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Stable two-level group-by: one digest per subscriber, one section per
/// group label within it, both in encounter order. A match of the same
/// resource against several of a user's saved searches lands in several
/// sections.
pub fn group_matches_into_digests(rows: Vec<PercolateMatchRow>) -> Vec<UserDigest> {
    let mut digests: Vec<UserDigest> = Vec::new();

    for row in rows {
        let digest_idx = match digests.iter().position(|d| d.user == row.user) {
            Some(idx) => idx,
            None => {
                digests.push(UserDigest {
                    user: row.user,
                    sections: Vec::new(),
                });
                digests.len() - 1
            }
        };

        let sections = &mut digests[digest_idx].sections;
        let section_idx = match sections.iter().position(|s| s.label == row.group_label) {
            Some(idx) => idx,
            None => {
                sections.push(DigestSection {
                    label: row.group_label,
                    source_url: row.source_url,
                    resources: Vec::new(),
                });
                sections.len() - 1
            }
        };

        sections[section_idx].resources.push(row.resource);
    }

    digests
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
