// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use rand::Rng;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

const HEX_ALPHABET: &[u8] = b"0123456789abcdef";

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Random lowercase-hex string, e.g. for unique backing index suffixes.
/// At 16 characters the collision probability is negligible, so callers
/// don't need a collision-retry loop.
pub fn get_random_hex_string(length: usize) -> String {
    get_random_string(HEX_ALPHABET, length)
}

pub fn get_random_string(alphabet: &[u8], length: usize) -> String {
    assert!(!alphabet.is_empty());

    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(alphabet[rng.gen_range(0..alphabet.len())]))
        .collect()
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
