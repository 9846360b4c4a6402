// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Grouping hash used by the build-time annotator.
//!
//! The runtime never computes group ids; it only compares them. This lives here so fixtures and
//! the replay tool can stamp synthetic documents exactly like the annotator would.

use super::ids::GroupId;

/// 32-bit rolling hash (`h = h * 31 + unit`, wrapping) over the UTF-16 code units of `input`,
/// reduced to its unsigned magnitude.
pub fn rolling_hash(input: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in input.encode_utf16() {
        hash = hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(i32::from(unit));
    }
    hash.unsigned_abs()
}

/// Lowercase base-36 rendering, `0` for zero.
pub fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::with_capacity(7);
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

pub fn group_id_for(file: &str, line: u32, column: u32) -> GroupId {
    // base-36 output is never empty and never contains whitespace.
    GroupId::from_hash(to_base36(rolling_hash(&format!("{file}:{line}:{column}"))))
}

#[cfg(test)]
mod tests {
    use super::{group_id_for, rolling_hash, to_base36};

    #[test]
    fn empty_input_hashes_to_zero() {
        assert_eq!(rolling_hash(""), 0);
        assert_eq!(to_base36(0), "0");
    }

    #[test]
    fn hash_matches_java_style_string_hash() {
        // "a" = 97, "ab" = 97 * 31 + 98
        assert_eq!(rolling_hash("a"), 97);
        assert_eq!(rolling_hash("ab"), 3105);
        assert_eq!(to_base36(3105), "2e9");
    }

    #[test]
    fn negative_hashes_use_their_magnitude() {
        // "polygenelubricants" wraps to i32::MIN in the Java string hash.
        assert_eq!(rolling_hash("polygenelubricants"), 2_147_483_648);
        assert_eq!(to_base36(2_147_483_648), "zik0zk");
    }

    #[test]
    fn group_ids_are_stable_per_location() {
        let a = group_id_for("src/Card.tsx", 10, 4);
        let b = group_id_for("src/Card.tsx", 10, 4);
        let c = group_id_for("src/Card.tsx", 11, 4);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
