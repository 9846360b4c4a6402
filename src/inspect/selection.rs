// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{SelectionKey, TaggedElement};

/// A tagged element admitted into the selection set.
pub type SelectionEntry<N> = TaggedElement<N>;

/// Ordered selection set, deduplicated by [`SelectionKey`].
///
/// Grouped entries dedupe by group id (selecting any member of a list selects the list entry);
/// ungrouped entries dedupe by node identity. Insertion order is the submission order.
#[derive(Debug, Clone)]
pub struct Selection<N> {
    entries: Vec<SelectionEntry<N>>,
}

impl<N> Default for Selection<N> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<N: Clone + PartialEq> Selection<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SelectionEntry<N>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &SelectionKey<N>) -> bool {
        self.position(key).is_some()
    }

    /// Adds `entry` unless its key is already selected. Returns whether it was added.
    pub fn insert(&mut self, entry: SelectionEntry<N>) -> bool {
        if self.contains(&entry.key()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn remove(&mut self, key: &SelectionKey<N>) -> Option<SelectionEntry<N>> {
        self.position(key).map(|pos| self.entries.remove(pos))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keeps entries for which `keep` returns true, handing out mutable access so callers can
    /// re-point an entry at a different live member. Returns the keys that were dropped.
    pub fn retain_mut(
        &mut self,
        mut keep: impl FnMut(&mut SelectionEntry<N>) -> bool,
    ) -> Vec<SelectionKey<N>> {
        let mut dropped = Vec::new();
        self.entries.retain_mut(|entry| {
            let key = entry.key();
            let kept = keep(entry);
            if !kept {
                dropped.push(key);
            }
            kept
        });
        dropped
    }

    fn position(&self, key: &SelectionKey<N>) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.key() == key)
    }
}
