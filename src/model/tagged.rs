// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use super::ids::GroupId;

/// Label reported for any provenance field the annotator did not stamp.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Source provenance read off a rendered element.
///
/// Every field is optional: the annotator may have skipped some, and the runtime never validates
/// them. Labels fall back to [`UNKNOWN_LABEL`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Provenance {
    pub component: Option<SmolStr>,
    pub file: Option<SmolStr>,
    pub line: Option<SmolStr>,
    pub group_id: Option<GroupId>,
}

impl Provenance {
    /// True when at least one descriptive field is present. A group id alone does not count.
    pub fn is_tagged(&self) -> bool {
        self.component.is_some() || self.file.is_some() || self.line.is_some()
    }

    pub fn component_label(&self) -> &str {
        self.component.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    pub fn file_label(&self) -> &str {
        self.file.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    pub fn line_label(&self) -> &str {
        self.line.as_deref().unwrap_or(UNKNOWN_LABEL)
    }
}

/// A live page node together with the provenance found on it.
///
/// `target` is a non-owning handle; the page may drop the node at any time.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedElement<N> {
    pub target: N,
    pub provenance: Provenance,
}

impl<N: Clone> TaggedElement<N> {
    pub fn key(&self) -> SelectionKey<N> {
        match &self.provenance.group_id {
            Some(group_id) => SelectionKey::Group(group_id.clone()),
            None => SelectionKey::Node(self.target.clone()),
        }
    }
}

/// Identity used for deduplicating selections and highlight sets.
///
/// Grouped elements dedupe by group id; ungrouped ones form a singleton group keyed by the node.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionKey<N> {
    Group(GroupId),
    Node(N),
}

impl<N> SelectionKey<N> {
    pub fn group_id(&self) -> Option<&GroupId> {
        match self {
            Self::Group(group_id) => Some(group_id),
            Self::Node(_) => None,
        }
    }
}
