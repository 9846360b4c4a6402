// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Group identifiers stamped by the build-time annotator.

use std::fmt;

use smol_str::SmolStr;

/// Grouping key shared by every node one source location rendered.
///
/// The value is opaque and only compared for equality. A key must be non-empty and free of
/// whitespace so it can be used inside an attribute selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(SmolStr);

impl GroupId {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, GroupIdError> {
        let raw = raw.as_ref();
        if raw.is_empty() {
            return Err(GroupIdError::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(GroupIdError::Whitespace);
        }
        Ok(Self(SmolStr::new(raw)))
    }

    /// Wraps a key produced by [`super::group_id_for`], which is always base36.
    pub(crate) fn from_hash(base36: String) -> Self {
        Self(SmolStr::from(base36))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for GroupId {
    type Err = GroupIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupIdError {
    Empty,
    Whitespace,
}

impl fmt::Display for GroupIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("group id is empty"),
            Self::Whitespace => f.write_str("group id contains whitespace"),
        }
    }
}

impl std::error::Error for GroupIdError {}
