// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core value types: ids, geometry, provenance records and element descriptors.

pub mod descriptor;
pub mod geometry;
pub mod group_hash;
pub mod ids;
pub mod tagged;

pub use descriptor::ElementDescriptor;
pub use geometry::{Point, Rect, Size, Viewport};
pub use group_hash::group_id_for;
pub use ids::{GroupId, GroupIdError};
pub use tagged::{Provenance, SelectionKey, TaggedElement, UNKNOWN_LABEL};
