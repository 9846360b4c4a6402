// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reading the annotator's provenance off the page: nearest tagged ancestor, group members and
//! the selection set built from them.

pub mod grouping;
pub mod provenance;
pub mod selection;

pub use grouping::{members_for_key, members_of};
pub use provenance::{resolve, MAX_ANCESTOR_HOPS};
pub use selection::{Selection, SelectionEntry};
