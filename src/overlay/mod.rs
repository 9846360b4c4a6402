// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Everything the controller draws on top of the page.

pub mod frame;
pub mod highlight;
pub mod shim;
pub mod toolbar;

pub use frame::FrameGuard;
pub use highlight::{HighlightRenderer, MarkerStyle};
pub use shim::underlying_element_at;
pub use toolbar::{placement, Toolbar, ToolbarKeyAction};

/// Attribute carried by every overlay node; its value names the overlay's role.
pub const OVERLAY_ATTRIBUTE: &str = "data-raccoon-overlay";

pub(crate) const Z_LAYER: &str = "2147483645";
pub(crate) const Z_MARKERS: &str = "2147483646";
pub(crate) const Z_TOOLBAR: &str = "2147483647";

pub(crate) fn px(value: f64) -> String {
    format!("{value}px")
}
