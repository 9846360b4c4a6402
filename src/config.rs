// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Controller configuration.
//!
//! Embedders usually take [`InspectConfig::default`]; the replay tool deserializes it from the
//! scenario's `config` section, where every field is optional.

use serde::Deserialize;

use crate::dom::Modifiers;

/// Name of the well-known flag marking a document that already hosts a controller.
pub const INSTALL_MARKER: &str = "__sourceSelectorInitialized";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    pub attributes: AttributeNames,
    pub toggle_modifier: ToggleModifier,
    pub abort_key: String,
    pub toolbar: ToolbarConfig,
    /// How long the empty-selection feedback stays visible.
    pub feedback_ms: f64,
    /// Attach a screenshot (or capture error) to every submitted element.
    pub capture_screenshots: bool,
    pub colors: OverlayColors,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            attributes: AttributeNames::default(),
            toggle_modifier: ToggleModifier::default(),
            abort_key: "Escape".to_owned(),
            toolbar: ToolbarConfig::default(),
            feedback_ms: 2000.0,
            capture_screenshots: false,
            colors: OverlayColors::default(),
        }
    }
}

/// Attribute names written by the build-time annotator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AttributeNames {
    pub file: String,
    pub line: String,
    pub component: String,
    pub group_id: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            file: "data-source-file".to_owned(),
            line: "data-source-line".to_owned(),
            component: "data-source-component".to_owned(),
            group_id: "data-raccoon-id".to_owned(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleModifier {
    #[default]
    Shift,
    Meta,
    Ctrl,
    Alt,
}

impl ToggleModifier {
    pub fn is_held(self, modifiers: Modifiers) -> bool {
        match self {
            Self::Shift => modifiers.shift,
            Self::Meta => modifiers.meta,
            Self::Ctrl => modifiers.ctrl,
            Self::Alt => modifiers.alt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToolbarConfig {
    /// Distance between the click point and the panel corner.
    pub offset: f64,
    /// Minimum gap kept between the panel and every viewport edge.
    pub edge_inset: f64,
    pub width: f64,
    /// Used when the host cannot measure the rendered panel.
    pub fallback_height: f64,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self { offset: 12.0, edge_inset: 8.0, width: 320.0, fallback_height: 104.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OverlayColors {
    pub accent: String,
    pub accent_strong: String,
    pub hover_fill: String,
    pub selected_fill: String,
}

impl Default for OverlayColors {
    fn default() -> Self {
        Self {
            accent: "#4d5fef".to_owned(),
            accent_strong: "#2f3fd0".to_owned(),
            hover_fill: "rgba(77, 95, 239, 0.08)".to_owned(),
            selected_fill: "rgba(77, 95, 239, 0.16)".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InspectConfig, ToggleModifier};
    use crate::dom::Modifiers;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: InspectConfig =
            serde_json::from_str(r#"{"toggle_modifier": "meta", "toolbar": {"offset": 4}}"#)
                .unwrap();
        assert_eq!(config.toggle_modifier, ToggleModifier::Meta);
        assert_eq!(config.toolbar.offset, 4.0);
        assert_eq!(config.toolbar.edge_inset, 8.0);
        assert_eq!(config.attributes.group_id, "data-raccoon-id");
        assert_eq!(config.abort_key, "Escape");
    }

    #[test]
    fn toggle_modifier_matches_only_its_key() {
        assert!(ToggleModifier::Shift.is_held(Modifiers::SHIFT));
        assert!(!ToggleModifier::Meta.is_held(Modifiers::SHIFT));
        assert!(!ToggleModifier::Shift.is_held(Modifiers::NONE));
    }
}
