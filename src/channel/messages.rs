// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Requests from the containing frame.
///
/// Only `type` is significant; any payload or other keys the sender attaches are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum Inbound {
    #[serde(rename = "ENABLE_SOURCE_SELECTOR")]
    Activate,
    #[serde(rename = "DISABLE_SOURCE_SELECTOR")]
    Deactivate,
    #[serde(rename = "SOURCE_SELECTOR_STATUS")]
    StatusRequest,
}

impl Inbound {
    /// Decodes a posted message. Anything that is not one of ours yields `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match Self::deserialize(value) {
            Ok(message) => Some(message),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring unrecognised frame message");
                None
            }
        }
    }
}

/// Notifications posted to the containing frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "data")]
pub enum Outbound {
    #[serde(rename = "SOURCE_SELECTOR_READY")]
    Ready,
    #[serde(rename = "SOURCE_SELECTED")]
    Selected(SelectionMessage),
    #[serde(rename = "SOURCE_SELECTION_CANCELLED")]
    Cancelled,
}

impl Outbound {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Ready => "SOURCE_SELECTOR_READY",
            Self::Selected(_) => "SOURCE_SELECTED",
            Self::Cancelled => "SOURCE_SELECTION_CANCELLED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SelectionMessage {
    pub elements: Vec<ElementEntry>,
    pub query: String,
}

/// One submitted selection entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElementEntry {
    pub component: String,
    pub file: String,
    pub line: String,
    pub group_id: Option<String>,
    pub element_descriptor: String,
    /// `data:` URL of the captured element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    /// Capture failure message; set instead of `screenshot`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// JSON schemas for both directions, keyed by direction.
pub fn protocol_schema() -> serde_json::Value {
    serde_json::json!({
        "inbound": schemars::schema_for!(Inbound),
        "outbound": schemars::schema_for!(Outbound),
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{protocol_schema, ElementEntry, Inbound, Outbound, SelectionMessage};

    #[rstest]
    #[case(json!({"type": "ENABLE_SOURCE_SELECTOR"}), Some(Inbound::Activate))]
    #[case(json!({"type": "DISABLE_SOURCE_SELECTOR"}), Some(Inbound::Deactivate))]
    #[case(json!({"type": "SOURCE_SELECTOR_STATUS"}), Some(Inbound::StatusRequest))]
    #[case(json!({"type": "ENABLE_SOURCE_SELECTOR", "data": {}}), Some(Inbound::Activate))]
    #[case(json!({"type": "ENABLE_SOURCE_SELECTOR", "data": null}), Some(Inbound::Activate))]
    #[case(
        json!({"type": "DISABLE_SOURCE_SELECTOR", "data": {"reason": "x"}}),
        Some(Inbound::Deactivate)
    )]
    #[case(json!({"type": "SOURCE_SELECTOR_STATUS", "data": {"x": 1}}), Some(Inbound::StatusRequest))]
    #[case(json!({"type": "ENABLE_SOURCE_SELECTOR", "source": "parent"}), Some(Inbound::Activate))]
    #[case(json!({"type": "SOMETHING_ELSE"}), None)]
    #[case(json!({"type": "SOMETHING_ELSE", "data": {}}), None)]
    #[case(json!({"kind": "ENABLE_SOURCE_SELECTOR"}), None)]
    #[case(json!("ENABLE_SOURCE_SELECTOR"), None)]
    #[case(json!(null), None)]
    fn decodes_inbound(#[case] raw: serde_json::Value, #[case] expected: Option<Inbound>) {
        assert_eq!(Inbound::from_json(&raw), expected);
    }

    #[test]
    fn unit_notifications_carry_only_the_type() {
        assert_eq!(
            serde_json::to_value(Outbound::Ready).unwrap(),
            json!({"type": "SOURCE_SELECTOR_READY"})
        );
        assert_eq!(
            serde_json::to_value(Outbound::Cancelled).unwrap(),
            json!({"type": "SOURCE_SELECTION_CANCELLED"})
        );
    }

    #[test]
    fn selection_uses_camel_case_and_null_group() {
        let message = Outbound::Selected(SelectionMessage {
            elements: vec![ElementEntry {
                component: "Card".to_owned(),
                file: "a.tsx".to_owned(),
                line: "10".to_owned(),
                group_id: None,
                element_descriptor: "<div class=\"card\">".to_owned(),
                screenshot: None,
                error: None,
            }],
            query: "make this blue".to_owned(),
        });
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "type": "SOURCE_SELECTED",
                "data": {
                    "elements": [{
                        "component": "Card",
                        "file": "a.tsx",
                        "line": "10",
                        "groupId": null,
                        "elementDescriptor": "<div class=\"card\">"
                    }],
                    "query": "make this blue"
                }
            })
        );
        assert_eq!(message.type_name(), "SOURCE_SELECTED");
    }

    #[test]
    fn schema_covers_both_directions() {
        let schema = protocol_schema().to_string();
        assert!(schema.contains("ENABLE_SOURCE_SELECTOR"));
        assert!(schema.contains("SOURCE_SELECTION_CANCELLED"));
        assert!(schema.contains("elementDescriptor"));
    }
}
