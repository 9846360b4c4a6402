// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scenario replay against an in-memory document.
//!
//! A scenario is a JSON file with a page fixture and a list of steps. Replaying installs a
//! controller on a [`MemoryDocument`], feeds it the steps as host events and collects every
//! message the controller posts. [`run`] spawns capture tasks with `spawn_local`, so it must be
//! driven inside a [`tokio::task::LocalSet`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::capture::OutlineCapture;
use crate::channel::MemoryTransport;
use crate::config::InspectConfig;
use crate::controller::{Controller, ControllerState, InstallError};
use crate::dom::{
    ClickInput, Document, DocumentFixture, HostEvent, KeyInput, MemoryDocument, Modifiers, NodeId,
};
use crate::model::{Point, Viewport};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: InspectConfig,
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    #[serde(default)]
    pub document: Vec<DocumentFixture>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_viewport() -> Viewport {
    Viewport::new(1280.0, 800.0)
}

impl Scenario {
    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(raw).map_err(|err| ScenarioError::Parse(err.to_string()))
    }
}

/// One host-side action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// A message posted by the containing frame.
    Message { data: serde_json::Value },
    Move { x: f64, y: f64 },
    Click {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Replaces the value of the focused input.
    Type { text: String },
    /// Window-level key.
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    ToolbarKey {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Submit,
    Cancel,
    Scroll { x: f64, y: f64 },
    Resize { width: f64, height: f64 },
    /// Advances the clock, then delivers every requested animation frame.
    Frame {
        #[serde(default)]
        advance_ms: f64,
    },
    /// Detaches the fixture node with this `id`.
    Remove { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    Parse(String),
    Install(InstallError),
    /// A step referenced a fixture id that does not exist.
    UnknownNode { step: usize, id: String },
    /// A `type` step ran while no input had focus.
    NothingFocused { step: usize },
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid scenario: {msg}"),
            Self::Install(err) => write!(f, "install failed: {err}"),
            Self::UnknownNode { step, id } => write!(f, "step {step}: unknown node id `{id}`"),
            Self::NothingFocused { step } => write!(f, "step {step}: no focused input to type into"),
        }
    }
}

impl std::error::Error for ScenarioError {}

impl From<InstallError> for ScenarioError {
    fn from(err: InstallError) -> Self {
        Self::Install(err)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    /// Every posted message, in delivery order.
    pub outbound: Vec<serde_json::Value>,
    pub state: ControllerState,
    pub selected: usize,
    /// Overlay nodes still in the document after the last step.
    pub overlays: usize,
}

impl fmt::Display for ReplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state={} selected={} overlays={} messages={}",
            self.state,
            self.selected,
            self.overlays,
            self.outbound.len()
        )
    }
}

/// Replays `scenario`. With `capture`, submissions carry outline screenshots.
pub async fn run(scenario: &Scenario, capture: bool) -> Result<ReplayReport, ScenarioError> {
    let (doc, ids) = MemoryDocument::from_fixture(scenario.viewport, &scenario.document);
    let transport = MemoryTransport::new();
    let mut config = scenario.config.clone();
    config.capture_screenshots |= capture;
    let mut controller = Controller::install(doc, transport.clone(), config)?;
    if capture {
        controller = controller.with_capture(OutlineCapture);
    }

    let mut running = Vec::new();
    for (index, step) in scenario.steps.iter().enumerate() {
        tracing::debug!(step = index, ?step, "replaying");
        apply(&mut controller, &ids, index, step)?;
        for task in controller.take_capture_tasks() {
            running.push(tokio::task::spawn_local(task.run()));
        }
        tokio::task::yield_now().await;
    }
    for handle in running {
        if let Err(err) = handle.await {
            tracing::warn!(error = %err, "capture task aborted");
        }
    }

    Ok(ReplayReport {
        outbound: transport.take(),
        state: controller.state(),
        selected: controller.selection().len(),
        overlays: controller.overlay_nodes().len(),
    })
}

fn apply(
    controller: &mut Controller<MemoryDocument, MemoryTransport>,
    ids: &BTreeMap<String, NodeId>,
    index: usize,
    step: &Step,
) -> Result<(), ScenarioError> {
    let event = match step {
        Step::Message { data } => HostEvent::Message(data.clone()),
        Step::Move { x, y } => HostEvent::PointerMove(Point::new(*x, *y)),
        Step::Click { x, y, modifiers } => {
            HostEvent::Click(ClickInput { point: Point::new(*x, *y), modifiers: *modifiers })
        }
        Step::Type { text } => {
            let doc = controller.document_mut();
            let input = doc.focused().ok_or(ScenarioError::NothingFocused { step: index })?;
            doc.set_input_value(&input, text);
            return Ok(());
        }
        Step::Key { key, modifiers } => {
            HostEvent::WindowKey(KeyInput { key: key.clone(), modifiers: *modifiers })
        }
        Step::ToolbarKey { key, modifiers } => {
            HostEvent::ToolbarKey(KeyInput { key: key.clone(), modifiers: *modifiers })
        }
        Step::Submit => HostEvent::ToolbarSubmit,
        Step::Cancel => HostEvent::ToolbarCancel,
        Step::Scroll { x, y } => {
            controller.document_mut().scroll_to(*x, *y);
            HostEvent::Scroll
        }
        Step::Resize { width, height } => {
            controller.document_mut().resize(*width, *height);
            HostEvent::Resize
        }
        Step::Frame { advance_ms } => {
            let doc = controller.document_mut();
            doc.advance_clock(*advance_ms);
            for _ in 0..doc.take_frame_requests() {
                controller.handle(HostEvent::AnimationFrame);
            }
            return Ok(());
        }
        Step::Remove { id } => {
            let node = ids
                .get(id)
                .copied()
                .ok_or_else(|| ScenarioError::UnknownNode { step: index, id: id.clone() })?;
            controller.document_mut().remove(&node);
            return Ok(());
        }
    };
    let response = controller.handle(event);
    tracing::debug!(
        step = index,
        prevent_default = response.prevent_default,
        stop_propagation = response.stop_propagation,
        state = %controller.state(),
        "step handled"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{run, ReplayReport, Scenario, ScenarioError, Step};
    use crate::controller::ControllerState;

    const CARDS: &str = r#"{
        "viewport": {"width": 800, "height": 600},
        "document": [
            {"tag": "main", "rect": {"x": 0, "y": 0, "width": 800, "height": 600}, "children": [
                {"tag": "div", "id": "first", "rect": {"x": 10, "y": 10, "width": 200, "height": 50},
                 "source": {"component": "Card", "file": "a.tsx", "line": 10, "column": 4}},
                {"tag": "div", "id": "second", "rect": {"x": 10, "y": 70, "width": 200, "height": 50},
                 "source": {"component": "Card", "file": "a.tsx", "line": 10, "column": 4}}
            ]}
        ],
        "steps": []
    }"#;

    fn scenario(steps: serde_json::Value) -> Scenario {
        let mut scenario = Scenario::from_json(CARDS).unwrap();
        scenario.steps = serde_json::from_value(steps).unwrap();
        scenario
    }

    async fn replay(scenario: &Scenario, capture: bool) -> Result<ReplayReport, ScenarioError> {
        tokio::task::LocalSet::new().run_until(run(scenario, capture)).await
    }

    #[test]
    fn parses_every_step_kind() {
        let steps: Vec<Step> = serde_json::from_str(
            r#"[
                {"step": "message", "data": {"type": "ENABLE_SOURCE_SELECTOR"}},
                {"step": "move", "x": 1, "y": 2},
                {"step": "click", "x": 1, "y": 2, "modifiers": {"shift": true}},
                {"step": "type", "text": "hi"},
                {"step": "key", "key": "Escape"},
                {"step": "toolbar_key", "key": "Enter"},
                {"step": "submit"},
                {"step": "cancel"},
                {"step": "scroll", "x": 0, "y": 10},
                {"step": "resize", "width": 640, "height": 480},
                {"step": "frame"},
                {"step": "remove", "id": "first"}
            ]"#,
        )
        .unwrap();
        assert_eq!(steps.len(), 12);
        assert_eq!(steps[10], Step::Frame { advance_ms: 0.0 });
    }

    #[tokio::test]
    async fn replays_a_submission() {
        let scenario = scenario(serde_json::json!([
            {"step": "message", "data": {"type": "ENABLE_SOURCE_SELECTOR"}},
            {"step": "move", "x": 50, "y": 30},
            {"step": "click", "x": 50, "y": 30},
            {"step": "type", "text": "make this blue"},
            {"step": "toolbar_key", "key": "Enter"}
        ]));
        let report = replay(&scenario, false).await.unwrap();

        let types: Vec<_> = report.outbound.iter().map(|m| m["type"].as_str().unwrap()).collect();
        assert_eq!(types, ["SOURCE_SELECTOR_READY", "SOURCE_SELECTED"]);
        assert_eq!(report.outbound[1]["data"]["query"], "make this blue");
        assert_eq!(report.state, ControllerState::Inactive);
        assert_eq!(report.overlays, 0);
    }

    #[tokio::test]
    async fn capture_flag_attaches_screenshots() {
        let scenario = scenario(serde_json::json!([
            {"step": "message", "data": {"type": "ENABLE_SOURCE_SELECTOR"}},
            {"step": "click", "x": 50, "y": 90},
            {"step": "submit"}
        ]));
        let report = replay(&scenario, true).await.unwrap();
        let element = &report.outbound[1]["data"]["elements"][0];
        assert!(element["screenshot"].as_str().unwrap().starts_with("data:image/svg+xml"));
    }

    #[tokio::test]
    async fn removed_members_leave_the_selection_submittable() {
        let scenario = scenario(serde_json::json!([
            {"step": "message", "data": {"type": "ENABLE_SOURCE_SELECTOR"}},
            {"step": "click", "x": 50, "y": 30},
            {"step": "remove", "id": "first"},
            {"step": "submit"}
        ]));
        let report = replay(&scenario, false).await.unwrap();
        assert_eq!(report.outbound.len(), 2);
        assert_eq!(report.selected, 0);
    }

    #[tokio::test]
    async fn reports_step_errors() {
        let unknown = scenario(serde_json::json!([{"step": "remove", "id": "missing"}]));
        assert_eq!(
            replay(&unknown, false).await,
            Err(ScenarioError::UnknownNode { step: 0, id: "missing".to_owned() })
        );

        let unfocused = scenario(serde_json::json!([{"step": "type", "text": "x"}]));
        assert_eq!(
            replay(&unfocused, false).await,
            Err(ScenarioError::NothingFocused { step: 0 })
        );
    }

    #[test]
    fn rejects_malformed_scenarios() {
        assert!(matches!(Scenario::from_json("{"), Err(ScenarioError::Parse(_))));
        assert!(matches!(
            Scenario::from_json(r#"{"steps": [{"step": "teleport"}]}"#),
            Err(ScenarioError::Parse(_))
        ));
    }
}
