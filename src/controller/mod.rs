// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Selection overlay controller.
//!
//! One controller per document, installed explicitly. It owns the document handle, the
//! selection set, the highlight renderer and the toolbar; the host feeds it [`HostEvent`]s and
//! applies the [`EventResponse`] it gets back.
//!
//! ```text
//! Inactive --activate--> ArmedHover --plain click--> ToolbarOpen
//!    ^                      |  ^ modifier click          |
//!    +------ cancel --------+  +------- (stays) ---------+
//!    +------------- submit / cancel / deactivate --------+
//! ```

use std::fmt;

use crate::capture::{Capture, CaptureFuture, CaptureTask};
use crate::channel::{
    ElementEntry, FrameChannel, Inbound, Outbound, SelectionMessage, Transport,
};
use crate::config::{InspectConfig, INSTALL_MARKER};
use crate::dom::{
    apply_styles, Binding, ClickInput, Document, EventResponse, HostEvent, KeyInput,
    ListenTarget,
};
use crate::inspect::{members_for_key, members_of, resolve, Selection, SelectionEntry};
use crate::model::{ElementDescriptor, Point, SelectionKey};
use crate::overlay::toolbar::EMPTY_SELECTION_FEEDBACK;
use crate::overlay::{
    underlying_element_at, FrameGuard, HighlightRenderer, Toolbar, ToolbarKeyAction,
    OVERLAY_ATTRIBUTE, Z_LAYER,
};


const WINDOW_BINDINGS: [Binding; 3] = [Binding::Scroll, Binding::Resize, Binding::WindowKey];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Inactive,
    ArmedHover,
    ToolbarOpen,
}

impl ControllerState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::ArmedHover => "armed-hover",
            Self::ToolbarOpen => "toolbar-open",
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a submit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No toolbar is open; nothing to submit.
    NotOpen,
    /// Every entry was gone; feedback shown, state unchanged.
    Empty,
    /// The selection was posted.
    Sent,
    /// The selection waits on screenshots in a queued [`CaptureTask`].
    Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    /// The document already hosts a controller.
    AlreadyInstalled,
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInstalled => {
                write!(f, "a source selector is already installed (`{INSTALL_MARKER}` is set)")
            }
        }
    }
}

impl std::error::Error for InstallError {}

/// Per-state context. Hover tracking only exists while armed.
enum Phase<N> {
    Inactive,
    ArmedHover { layer: N, hovered: Option<N> },
    ToolbarOpen { layer: N, toolbar: Toolbar<N> },
}

impl<N> Phase<N> {
    fn state(&self) -> ControllerState {
        match self {
            Self::Inactive => ControllerState::Inactive,
            Self::ArmedHover { .. } => ControllerState::ArmedHover,
            Self::ToolbarOpen { .. } => ControllerState::ToolbarOpen,
        }
    }
}

pub struct Controller<D: Document, T> {
    doc: D,
    config: InspectConfig,
    channel: FrameChannel<T>,
    phase: Phase<D::Node>,
    selection: Selection<D::Node>,
    highlights: HighlightRenderer<D::Node>,
    frame: FrameGuard,
    reposition_pending: bool,
    capture: Option<Box<dyn Capture<D>>>,
    capture_tasks: Vec<CaptureTask<T>>,
}

impl<D: Document, T> fmt::Debug for Controller<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("state", &self.phase.state())
            .field("selection", &self.selection.len())
            .field("markers", &self.highlights.marker_count())
            .field("capture_tasks", &self.capture_tasks.len())
            .finish_non_exhaustive()
    }
}

impl<D: Document, T: Transport> Controller<D, T> {
    /// Installs a controller into `doc` and announces readiness.
    ///
    /// Fails when the document already carries the installation marker.
    pub fn install(mut doc: D, transport: T, config: InspectConfig) -> Result<Self, InstallError> {
        if doc.has_marker(INSTALL_MARKER) {
            return Err(InstallError::AlreadyInstalled);
        }
        doc.set_marker(INSTALL_MARKER, true);
        doc.bind(ListenTarget::Window, Binding::FrameMessage);

        let highlights = HighlightRenderer::new(config.colors.clone());
        let controller = Self {
            doc,
            config,
            channel: FrameChannel::new(transport),
            phase: Phase::Inactive,
            selection: Selection::new(),
            highlights,
            frame: FrameGuard::default(),
            reposition_pending: false,
            capture: None,
            capture_tasks: Vec::new(),
        };
        controller.channel.send(&Outbound::Ready);
        tracing::debug!("source selector installed");
        Ok(controller)
    }

    /// Attaches screenshots to submissions when `capture_screenshots` is enabled.
    pub fn with_capture(mut self, capture: impl Capture<D> + 'static) -> Self {
        self.capture = Some(Box::new(capture));
        self
    }

    /// Tears everything down, clears the installation marker and hands the document back.
    pub fn uninstall(mut self) -> D {
        self.teardown();
        self.doc.cancel_animation_frame();
        self.doc.unbind(&ListenTarget::Window, Binding::FrameMessage);
        self.doc.set_marker(INSTALL_MARKER, false);
        self.doc
    }

    pub fn state(&self) -> ControllerState {
        self.phase.state()
    }

    pub fn selection(&self) -> &Selection<D::Node> {
        &self.selection
    }

    pub fn highlights(&self) -> &HighlightRenderer<D::Node> {
        &self.highlights
    }

    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    /// Page mutations made through this handle are the host's, not the controller's.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn channel(&self) -> &FrameChannel<T> {
        &self.channel
    }

    /// Node currently tracked under the pointer, if armed.
    pub fn hovered(&self) -> Option<&D::Node> {
        match &self.phase {
            Phase::ArmedHover { hovered, .. } => hovered.as_ref(),
            _ => None,
        }
    }

    pub fn toolbar(&self) -> Option<&Toolbar<D::Node>> {
        match &self.phase {
            Phase::ToolbarOpen { toolbar, .. } => Some(toolbar),
            _ => None,
        }
    }

    /// Every overlay node currently in the document: layer, markers and toolbar panel.
    pub fn overlay_nodes(&self) -> Vec<D::Node> {
        let mut nodes = self.highlights.overlay_nodes();
        match &self.phase {
            Phase::Inactive => {}
            Phase::ArmedHover { layer, .. } => nodes.push(layer.clone()),
            Phase::ToolbarOpen { layer, toolbar } => {
                nodes.push(layer.clone());
                nodes.push(toolbar.panel().clone());
            }
        }
        nodes
    }

    /// Hands over capture tasks queued by deferred submits; the host spawns them.
    pub fn take_capture_tasks(&mut self) -> Vec<CaptureTask<T>> {
        std::mem::take(&mut self.capture_tasks)
    }

    /// Routes one host event.
    pub fn handle(&mut self, event: HostEvent) -> EventResponse {
        match event {
            HostEvent::PointerMove(point) => {
                self.pointer_move(point);
                EventResponse::PASS
            }
            HostEvent::Click(input) => self.click(input),
            HostEvent::ToolbarKey(key) => self.toolbar_key(&key),
            HostEvent::ToolbarKeyPassive => match self.phase {
                Phase::ToolbarOpen { .. } => EventResponse::CONTAINED,
                _ => EventResponse::PASS,
            },
            HostEvent::ToolbarSubmit => {
                self.submit();
                EventResponse::CONSUMED
            }
            HostEvent::ToolbarCancel => {
                self.cancel();
                EventResponse::CONSUMED
            }
            HostEvent::WindowKey(key) => self.window_key(&key),
            HostEvent::Scroll | HostEvent::Resize => {
                self.schedule_reposition();
                EventResponse::PASS
            }
            HostEvent::AnimationFrame => {
                self.animation_frame();
                EventResponse::PASS
            }
            HostEvent::Message(value) => {
                self.receive(&value);
                EventResponse::PASS
            }
        }
    }

    /// Handles a message posted by the containing frame.
    pub fn receive(&mut self, value: &serde_json::Value) {
        match Inbound::from_json(value) {
            Some(Inbound::Activate) => self.activate(),
            Some(Inbound::Deactivate) => self.deactivate(),
            Some(Inbound::StatusRequest) => {
                self.channel.send(&Outbound::Ready);
            }
            None => {}
        }
    }

    /// Arms hover tracking. A no-op unless inactive.
    pub fn activate(&mut self) {
        if !matches!(self.phase, Phase::Inactive) {
            tracing::debug!(state = %self.state(), "activate ignored");
            return;
        }
        self.highlights.clear(&mut self.doc);
        self.selection.clear();

        let layer = match self.doc.create_element("div", None) {
            Ok(layer) => layer,
            Err(err) => {
                tracing::warn!(error = %err, "failed to create interception layer");
                return;
            }
        };
        self.doc.set_attribute(&layer, OVERLAY_ATTRIBUTE, "layer");
        apply_styles(
            &mut self.doc,
            &layer,
            &[
                ("position", "fixed"),
                ("left", "0px"),
                ("top", "0px"),
                ("width", "100%"),
                ("height", "100%"),
                ("z-index", Z_LAYER),
                ("cursor", "crosshair"),
                ("background", "transparent"),
            ],
        );
        self.doc.bind(ListenTarget::Node(layer.clone()), Binding::LayerPointerMove);
        self.doc.bind(ListenTarget::Node(layer.clone()), Binding::LayerClick);
        for binding in WINDOW_BINDINGS {
            self.doc.bind(ListenTarget::Window, binding);
        }
        self.phase = Phase::ArmedHover { layer, hovered: None };
        tracing::debug!("source selector armed");
    }

    /// Forces `Inactive` and removes every overlay node, whatever the current state.
    pub fn deactivate(&mut self) {
        let in_progress = self.in_progress();
        self.teardown();
        if in_progress {
            self.channel.send(&Outbound::Cancelled);
        }
    }

    /// Abandons the current selection. Returns whether anything was active.
    pub fn cancel(&mut self) -> bool {
        if matches!(self.phase, Phase::Inactive) {
            return false;
        }
        self.deactivate();
        true
    }

    pub fn pointer_move(&mut self, point: Point) {
        let Phase::ArmedHover { hovered, .. } = &self.phase else {
            return;
        };
        let previous = hovered.clone();

        let overlays = self.overlay_nodes();
        let tagged = underlying_element_at(&mut self.doc, &overlays, point)
            .and_then(|node| resolve(&self.doc, &self.config.attributes, &node));
        let target = tagged.as_ref().map(|tagged| tagged.target.clone());
        if target == previous {
            return;
        }
        if let Phase::ArmedHover { hovered, .. } = &mut self.phase {
            *hovered = target;
        }

        match tagged {
            Some(tagged) => {
                let key = tagged.key();
                if self.highlights.hovered_key() == Some(&key) {
                    return;
                }
                let members = members_for_key(&self.doc, &self.config.attributes, &key);
                self.highlights.show_hover(&mut self.doc, key, &members);
            }
            None => self.highlights.clear_hover(&mut self.doc),
        }
    }

    /// Interception-layer click. Always consumed while armed or open, tagged or not.
    pub fn click(&mut self, input: ClickInput) -> EventResponse {
        match self.phase {
            Phase::Inactive => return EventResponse::PASS,
            Phase::ToolbarOpen { .. } => return EventResponse::CONSUMED,
            Phase::ArmedHover { .. } => {}
        }

        let overlays = self.overlay_nodes();
        let Some(tagged) = underlying_element_at(&mut self.doc, &overlays, input.point)
            .and_then(|node| resolve(&self.doc, &self.config.attributes, &node))
        else {
            tracing::debug!(x = input.point.x, y = input.point.y, "click on untagged element");
            return EventResponse::CONSUMED;
        };

        let key = tagged.key();
        if self.config.toggle_modifier.is_held(input.modifiers) {
            self.toggle(tagged, key);
        } else {
            self.commit(tagged, key, input.point);
        }
        EventResponse::CONSUMED
    }

    /// Toolbar key. Every key stays inside the panel.
    pub fn toolbar_key(&mut self, key: &KeyInput) -> EventResponse {
        if !matches!(self.phase, Phase::ToolbarOpen { .. }) {
            return EventResponse::PASS;
        }
        match ToolbarKeyAction::classify(key, &self.config.abort_key) {
            ToolbarKeyAction::Abort => {
                self.cancel();
                EventResponse::CONSUMED
            }
            ToolbarKeyAction::Submit => {
                self.submit();
                EventResponse::CONSUMED
            }
            ToolbarKeyAction::Contained => EventResponse::CONTAINED,
        }
    }

    /// Window-level key. Only the abort key is ours.
    pub fn window_key(&mut self, key: &KeyInput) -> EventResponse {
        if key.key != self.config.abort_key || matches!(self.phase, Phase::Inactive) {
            return EventResponse::PASS;
        }
        self.cancel();
        EventResponse::CONSUMED
    }

    /// Sends the selection with the toolbar's query and resets.
    ///
    /// Entries whose target left the document are re-pointed at a live group member or dropped
    /// first; if nothing survives, feedback is shown and the toolbar stays open.
    pub fn submit(&mut self) -> SubmitOutcome {
        if !matches!(self.phase, Phase::ToolbarOpen { .. }) {
            return SubmitOutcome::NotOpen;
        }
        self.prune_detached();

        let Phase::ToolbarOpen { toolbar, .. } = &mut self.phase else {
            return SubmitOutcome::NotOpen;
        };
        toolbar.set_count(&mut self.doc, self.selection.len());
        if self.selection.is_empty() {
            toolbar.flash(&mut self.doc, EMPTY_SELECTION_FEEDBACK, self.config.feedback_ms);
            self.frame.request(&mut self.doc);
            tracing::debug!("submit rejected: empty selection");
            return SubmitOutcome::Empty;
        }
        let query = toolbar.query(&self.doc);

        let elements =
            self.selection.entries().iter().map(|entry| self.element_entry(entry)).collect();
        let message = SelectionMessage { elements, query };

        let pending = self.pending_captures();
        self.teardown();
        match pending {
            Some(pending) => {
                let task = CaptureTask::new(message, pending, self.channel.clone());
                self.capture_tasks.push(task);
                SubmitOutcome::Deferred
            }
            None => {
                self.channel.send(&Outbound::Selected(message));
                SubmitOutcome::Sent
            }
        }
    }

    /// Queues one reposition for the next animation frame; bursts coalesce.
    pub fn schedule_reposition(&mut self) {
        if matches!(self.phase, Phase::Inactive) {
            return;
        }
        self.reposition_pending = true;
        self.frame.request(&mut self.doc);
    }

    pub fn animation_frame(&mut self) {
        if !self.frame.fire() {
            return;
        }
        if std::mem::take(&mut self.reposition_pending) {
            self.highlights.reposition(&mut self.doc);
        }
        if let Phase::ToolbarOpen { toolbar, .. } = &mut self.phase {
            if toolbar.expire_feedback(&mut self.doc) {
                self.frame.request(&mut self.doc);
            }
        }
    }

    fn in_progress(&self) -> bool {
        !self.selection.is_empty() || matches!(self.phase, Phase::ToolbarOpen { .. })
    }

    /// Removes every overlay and listener the controller added on activation.
    fn teardown(&mut self) {
        self.highlights.clear(&mut self.doc);
        self.selection.clear();
        self.reposition_pending = false;
        match std::mem::replace(&mut self.phase, Phase::Inactive) {
            Phase::Inactive => {}
            Phase::ArmedHover { layer, .. } => self.doc.remove(&layer),
            Phase::ToolbarOpen { layer, toolbar } => {
                toolbar.close(&mut self.doc);
                self.doc.remove(&layer);
            }
        }
        for binding in WINDOW_BINDINGS {
            self.doc.unbind(&ListenTarget::Window, binding);
        }
    }

    fn toggle(&mut self, tagged: SelectionEntry<D::Node>, key: SelectionKey<D::Node>) {
        if self.selection.remove(&key).is_some() {
            let was_hovered = self.highlights.hovered_key() == Some(&key);
            self.highlights.deselect(&mut self.doc, &key);
            if was_hovered {
                let members = members_for_key(&self.doc, &self.config.attributes, &key);
                self.highlights.show_hover(&mut self.doc, key, &members);
            }
            return;
        }
        let members = members_for_key(&self.doc, &self.config.attributes, &key);
        self.selection.insert(tagged);
        self.highlights.select(&mut self.doc, key, &members);
    }

    fn commit(&mut self, tagged: SelectionEntry<D::Node>, key: SelectionKey<D::Node>, at: Point) {
        if !self.selection.contains(&key) {
            let members = members_for_key(&self.doc, &self.config.attributes, &key);
            self.selection.insert(tagged);
            self.highlights.select(&mut self.doc, key, &members);
        }
        self.highlights.clear_hover(&mut self.doc);

        let layer = match std::mem::replace(&mut self.phase, Phase::Inactive) {
            Phase::ArmedHover { layer, .. } => layer,
            other => {
                self.phase = other;
                return;
            }
        };
        let opened = Toolbar::open(
            &mut self.doc,
            &self.config.toolbar,
            &self.config.colors,
            at,
            self.selection.len(),
        );
        self.phase = match opened {
            Ok(toolbar) => {
                tracing::debug!(selected = self.selection.len(), "toolbar opened");
                Phase::ToolbarOpen { layer, toolbar }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to open toolbar");
                Phase::ArmedHover { layer, hovered: None }
            }
        };
    }

    fn prune_detached(&mut self) {
        let doc = &self.doc;
        let attributes = &self.config.attributes;
        let dropped = self.selection.retain_mut(|entry| {
            if doc.is_connected(&entry.target) {
                return true;
            }
            let Some(group_id) = &entry.provenance.group_id else {
                return false;
            };
            match members_of(doc, attributes, group_id).into_iter().next() {
                Some(member) => {
                    entry.target = member;
                    true
                }
                None => false,
            }
        });
        for key in dropped {
            tracing::debug!(?key, "dropping detached selection entry");
            self.highlights.deselect(&mut self.doc, &key);
        }
    }

    fn element_entry(&self, entry: &SelectionEntry<D::Node>) -> ElementEntry {
        let provenance = &entry.provenance;
        let attributes = self.doc.attributes(&entry.target);
        let descriptor = ElementDescriptor::new(
            &self.doc.tag_name(&entry.target),
            attributes.iter().map(|(name, value)| (name.as_str(), value.as_str())),
        );
        ElementEntry {
            component: provenance.component_label().to_owned(),
            file: provenance.file_label().to_owned(),
            line: provenance.line_label().to_owned(),
            group_id: provenance.group_id.as_ref().map(|id| id.as_str().to_owned()),
            element_descriptor: descriptor.into_string(),
            screenshot: None,
            error: None,
        }
    }

    fn pending_captures(&self) -> Option<Vec<CaptureFuture>> {
        if !self.config.capture_screenshots {
            return None;
        }
        let Some(capture) = &self.capture else {
            tracing::debug!("screenshot capture enabled without a capture backend");
            return None;
        };
        let pending = self
            .selection
            .entries()
            .iter()
            .map(|entry| capture.capture(&self.doc, &entry.target))
            .collect();
        Some(pending)
    }
}
