// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Host document abstraction.
//!
//! The controller only ever talks to a [`Document`]. Page nodes are reached through non-owning
//! handles; the only nodes the controller creates, styles and removes are its own overlays.
//! [`MemoryDocument`] is an in-process arena DOM used by tests and the replay tool; with the
//! `web` feature the same trait is implemented over `web-sys`.

use std::fmt;

use serde::Deserialize;

use crate::model::{Point, Rect, Viewport};

pub mod memory;

pub use memory::{DocumentFixture, MemoryDocument, NodeId, SourceFixture};

/// Where a binding is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenTarget<N> {
    Window,
    Node(N),
}

/// Semantic event subscriptions the controller asks the host for.
///
/// Each binding maps to one DOM event type; the host translates the raw event into the matching
/// [`HostEvent`] and hands the controller's [`EventResponse`] back to the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    LayerPointerMove,
    LayerClick,
    ToolbarKey,
    /// `keyup` inside the toolbar; only contained, never acted on.
    ToolbarKeyUp,
    /// `keypress` inside the toolbar; only contained, never acted on.
    ToolbarKeyPress,
    ToolbarSubmit,
    ToolbarCancel,
    WindowKey,
    Scroll,
    Resize,
    FrameMessage,
}

impl Binding {
    pub fn event_type(self) -> &'static str {
        match self {
            Self::LayerPointerMove => "pointermove",
            Self::LayerClick | Self::ToolbarSubmit | Self::ToolbarCancel => "click",
            Self::ToolbarKey | Self::WindowKey => "keydown",
            Self::ToolbarKeyUp => "keyup",
            Self::ToolbarKeyPress => "keypress",
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::FrameMessage => "message",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false, meta: false, ctrl: false, alt: false };
    pub const SHIFT: Self = Self { shift: true, meta: false, ctrl: false, alt: false };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickInput {
    pub point: Point,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    /// The `KeyboardEvent.key` value, e.g. `"Escape"`, `"Enter"`, `"a"`.
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), modifiers: Modifiers::NONE }
    }
}

/// A raw host event, already translated into controller vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    PointerMove(Point),
    Click(ClickInput),
    ToolbarKey(KeyInput),
    /// A key release or press inside the toolbar.
    ToolbarKeyPassive,
    ToolbarSubmit,
    ToolbarCancel,
    WindowKey(KeyInput),
    Scroll,
    Resize,
    AnimationFrame,
    Message(serde_json::Value),
}

/// What the host should do with the event that was just handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResponse {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl EventResponse {
    pub const PASS: Self = Self { prevent_default: false, stop_propagation: false };
    pub const CONSUMED: Self = Self { prevent_default: true, stop_propagation: true };
    pub const CONTAINED: Self = Self { prevent_default: false, stop_propagation: true };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The node handle no longer refers to an element.
    NotAnElement,
    /// The document has no body to attach overlays to.
    NoBody,
    /// A host call failed; the message is whatever the host reported.
    Host(String),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnElement => f.write_str("node is not an element"),
            Self::NoBody => f.write_str("document has no body"),
            Self::Host(msg) => write!(f, "host error: {msg}"),
        }
    }
}

impl std::error::Error for DomError {}

/// The document the controller runs against.
///
/// Reads may target any node. Writes are only ever issued against nodes the caller created with
/// [`Document::create_element`].
pub trait Document {
    type Node: Clone + PartialEq + fmt::Debug;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// All attributes in document order.
    fn attributes(&self, node: &Self::Node) -> Vec<(String, String)>;

    /// Lowercase tag name.
    fn tag_name(&self, node: &Self::Node) -> String;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn is_connected(&self, node: &Self::Node) -> bool;

    /// Live query for every connected element whose `name` attribute equals `value`, in document
    /// order.
    fn query_by_attribute(&self, name: &str, value: &str) -> Vec<Self::Node>;

    /// Viewport-relative bounding rectangle.
    fn bounding_rect(&self, node: &Self::Node) -> Rect;

    /// Topmost hit-testable element under `point` (viewport coordinates).
    fn element_from_point(&self, point: Point) -> Result<Option<Self::Node>, DomError>;

    fn viewport(&self) -> Viewport;

    /// Milliseconds on a monotonic host clock.
    fn now_ms(&self) -> f64;

    /// Creates an element under `parent`, or under the body when `parent` is `None`.
    fn create_element(
        &mut self,
        tag: &str,
        parent: Option<&Self::Node>,
    ) -> Result<Self::Node, DomError>;

    /// Detaches `node` and drops every binding registered on it.
    fn remove(&mut self, node: &Self::Node);

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    /// Inline style property value, empty when unset.
    fn style(&self, node: &Self::Node, property: &str) -> String;

    /// Sets an inline style property; an empty value removes it.
    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str);

    fn set_text(&mut self, node: &Self::Node, text: &str);

    fn input_value(&self, node: &Self::Node) -> String;

    fn set_input_value(&mut self, node: &Self::Node, value: &str);

    fn focus(&mut self, node: &Self::Node);

    fn bind(&mut self, target: ListenTarget<Self::Node>, binding: Binding);

    fn unbind(&mut self, target: &ListenTarget<Self::Node>, binding: Binding);

    /// Asks for one [`HostEvent::AnimationFrame`] before the next repaint.
    fn request_animation_frame(&mut self);

    /// Withdraws any outstanding frame request.
    fn cancel_animation_frame(&mut self);

    fn has_marker(&self, name: &str) -> bool;

    fn set_marker(&mut self, name: &str, on: bool);
}

/// Sets several inline style properties at once.
pub fn apply_styles<D: Document + ?Sized>(doc: &mut D, node: &D::Node, styles: &[(&str, &str)]) {
    for (property, value) in styles {
        doc.set_style(node, property, value);
    }
}
