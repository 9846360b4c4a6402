// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Browser host: [`Document`] over `web-sys`, a parent-frame transport and the wasm entry points.
//!
//! The installed controller lives in a thread-local slot. Every DOM listener forwards its
//! translated [`HostEvent`] to [`dispatch`], which borrows the slot, runs the controller and
//! spawns whatever capture tasks the event produced.

use std::cell::RefCell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement, HtmlInputElement, KeyboardEvent, MessageEvent, MouseEvent};

use crate::channel::{ChannelError, Transport};
use crate::config::InspectConfig;
use crate::controller::Controller;
use crate::dom::{
    Binding, ClickInput, Document, DomError, EventResponse, HostEvent, KeyInput, ListenTarget,
    Modifiers,
};
use crate::model::{Point, Rect, Viewport};

thread_local! {
    static INSTANCE: RefCell<Option<Controller<WebDocument, ParentFrameTransport>>> =
        const { RefCell::new(None) };
}

struct Listener {
    target: ListenTarget<Element>,
    binding: Binding,
    closure: Closure<dyn FnMut(Event)>,
}

pub struct WebDocument {
    window: web_sys::Window,
    document: web_sys::Document,
    listeners: Vec<Listener>,
    frame_callback: Closure<dyn FnMut()>,
    frame_request: Option<i32>,
}

impl WebDocument {
    pub fn new() -> Result<Self, DomError> {
        let window = web_sys::window().ok_or_else(|| DomError::Host("no window".to_owned()))?;
        let document =
            window.document().ok_or_else(|| DomError::Host("no document".to_owned()))?;
        let frame_callback = Closure::<dyn FnMut()>::new(|| {
            dispatch(HostEvent::AnimationFrame);
        });
        Ok(Self { window, document, listeners: Vec::new(), frame_callback, frame_request: None })
    }

    fn event_target(&self, target: &ListenTarget<Element>) -> web_sys::EventTarget {
        match target {
            ListenTarget::Window => self.window.clone().into(),
            ListenTarget::Node(element) => element.clone().into(),
        }
    }

    fn detach(&self, listener: &Listener) {
        let target = self.event_target(&listener.target);
        let callback = listener.closure.as_ref().unchecked_ref();
        let result = target.remove_event_listener_with_callback_and_bool(
            listener.binding.event_type(),
            callback,
            uses_capture(listener.binding),
        );
        if let Err(err) = result {
            tracing::warn!(binding = ?listener.binding, error = ?err, "failed to remove listener");
        }
    }

    fn html(node: &Element) -> Option<&HtmlElement> {
        node.dyn_ref::<HtmlElement>()
    }
}

// The browser must never call back into a dropped closure.
impl Drop for WebDocument {
    fn drop(&mut self) {
        self.cancel_animation_frame();
        for listener in std::mem::take(&mut self.listeners) {
            self.detach(&listener);
        }
    }
}

impl std::fmt::Debug for WebDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDocument").field("listeners", &self.listeners.len()).finish_non_exhaustive()
    }
}

// Scroll does not bubble; a capturing window listener sees scrolls of any container.
fn uses_capture(binding: Binding) -> bool {
    matches!(binding, Binding::Scroll)
}

fn mouse_modifiers(event: &MouseEvent) -> Modifiers {
    Modifiers {
        shift: event.shift_key(),
        meta: event.meta_key(),
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
    }
}

fn key_input(event: &KeyboardEvent) -> KeyInput {
    KeyInput {
        key: event.key(),
        modifiers: Modifiers {
            shift: event.shift_key(),
            meta: event.meta_key(),
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
        },
    }
}

fn js_to_json(value: &JsValue) -> Option<serde_json::Value> {
    let text: String = js_sys::JSON::stringify(value).ok()?.into();
    serde_json::from_str(&text).ok()
}

fn json_to_js(value: &serde_json::Value) -> Result<JsValue, ChannelError> {
    let text = serde_json::to_string(value).map_err(|err| ChannelError::Encode(err.to_string()))?;
    js_sys::JSON::parse(&text).map_err(|err| ChannelError::Encode(format!("{err:?}")))
}

fn translate(binding: Binding, event: &Event) -> Option<HostEvent> {
    match binding {
        Binding::LayerPointerMove => {
            let mouse = event.dyn_ref::<MouseEvent>()?;
            Some(HostEvent::PointerMove(Point::new(
                f64::from(mouse.client_x()),
                f64::from(mouse.client_y()),
            )))
        }
        Binding::LayerClick => {
            let mouse = event.dyn_ref::<MouseEvent>()?;
            Some(HostEvent::Click(ClickInput {
                point: Point::new(f64::from(mouse.client_x()), f64::from(mouse.client_y())),
                modifiers: mouse_modifiers(mouse),
            }))
        }
        Binding::ToolbarKey => Some(HostEvent::ToolbarKey(key_input(event.dyn_ref()?))),
        Binding::ToolbarKeyUp | Binding::ToolbarKeyPress => Some(HostEvent::ToolbarKeyPassive),
        Binding::WindowKey => Some(HostEvent::WindowKey(key_input(event.dyn_ref()?))),
        Binding::ToolbarSubmit => Some(HostEvent::ToolbarSubmit),
        Binding::ToolbarCancel => Some(HostEvent::ToolbarCancel),
        Binding::Scroll => Some(HostEvent::Scroll),
        Binding::Resize => Some(HostEvent::Resize),
        Binding::FrameMessage => {
            let message = event.dyn_ref::<MessageEvent>()?;
            js_to_json(&message.data()).map(HostEvent::Message)
        }
    }
}

impl Document for WebDocument {
    type Node = Element;

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn attributes(&self, node: &Element) -> Vec<(String, String)> {
        node.get_attribute_names()
            .iter()
            .filter_map(|name| name.as_string())
            .filter_map(|name| node.get_attribute(&name).map(|value| (name, value)))
            .collect()
    }

    fn tag_name(&self, node: &Element) -> String {
        node.tag_name().to_ascii_lowercase()
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn is_connected(&self, node: &Element) -> bool {
        node.is_connected()
    }

    fn query_by_attribute(&self, name: &str, value: &str) -> Vec<Element> {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        let selector = format!("[{name}=\"{escaped}\"]");
        let list = match self.document.query_selector_all(&selector) {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(%selector, error = ?err, "attribute query failed");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn bounding_rect(&self, node: &Element) -> Rect {
        let rect = node.get_bounding_client_rect();
        Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
    }

    fn element_from_point(&self, point: Point) -> Result<Option<Element>, DomError> {
        Ok(self.document.element_from_point(point.x as f32, point.y as f32))
    }

    fn viewport(&self) -> Viewport {
        let dimension = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|value| value.as_f64()).unwrap_or_default()
        };
        Viewport {
            width: dimension(self.window.inner_width()),
            height: dimension(self.window.inner_height()),
            scroll_x: self.window.scroll_x().unwrap_or_default(),
            scroll_y: self.window.scroll_y().unwrap_or_default(),
        }
    }

    fn now_ms(&self) -> f64 {
        self.window.performance().map_or_else(js_sys::Date::now, |performance| performance.now())
    }

    fn create_element(&mut self, tag: &str, parent: Option<&Element>) -> Result<Element, DomError> {
        let element =
            self.document.create_element(tag).map_err(|err| DomError::Host(format!("{err:?}")))?;
        let parent: web_sys::Node = match parent {
            Some(parent) => parent.clone().into(),
            None => self.document.body().ok_or(DomError::NoBody)?.into(),
        };
        parent.append_child(&element).map_err(|err| DomError::Host(format!("{err:?}")))?;
        Ok(element)
    }

    fn remove(&mut self, node: &Element) {
        let (dropped, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.listeners)
            .into_iter()
            .partition(|listener| match &listener.target {
                ListenTarget::Node(element) => node.contains(Some(element.as_ref())),
                ListenTarget::Window => false,
            });
        for listener in &dropped {
            self.detach(listener);
        }
        self.listeners = kept;
        node.remove();
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        if let Err(err) = node.set_attribute(name, value) {
            tracing::warn!(name, error = ?err, "failed to set attribute");
        }
    }

    fn style(&self, node: &Element, property: &str) -> String {
        Self::html(node)
            .and_then(|html| html.style().get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn set_style(&mut self, node: &Element, property: &str, value: &str) {
        let Some(html) = Self::html(node) else {
            return;
        };
        let style = html.style();
        let result = if value.is_empty() {
            style.remove_property(property).map(drop)
        } else {
            style.set_property(property, value)
        };
        if let Err(err) = result {
            tracing::warn!(property, error = ?err, "failed to set style");
        }
    }

    fn set_text(&mut self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn input_value(&self, node: &Element) -> String {
        node.dyn_ref::<HtmlInputElement>().map(HtmlInputElement::value).unwrap_or_default()
    }

    fn set_input_value(&mut self, node: &Element, value: &str) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
    }

    fn focus(&mut self, node: &Element) {
        if let Some(Err(err)) = Self::html(node).map(HtmlElement::focus) {
            tracing::debug!(error = ?err, "focus failed");
        }
    }

    fn bind(&mut self, target: ListenTarget<Element>, binding: Binding) {
        if self.listeners.iter().any(|l| l.target == target && l.binding == binding) {
            return;
        }
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(host_event) = translate(binding, &event) else {
                return;
            };
            let response = dispatch(host_event);
            if response.prevent_default {
                event.prevent_default();
            }
            if response.stop_propagation {
                event.stop_propagation();
            }
        });
        let result = self.event_target(&target).add_event_listener_with_callback_and_bool(
            binding.event_type(),
            closure.as_ref().unchecked_ref(),
            uses_capture(binding),
        );
        match result {
            Ok(()) => self.listeners.push(Listener { target, binding, closure }),
            Err(err) => tracing::warn!(?binding, error = ?err, "failed to add listener"),
        }
    }

    fn unbind(&mut self, target: &ListenTarget<Element>, binding: Binding) {
        let Some(index) =
            self.listeners.iter().position(|l| &l.target == target && l.binding == binding)
        else {
            return;
        };
        let listener = self.listeners.remove(index);
        self.detach(&listener);
    }

    // At most one request is outstanding; a newer one replaces it.
    fn request_animation_frame(&mut self) {
        self.cancel_animation_frame();
        let callback = self.frame_callback.as_ref().unchecked_ref();
        match self.window.request_animation_frame(callback) {
            Ok(handle) => self.frame_request = Some(handle),
            Err(err) => tracing::warn!(error = ?err, "animation frame request failed"),
        }
    }

    fn cancel_animation_frame(&mut self) {
        if let Some(handle) = self.frame_request.take() {
            if let Err(err) = self.window.cancel_animation_frame(handle) {
                tracing::debug!(error = ?err, "animation frame cancel failed");
            }
        }
    }

    fn has_marker(&self, name: &str) -> bool {
        js_sys::Reflect::get(&self.window, &JsValue::from_str(name))
            .map(|value| value.is_truthy())
            .unwrap_or(false)
    }

    fn set_marker(&mut self, name: &str, on: bool) {
        let key = JsValue::from_str(name);
        let result = if on {
            js_sys::Reflect::set(&self.window, &key, &JsValue::TRUE).map(drop)
        } else {
            js_sys::Reflect::delete_property(self.window.unchecked_ref(), &key).map(drop)
        };
        if let Err(err) = result {
            tracing::warn!(name, error = ?err, "failed to update install marker");
        }
    }
}

/// Posts to `window.parent` with target origin `"*"`.
#[derive(Debug, Clone)]
pub struct ParentFrameTransport {
    window: web_sys::Window,
}

impl ParentFrameTransport {
    pub fn new(window: web_sys::Window) -> Self {
        Self { window }
    }
}

impl Transport for ParentFrameTransport {
    fn post(&self, message: &serde_json::Value) -> Result<(), ChannelError> {
        let parent = self
            .window
            .parent()
            .map_err(|err| ChannelError::Delivery(format!("{err:?}")))?
            .ok_or_else(|| ChannelError::Delivery("no parent frame".to_owned()))?;
        parent
            .post_message(&json_to_js(message)?, "*")
            .map_err(|err| ChannelError::Delivery(format!("{err:?}")))
    }
}

/// Routes one event to the installed controller.
///
/// Events that arrive while the controller is already borrowed (a handler that synchronously
/// re-enters the page) are dropped.
fn dispatch(event: HostEvent) -> EventResponse {
    INSTANCE.with(|slot| {
        let Ok(mut slot) = slot.try_borrow_mut() else {
            tracing::debug!(?event, "re-entrant event dropped");
            return EventResponse::PASS;
        };
        let Some(controller) = slot.as_mut() else {
            return EventResponse::PASS;
        };
        let response = controller.handle(event);
        for task in controller.take_capture_tasks() {
            wasm_bindgen_futures::spawn_local(async move {
                task.run().await;
            });
        }
        response
    })
}

/// Installs the source selector into the current page.
///
/// `config` is an optional plain object using the same field names as the JSON config.
#[wasm_bindgen(js_name = installSourceSelector)]
pub fn install(config: JsValue) -> Result<(), JsValue> {
    let config: InspectConfig = if config.is_undefined() || config.is_null() {
        InspectConfig::default()
    } else {
        let raw = js_to_json(&config).ok_or_else(|| JsValue::from_str("config is not JSON"))?;
        serde_json::from_value(raw).map_err(|err| JsValue::from_str(&err.to_string()))?
    };

    let doc = WebDocument::new().map_err(|err| JsValue::from_str(&err.to_string()))?;
    let transport = ParentFrameTransport::new(doc.window.clone());
    INSTANCE.with(|slot| {
        let mut slot =
            slot.try_borrow_mut().map_err(|_| JsValue::from_str("source selector is busy"))?;
        let controller = Controller::install(doc, transport, config)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        *slot = Some(controller);
        Ok(())
    })
}

/// Removes every overlay and listener and clears the installation marker.
#[wasm_bindgen(js_name = uninstallSourceSelector)]
pub fn uninstall() {
    let controller = INSTANCE.with(|slot| slot.try_borrow_mut().ok().and_then(|mut slot| slot.take()));
    if let Some(controller) = controller {
        drop(controller.uninstall());
    }
}
