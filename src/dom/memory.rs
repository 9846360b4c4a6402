// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Arena-backed in-memory document.
//!
//! Page nodes carry a layout rectangle in document coordinates; their bounding rect is that
//! rectangle shifted by the scroll offset. Overlay nodes created through [`Document`] are laid
//! out from their inline `position`/`left`/`top`/`width`/`height` declarations instead, which is
//! enough to exercise hit-testing against real overlay geometry.

use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use super::{Binding, Document, DomError, ListenTarget};
use crate::model::{group_id_for, Point, Rect, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    tag_name: String,
    attrs: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    layout: Option<Rect>,
    text: String,
    value: String,
}

impl Node {
    fn new(tag_name: &str, parent: Option<NodeId>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: Vec::new(),
            styles: Vec::new(),
            layout: None,
            text: String::new(),
            value: String::new(),
        }
    }

    fn style(&self, property: &str) -> Option<&str> {
        self.styles.iter().find(|(name, _)| name == property).map(|(_, value)| value.as_str())
    }
}

#[derive(Debug)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    body: NodeId,
    viewport: Viewport,
    bindings: Vec<(ListenTarget<NodeId>, Binding)>,
    markers: BTreeSet<String>,
    focused: Option<NodeId>,
    frame_requests: usize,
    clock_ms: f64,
    fail_next_hit_test: Cell<bool>,
}

impl MemoryDocument {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            nodes: vec![Node::new("body", None)],
            body: NodeId(0),
            viewport,
            bindings: Vec::new(),
            markers: BTreeSet::new(),
            focused: None,
            frame_requests: 0,
            clock_ms: 0.0,
            fail_next_hit_test: Cell::new(false),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Appends a page element laid out at `layout` (document coordinates).
    pub fn append(&mut self, parent: NodeId, tag: &str, layout: Rect) -> NodeId {
        let id = self.push_node(tag, parent);
        self.nodes[id.0].layout = Some(layout);
        id
    }

    /// Appends a page element stamped the way the build-time annotator stamps JSX output.
    pub fn append_tagged(
        &mut self,
        parent: NodeId,
        tag: &str,
        layout: Rect,
        source: &SourceFixture,
    ) -> NodeId {
        let id = self.append(parent, tag, layout);
        self.stamp_source(id, source);
        id
    }

    pub fn stamp_source(&mut self, node: NodeId, source: &SourceFixture) {
        let group_id = group_id_for(&source.file, source.line, source.column);
        let line = source.line.to_string();
        self.set_attribute(&node, "data-source-file", &source.file);
        self.set_attribute(&node, "data-source-line", &line);
        self.set_attribute(&node, "data-source-component", &source.component);
        self.set_attribute(&node, "data-raccoon-id", group_id.as_str());
    }

    pub fn set_layout(&mut self, node: NodeId, layout: Rect) {
        if let Some(entry) = self.nodes.get_mut(node.0) {
            entry.layout = Some(layout);
        }
    }

    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.viewport.scroll_x = x;
        self.viewport.scroll_y = y;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    pub fn advance_clock(&mut self, ms: f64) {
        self.clock_ms += ms;
    }

    /// Makes the next [`Document::element_from_point`] call fail.
    pub fn fail_next_hit_test(&self) {
        self.fail_next_hit_test.set(true);
    }

    pub fn is_bound(&self, target: &ListenTarget<NodeId>, binding: Binding) -> bool {
        self.bindings.iter().any(|(t, b)| t == target && *b == binding)
    }

    pub fn bindings(&self) -> &[(ListenTarget<NodeId>, Binding)] {
        &self.bindings
    }

    /// Returns and resets the number of pending animation frame requests.
    pub fn take_frame_requests(&mut self) -> usize {
        std::mem::take(&mut self.frame_requests)
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn text(&self, node: NodeId) -> &str {
        self.nodes.get(node.0).map(|n| n.text.as_str()).unwrap_or_default()
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node.0).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    /// Connected elements carrying `name` with any value, in document order.
    pub fn nodes_with_attribute(&self, name: &str) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|id| self.nodes[id.0].attrs.iter().any(|(attr, _)| attr == name))
            .collect()
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.query_by_attribute("id", id).into_iter().next()
    }

    /// Builds a document from a fixture tree. Returns the document and the fixture `id` index.
    pub fn from_fixture(
        viewport: Viewport,
        roots: &[DocumentFixture],
    ) -> (Self, BTreeMap<String, NodeId>) {
        let mut doc = Self::new(viewport);
        let mut ids = BTreeMap::new();
        let body = doc.body;
        for root in roots {
            doc.build_fixture(body, root, &mut ids);
        }
        (doc, ids)
    }

    fn build_fixture(
        &mut self,
        parent: NodeId,
        fixture: &DocumentFixture,
        ids: &mut BTreeMap<String, NodeId>,
    ) {
        let node = self.append(parent, &fixture.tag, fixture.rect);
        if let Some(id) = &fixture.id {
            self.set_attribute(&node, "id", id);
            ids.insert(id.clone(), node);
        }
        for (name, value) in &fixture.attrs {
            self.set_attribute(&node, name, value);
        }
        if let Some(source) = &fixture.source {
            self.stamp_source(node, source);
        }
        if let Some(text) = &fixture.text {
            self.nodes[node.0].text = text.clone();
        }
        for child in &fixture.children {
            self.build_fixture(node, child, ids);
        }
    }

    fn push_node(&mut self, tag: &str, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(tag, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.body];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    fn ancestors_inclusive(&self, node: NodeId) -> impl Iterator<Item = &Node> + '_ {
        let mut next = Some(node);
        std::iter::from_fn(move || {
            let id = next?;
            let entry = self.nodes.get(id.0)?;
            next = entry.parent;
            Some(entry)
        })
    }

    /// Inherited property lookup (`pointer-events`, `visibility`, `z-index` stacking).
    fn effective_style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.ancestors_inclusive(node).find_map(|entry| entry.style(property))
    }

    fn is_displayed(&self, node: NodeId) -> bool {
        self.ancestors_inclusive(node).all(|entry| entry.style("display") != Some("none"))
    }

    fn is_hit_testable(&self, node: NodeId) -> bool {
        self.is_displayed(node)
            && self.effective_style(node, "pointer-events") != Some("none")
            && self.effective_style(node, "visibility") != Some("hidden")
    }

    fn z_index(&self, node: NodeId) -> i64 {
        self.effective_style(node, "z-index").and_then(|raw| raw.trim().parse().ok()).unwrap_or(0)
    }

    fn positioned_rect(&self, entry: &Node) -> Option<Rect> {
        let position = entry.style("position")?;
        let viewport = self.viewport;
        let left = parse_length(entry.style("left"), viewport.width);
        let top = parse_length(entry.style("top"), viewport.height);
        let width = parse_length(entry.style("width"), viewport.width);
        let height = parse_length(entry.style("height"), viewport.height);
        match position {
            "fixed" => Some(Rect::new(left, top, width, height)),
            "absolute" => {
                Some(Rect::new(left - viewport.scroll_x, top - viewport.scroll_y, width, height))
            }
            _ => None,
        }
    }
}

fn parse_length(raw: Option<&str>, basis: f64) -> f64 {
    let Some(raw) = raw.map(str::trim) else {
        return 0.0;
    };
    if let Some(px) = raw.strip_suffix("px") {
        return px.trim().parse().unwrap_or(0.0);
    }
    if let Some(pct) = raw.strip_suffix('%') {
        return pct.trim().parse::<f64>().map(|p| p / 100.0 * basis).unwrap_or(0.0);
    }
    raw.parse().unwrap_or(0.0)
}

impl Document for MemoryDocument {
    type Node = NodeId;

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.nodes
            .get(node.0)?
            .attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.clone())
    }

    fn attributes(&self, node: &NodeId) -> Vec<(String, String)> {
        self.nodes.get(node.0).map(|n| n.attrs.clone()).unwrap_or_default()
    }

    fn tag_name(&self, node: &NodeId) -> String {
        self.nodes.get(node.0).map(|n| n.tag_name.clone()).unwrap_or_default()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn is_connected(&self, node: &NodeId) -> bool {
        let mut current = *node;
        loop {
            if current == self.body {
                return true;
            }
            match self.nodes.get(current.0).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn query_by_attribute(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|id| self.nodes[id.0].attrs.iter().any(|(attr, v)| attr == name && v == value))
            .collect()
    }

    fn bounding_rect(&self, node: &NodeId) -> Rect {
        let Some(entry) = self.nodes.get(node.0) else {
            return Rect::default();
        };
        if let Some(rect) = self.positioned_rect(entry) {
            return rect;
        }
        if let Some(layout) = entry.layout {
            return layout.translate(-self.viewport.scroll_x, -self.viewport.scroll_y);
        }
        // Unpositioned overlay children fill their parent.
        match entry.parent {
            Some(parent) => self.bounding_rect(&parent),
            None => Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height),
        }
    }

    fn element_from_point(&self, point: Point) -> Result<Option<NodeId>, DomError> {
        if self.fail_next_hit_test.replace(false) {
            return Err(DomError::Host("elementFromPoint failed".to_owned()));
        }
        if point.x < 0.0
            || point.y < 0.0
            || point.x >= self.viewport.width
            || point.y >= self.viewport.height
        {
            return Ok(None);
        }

        let mut best: Option<(i64, usize, NodeId)> = None;
        for (order, id) in self.preorder().into_iter().enumerate() {
            if id == self.body || !self.is_hit_testable(id) {
                continue;
            }
            if !self.bounding_rect(&id).contains(point) {
                continue;
            }
            let rank = (self.z_index(id), order);
            if best.map_or(true, |(z, o, _)| rank >= (z, o)) {
                best = Some((rank.0, rank.1, id));
            }
        }
        Ok(Some(best.map(|(_, _, id)| id).unwrap_or(self.body)))
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn now_ms(&self) -> f64 {
        self.clock_ms
    }

    fn create_element(&mut self, tag: &str, parent: Option<&NodeId>) -> Result<NodeId, DomError> {
        let parent = parent.copied().unwrap_or(self.body);
        if parent.0 >= self.nodes.len() {
            return Err(DomError::NotAnElement);
        }
        Ok(self.push_node(tag, parent))
    }

    fn remove(&mut self, node: &NodeId) {
        if *node == self.body {
            return;
        }
        let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent) else {
            return;
        };
        self.nodes[parent.0].children.retain(|child| child != node);
        self.nodes[node.0].parent = None;

        let mut detached = vec![*node];
        let mut cursor = 0;
        while cursor < detached.len() {
            detached.extend(self.nodes[detached[cursor].0].children.iter().copied());
            cursor += 1;
        }
        self.bindings.retain(|(target, _)| match target {
            ListenTarget::Node(id) => !detached.contains(id),
            ListenTarget::Window => true,
        });
        if self.focused.is_some_and(|focused| detached.contains(&focused)) {
            self.focused = None;
        }
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        let Some(entry) = self.nodes.get_mut(node.0) else {
            return;
        };
        match entry.attrs.iter_mut().find(|(attr, _)| attr == name) {
            Some(slot) => slot.1 = value.to_owned(),
            None => entry.attrs.push((name.to_owned(), value.to_owned())),
        }
    }

    fn style(&self, node: &NodeId, property: &str) -> String {
        self.nodes
            .get(node.0)
            .and_then(|entry| entry.style(property))
            .map(str::to_owned)
            .unwrap_or_default()
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) {
        let Some(entry) = self.nodes.get_mut(node.0) else {
            return;
        };
        let pos = entry.styles.iter().position(|(name, _)| name == property);
        match (pos, value.is_empty()) {
            (Some(pos), true) => {
                entry.styles.remove(pos);
            }
            (Some(pos), false) => entry.styles[pos].1 = value.to_owned(),
            (None, false) => entry.styles.push((property.to_owned(), value.to_owned())),
            (None, true) => {}
        }
    }

    fn set_text(&mut self, node: &NodeId, text: &str) {
        if let Some(entry) = self.nodes.get_mut(node.0) {
            entry.text = text.to_owned();
        }
    }

    fn input_value(&self, node: &NodeId) -> String {
        self.nodes.get(node.0).map(|n| n.value.clone()).unwrap_or_default()
    }

    fn set_input_value(&mut self, node: &NodeId, value: &str) {
        if let Some(entry) = self.nodes.get_mut(node.0) {
            entry.value = value.to_owned();
        }
    }

    fn focus(&mut self, node: &NodeId) {
        if self.is_connected(node) {
            self.focused = Some(*node);
        }
    }

    fn bind(&mut self, target: ListenTarget<NodeId>, binding: Binding) {
        if !self.is_bound(&target, binding) {
            self.bindings.push((target, binding));
        }
    }

    fn unbind(&mut self, target: &ListenTarget<NodeId>, binding: Binding) {
        self.bindings.retain(|(t, b)| !(t == target && *b == binding));
    }

    fn request_animation_frame(&mut self) {
        self.frame_requests += 1;
    }

    fn cancel_animation_frame(&mut self) {
        self.frame_requests = 0;
    }

    fn has_marker(&self, name: &str) -> bool {
        self.markers.contains(name)
    }

    fn set_marker(&mut self, name: &str, on: bool) {
        if on {
            self.markers.insert(name.to_owned());
        } else {
            self.markers.remove(name);
        }
    }
}

/// Source location stamped onto a fixture element.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceFixture {
    pub file: String,
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    pub component: String,
}

impl SourceFixture {
    pub fn new(component: &str, file: &str, line: u32, column: u32) -> Self {
        Self { file: file.to_owned(), line, column, component: component.to_owned() }
    }
}

/// Serializable description of a page subtree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentFixture {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub rect: Rect,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub source: Option<SourceFixture>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<DocumentFixture>,
}

#[cfg(test)]
mod tests {
    use super::{DocumentFixture, MemoryDocument, SourceFixture};
    use crate::dom::{Binding, Document, ListenTarget};
    use crate::model::{Point, Rect, Viewport};

    fn doc() -> MemoryDocument {
        MemoryDocument::new(Viewport::new(800.0, 600.0))
    }

    #[test]
    fn hit_test_prefers_deepest_then_latest() {
        let mut doc = doc();
        let body = doc.body();
        let outer = doc.append(body, "div", Rect::new(0.0, 0.0, 400.0, 400.0));
        let inner = doc.append(outer, "span", Rect::new(10.0, 10.0, 50.0, 20.0));

        assert_eq!(doc.element_from_point(Point::new(20.0, 15.0)), Ok(Some(inner)));
        assert_eq!(doc.element_from_point(Point::new(300.0, 300.0)), Ok(Some(outer)));
        assert_eq!(doc.element_from_point(Point::new(700.0, 500.0)), Ok(Some(body)));
        assert_eq!(doc.element_from_point(Point::new(900.0, 10.0)), Ok(None));
    }

    #[test]
    fn hit_test_skips_hidden_and_non_interactive_subtrees() {
        let mut doc = doc();
        let body = doc.body();
        let page = doc.append(body, "div", Rect::new(0.0, 0.0, 100.0, 100.0));
        let layer = doc.create_element("div", None).unwrap();
        for (p, v) in [("position", "fixed"), ("width", "100%"), ("height", "100%")] {
            doc.set_style(&layer, p, v);
        }
        doc.set_style(&layer, "z-index", "10");

        assert_eq!(doc.element_from_point(Point::new(5.0, 5.0)), Ok(Some(layer)));
        doc.set_style(&layer, "pointer-events", "none");
        assert_eq!(doc.element_from_point(Point::new(5.0, 5.0)), Ok(Some(page)));
        doc.set_style(&layer, "pointer-events", "");
        doc.set_style(&layer, "visibility", "hidden");
        assert_eq!(doc.element_from_point(Point::new(5.0, 5.0)), Ok(Some(page)));
    }

    #[test]
    fn failure_switch_is_one_shot() {
        let doc = doc();
        doc.fail_next_hit_test();
        assert!(doc.element_from_point(Point::new(1.0, 1.0)).is_err());
        assert!(doc.element_from_point(Point::new(1.0, 1.0)).is_ok());
    }

    #[test]
    fn bounding_rect_follows_scroll_for_page_and_absolute_nodes() {
        let mut doc = doc();
        let body = doc.body();
        let page = doc.append(body, "div", Rect::new(10.0, 200.0, 50.0, 50.0));
        let marker = doc.create_element("div", None).unwrap();
        for (p, v) in [("position", "absolute"), ("left", "10px"), ("top", "200px")] {
            doc.set_style(&marker, p, v);
        }
        doc.set_style(&marker, "width", "50px");
        doc.set_style(&marker, "height", "50px");

        doc.scroll_to(0.0, 120.0);
        assert_eq!(doc.bounding_rect(&page), Rect::new(10.0, 80.0, 50.0, 50.0));
        assert_eq!(doc.bounding_rect(&marker), doc.bounding_rect(&page));
    }

    #[test]
    fn removing_a_node_disconnects_subtree_and_drops_bindings() {
        let mut doc = doc();
        let body = doc.body();
        let parent = doc.append(body, "ul", Rect::new(0.0, 0.0, 10.0, 10.0));
        let child = doc.append(parent, "li", Rect::new(0.0, 0.0, 10.0, 10.0));
        doc.bind(ListenTarget::Node(child), Binding::LayerClick);
        doc.bind(ListenTarget::Window, Binding::Scroll);

        doc.remove(&parent);
        assert!(!doc.is_connected(&child));
        assert!(!doc.is_bound(&ListenTarget::Node(child), Binding::LayerClick));
        assert!(doc.is_bound(&ListenTarget::Window, Binding::Scroll));
    }

    #[test]
    fn query_by_attribute_is_live_and_in_document_order() {
        let mut doc = doc();
        let body = doc.body();
        let source = SourceFixture::new("Item", "list.tsx", 4, 8);
        let a = doc.append_tagged(body, "li", Rect::new(0.0, 0.0, 10.0, 10.0), &source);
        let b = doc.append_tagged(body, "li", Rect::new(0.0, 10.0, 10.0, 10.0), &source);
        let group = doc.attribute(&a, "data-raccoon-id").unwrap();

        assert_eq!(doc.query_by_attribute("data-raccoon-id", &group), vec![a, b]);
        doc.remove(&a);
        assert_eq!(doc.query_by_attribute("data-raccoon-id", &group), vec![b]);
    }

    #[test]
    fn empty_style_value_removes_the_declaration() {
        let mut doc = doc();
        let node = doc.create_element("div", None).unwrap();
        doc.set_style(&node, "visibility", "hidden");
        assert_eq!(doc.style(&node, "visibility"), "hidden");
        doc.set_style(&node, "visibility", "");
        assert_eq!(doc.style(&node, "visibility"), "");
    }

    #[test]
    fn builds_from_fixture_json() {
        let fixture: Vec<DocumentFixture> = serde_json::from_str(
            r#"[{
                "tag": "section", "id": "root", "rect": {"x": 0, "y": 0, "width": 300, "height": 200},
                "children": [{
                    "tag": "button", "id": "cta",
                    "rect": {"x": 20, "y": 20, "width": 80, "height": 30},
                    "attrs": {"class": "primary"},
                    "source": {"file": "App.tsx", "line": 12, "column": 6, "component": "App"}
                }]
            }]"#,
        )
        .unwrap();
        let (doc, ids) = MemoryDocument::from_fixture(Viewport::new(800.0, 600.0), &fixture);
        let cta = ids["cta"];
        assert_eq!(doc.attribute(&cta, "data-source-component").as_deref(), Some("App"));
        assert_eq!(doc.attribute(&cta, "data-source-line").as_deref(), Some("12"));
        assert_eq!(doc.parent(&cta), Some(ids["root"]));
        assert_eq!(doc.element_from_point(Point::new(30.0, 30.0)), Ok(Some(cta)));
    }
}
