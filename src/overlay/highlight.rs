// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Highlight markers drawn over page elements.
//!
//! Markers are absolutely positioned overlay nodes, one per live group member at the time the
//! set was created. The renderer is their only owner: nothing else keeps a handle to a marker,
//! and every transition that drops a set removes its nodes from the document.

use smallvec::SmallVec;

use super::{px, OVERLAY_ATTRIBUTE, Z_MARKERS};
use crate::config::OverlayColors;
use crate::dom::Document;
use crate::model::SelectionKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// Transient, dashed.
    Hover,
    /// Persistent, solid.
    Selected,
    /// A selected group under the pointer.
    HoverSelected,
}

impl MarkerStyle {
    pub fn role(self) -> &'static str {
        match self {
            Self::Hover => "hover",
            Self::Selected => "selected",
            Self::HoverSelected => "selected-hover",
        }
    }
}

#[derive(Debug, Clone)]
struct Marker<N> {
    overlay: N,
    target: N,
}

type MarkerSet<N> = SmallVec<[Marker<N>; 4]>;

#[derive(Debug, Clone)]
struct HoverState<N> {
    key: SelectionKey<N>,
    /// Empty when the hovered group is selected: its selected markers are restyled instead.
    markers: MarkerSet<N>,
}

#[derive(Debug)]
pub struct HighlightRenderer<N> {
    colors: OverlayColors,
    selected: Vec<(SelectionKey<N>, MarkerSet<N>)>,
    hover: Option<HoverState<N>>,
}

impl<N: Clone + PartialEq> HighlightRenderer<N> {
    pub fn new(colors: OverlayColors) -> Self {
        Self { colors, selected: Vec::new(), hover: None }
    }

    pub fn hovered_key(&self) -> Option<&SelectionKey<N>> {
        self.hover.as_ref().map(|hover| &hover.key)
    }

    pub fn is_selected(&self, key: &SelectionKey<N>) -> bool {
        self.selected_index(key).is_some()
    }

    /// Replaces the hover highlight with one for `key`.
    ///
    /// A selected group is restyled in place instead of getting a second set of markers.
    pub fn show_hover<D: Document<Node = N>>(
        &mut self,
        doc: &mut D,
        key: SelectionKey<N>,
        members: &[N],
    ) {
        self.clear_hover(doc);
        if let Some(index) = self.selected_index(&key) {
            self.restyle_selected(doc, index, MarkerStyle::HoverSelected);
            self.hover = Some(HoverState { key, markers: SmallVec::new() });
            return;
        }
        let markers = self.create_markers(doc, members, MarkerStyle::Hover);
        self.hover = Some(HoverState { key, markers });
    }

    pub fn clear_hover<D: Document<Node = N>>(&mut self, doc: &mut D) {
        let Some(hover) = self.hover.take() else {
            return;
        };
        remove_markers(doc, &hover.markers);
        if let Some(index) = self.selected_index(&hover.key) {
            self.restyle_selected(doc, index, MarkerStyle::Selected);
        }
    }

    /// Creates the persistent marker set for `key`. No-op when already selected.
    pub fn select<D: Document<Node = N>>(
        &mut self,
        doc: &mut D,
        key: SelectionKey<N>,
        members: &[N],
    ) {
        if self.is_selected(&key) {
            return;
        }
        let hovered = self.hover.as_ref().is_some_and(|hover| hover.key == key);
        let style = if hovered {
            if let Some(hover) = self.hover.as_mut() {
                remove_markers(doc, &hover.markers);
                hover.markers.clear();
            }
            MarkerStyle::HoverSelected
        } else {
            MarkerStyle::Selected
        };
        let markers = self.create_markers(doc, members, style);
        self.selected.push((key, markers));
    }

    /// Destroys the persistent marker set for `key`. If that group was hovered, the hover state
    /// is dropped too; callers re-show it with fresh members.
    pub fn deselect<D: Document<Node = N>>(&mut self, doc: &mut D, key: &SelectionKey<N>) -> bool {
        let Some(index) = self.selected_index(key) else {
            return false;
        };
        let (_, markers) = self.selected.remove(index);
        remove_markers(doc, &markers);
        if self.hover.as_ref().is_some_and(|hover| &hover.key == key) {
            self.hover = None;
        }
        true
    }

    /// Moves every marker onto its target's current rectangle. Markers whose target left the
    /// document keep their last geometry until their set is cleared.
    pub fn reposition<D: Document<Node = N>>(&self, doc: &mut D) {
        let hover = self.hover.iter().flat_map(|hover| hover.markers.iter());
        for marker in self.selected.iter().flat_map(|(_, set)| set.iter()).chain(hover) {
            if doc.is_connected(&marker.target) {
                place(doc, &marker.overlay, &marker.target);
            }
        }
    }

    /// Removes every marker, hover and selected.
    pub fn clear<D: Document<Node = N>>(&mut self, doc: &mut D) {
        if let Some(hover) = self.hover.take() {
            remove_markers(doc, &hover.markers);
        }
        for (_, markers) in self.selected.drain(..) {
            remove_markers(doc, &markers);
        }
    }

    pub fn overlay_nodes(&self) -> Vec<N> {
        let hover = self.hover.iter().flat_map(|hover| hover.markers.iter());
        self.selected
            .iter()
            .flat_map(|(_, set)| set.iter())
            .chain(hover)
            .map(|marker| marker.overlay.clone())
            .collect()
    }

    pub fn hover_marker_count(&self) -> usize {
        self.hover.as_ref().map_or(0, |hover| hover.markers.len())
    }

    pub fn selected_marker_count(&self, key: &SelectionKey<N>) -> usize {
        self.selected_index(key).map_or(0, |index| self.selected[index].1.len())
    }

    pub fn marker_count(&self) -> usize {
        self.hover_marker_count() + self.selected.iter().map(|(_, set)| set.len()).sum::<usize>()
    }

    fn selected_index(&self, key: &SelectionKey<N>) -> Option<usize> {
        self.selected.iter().position(|(selected, _)| selected == key)
    }

    fn restyle_selected<D: Document<Node = N>>(
        &self,
        doc: &mut D,
        index: usize,
        style: MarkerStyle,
    ) {
        for marker in &self.selected[index].1 {
            self.paint(doc, &marker.overlay, style);
        }
    }

    fn create_markers<D: Document<Node = N>>(
        &self,
        doc: &mut D,
        members: &[N],
        style: MarkerStyle,
    ) -> MarkerSet<N> {
        let mut markers = MarkerSet::new();
        for target in members {
            let overlay = match doc.create_element("div", None) {
                Ok(overlay) => overlay,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to create highlight marker");
                    continue;
                }
            };
            for (property, value) in [
                ("position", "absolute"),
                ("pointer-events", "none"),
                ("box-sizing", "border-box"),
                ("border-radius", "2px"),
                ("z-index", Z_MARKERS),
            ] {
                doc.set_style(&overlay, property, value);
            }
            self.paint(doc, &overlay, style);
            place(doc, &overlay, target);
            markers.push(Marker { overlay, target: target.clone() });
        }
        markers
    }

    fn paint<D: Document<Node = N>>(&self, doc: &mut D, overlay: &N, style: MarkerStyle) {
        let colors = &self.colors;
        let (border, background, shadow) = match style {
            MarkerStyle::Hover => {
                (format!("2px dashed {}", colors.accent), colors.hover_fill.as_str(), "")
            }
            MarkerStyle::Selected => {
                (format!("2px solid {}", colors.accent), colors.selected_fill.as_str(), "")
            }
            MarkerStyle::HoverSelected => (
                format!("2px solid {}", colors.accent_strong),
                colors.selected_fill.as_str(),
                "0 0 0 2px rgba(47, 63, 208, 0.35)",
            ),
        };
        doc.set_attribute(overlay, OVERLAY_ATTRIBUTE, style.role());
        doc.set_style(overlay, "border", &border);
        doc.set_style(overlay, "background", background);
        doc.set_style(overlay, "box-shadow", shadow);
    }
}

fn place<D: Document>(doc: &mut D, overlay: &D::Node, target: &D::Node) {
    let rect = doc.bounding_rect(target);
    let viewport = doc.viewport();
    doc.set_style(overlay, "left", &px(rect.x + viewport.scroll_x));
    doc.set_style(overlay, "top", &px(rect.y + viewport.scroll_y));
    doc.set_style(overlay, "width", &px(rect.width));
    doc.set_style(overlay, "height", &px(rect.height));
}

fn remove_markers<D: Document>(doc: &mut D, markers: &[Marker<D::Node>]) {
    for marker in markers {
        doc.remove(&marker.overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::{HighlightRenderer, MarkerStyle};
    use crate::config::OverlayColors;
    use crate::dom::{Document, MemoryDocument, NodeId, SourceFixture};
    use crate::model::{group_id_for, Rect, SelectionKey, Viewport};
    use crate::overlay::OVERLAY_ATTRIBUTE;

    struct Page {
        doc: MemoryDocument,
        cards: Vec<NodeId>,
        key: SelectionKey<NodeId>,
    }

    fn page(count: usize) -> Page {
        let mut doc = MemoryDocument::new(Viewport::new(800.0, 600.0));
        let body = doc.body();
        let source = SourceFixture::new("Card", "a.tsx", 10, 4);
        let cards = (0..count)
            .map(|i| {
                let rect = Rect::new(10.0, 10.0 + 60.0 * i as f64, 200.0, 50.0);
                doc.append_tagged(body, "div", rect, &source)
            })
            .collect();
        Page { doc, cards, key: SelectionKey::Group(group_id_for("a.tsx", 10, 4)) }
    }

    fn roles(doc: &MemoryDocument, role: &str) -> usize {
        doc.query_by_attribute(OVERLAY_ATTRIBUTE, role).len()
    }

    #[test]
    fn select_creates_one_marker_per_member_and_deselect_removes_them() {
        let Page { mut doc, cards, key } = page(3);
        let mut renderer = HighlightRenderer::new(OverlayColors::default());

        renderer.select(&mut doc, key.clone(), &cards);
        assert_eq!(renderer.selected_marker_count(&key), 3);
        assert_eq!(roles(&doc, "selected"), 3);

        for (overlay, card) in renderer.overlay_nodes().iter().zip(&cards) {
            assert_eq!(doc.bounding_rect(overlay), doc.bounding_rect(card));
        }

        assert!(renderer.deselect(&mut doc, &key));
        assert_eq!(renderer.marker_count(), 0);
        assert!(doc.nodes_with_attribute(OVERLAY_ATTRIBUTE).is_empty());
    }

    #[test]
    fn hovering_a_selected_group_restyles_instead_of_duplicating() {
        let Page { mut doc, cards, key } = page(2);
        let mut renderer = HighlightRenderer::new(OverlayColors::default());
        renderer.select(&mut doc, key.clone(), &cards);

        renderer.show_hover(&mut doc, key.clone(), &cards);
        assert_eq!(renderer.hover_marker_count(), 0);
        assert_eq!(roles(&doc, MarkerStyle::HoverSelected.role()), 2);
        assert_eq!(doc.nodes_with_attribute(OVERLAY_ATTRIBUTE).len(), 2);

        renderer.clear_hover(&mut doc);
        assert_eq!(roles(&doc, "selected"), 2);
        assert_eq!(roles(&doc, "selected-hover"), 0);
    }

    #[test]
    fn selecting_the_hovered_group_replaces_hover_markers() {
        let Page { mut doc, cards, key } = page(2);
        let mut renderer = HighlightRenderer::new(OverlayColors::default());
        renderer.show_hover(&mut doc, key.clone(), &cards);
        assert_eq!(roles(&doc, "hover"), 2);

        renderer.select(&mut doc, key.clone(), &cards);
        assert_eq!(roles(&doc, "hover"), 0);
        assert_eq!(roles(&doc, "selected-hover"), 2);
        assert_eq!(renderer.hovered_key(), Some(&key));
    }

    #[test]
    fn reposition_tracks_layout_and_skips_detached_targets() {
        let Page { mut doc, cards, key } = page(2);
        let mut renderer = HighlightRenderer::new(OverlayColors::default());
        renderer.select(&mut doc, key, &cards);
        let overlays = renderer.overlay_nodes();
        let stale = doc.bounding_rect(&overlays[1]);

        doc.set_layout(cards[0], Rect::new(300.0, 300.0, 40.0, 40.0));
        doc.remove(&cards[1]);
        doc.scroll_to(0.0, 25.0);
        renderer.reposition(&mut doc);

        assert_eq!(doc.bounding_rect(&overlays[0]), doc.bounding_rect(&cards[0]));
        assert_eq!(doc.bounding_rect(&overlays[0]), Rect::new(300.0, 275.0, 40.0, 40.0));
        // Absolute markers scroll with the page even when left stale.
        assert_eq!(doc.bounding_rect(&overlays[1]), stale.translate(0.0, -25.0));
        assert_eq!(renderer.marker_count(), 2);
    }

    #[test]
    fn clear_removes_everything() {
        let Page { mut doc, cards, key } = page(2);
        let mut renderer = HighlightRenderer::new(OverlayColors::default());
        renderer.select(&mut doc, key, &cards[..1]);
        renderer.show_hover(&mut doc, SelectionKey::Node(cards[1]), &cards[1..]);
        assert_eq!(renderer.marker_count(), 2);

        renderer.clear(&mut doc);
        assert_eq!(renderer.marker_count(), 0);
        assert!(renderer.hovered_key().is_none());
        assert!(doc.nodes_with_attribute(OVERLAY_ATTRIBUTE).is_empty());
    }
}
