// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Floating query panel shown after a committing click.

use super::{px, OVERLAY_ATTRIBUTE, Z_TOOLBAR};
use crate::config::{OverlayColors, ToolbarConfig};
use crate::dom::{apply_styles, Binding, Document, DomError, KeyInput, ListenTarget};
use crate::model::{Point, Size};

pub const EMPTY_SELECTION_FEEDBACK: &str = "Select at least one element";

/// Top-left corner of a `panel`-sized toolbar anchored at `anchor`.
///
/// The panel sits `offset` below and right of the anchor, flips to the other side of the anchor
/// on an axis where it would cross the viewport edge, and is finally clamped so it keeps
/// `edge_inset` from every edge.
pub fn placement(anchor: Point, panel: Size, viewport: Size, config: &ToolbarConfig) -> Point {
    let axis = |anchor: f64, extent: f64, limit: f64| {
        let mut start = anchor + config.offset;
        if start + extent > limit {
            start = anchor - config.offset - extent;
        }
        // Too small a viewport keeps the leading inset.
        start.min(limit - extent - config.edge_inset).max(config.edge_inset)
    };
    Point::new(
        axis(anchor.x, panel.width, viewport.width),
        axis(anchor.y, panel.height, viewport.height),
    )
}

/// What a key pressed inside the panel means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarKeyAction {
    Abort,
    Submit,
    /// Typed into the field; only kept away from the page.
    Contained,
}

impl ToolbarKeyAction {
    pub fn classify(key: &KeyInput, abort_key: &str) -> Self {
        if key.key == abort_key {
            Self::Abort
        } else if key.key == "Enter" && !key.modifiers.shift {
            Self::Submit
        } else {
            Self::Contained
        }
    }
}

#[derive(Debug)]
pub struct Toolbar<N> {
    panel: N,
    count: N,
    input: N,
    feedback: N,
    feedback_until: Option<f64>,
}

impl<N: Clone + PartialEq> Toolbar<N> {
    /// Builds the panel near `anchor` (viewport coordinates), focuses the field and binds the
    /// panel's key, submit and cancel events.
    pub fn open<D: Document<Node = N>>(
        doc: &mut D,
        config: &ToolbarConfig,
        colors: &OverlayColors,
        anchor: Point,
        selected: usize,
    ) -> Result<Self, DomError> {
        let panel = doc.create_element("div", None)?;
        match Self::build(doc, panel.clone(), config, colors, anchor, selected) {
            Ok(toolbar) => Ok(toolbar),
            Err(err) => {
                doc.remove(&panel);
                Err(err)
            }
        }
    }

    fn build<D: Document<Node = N>>(
        doc: &mut D,
        panel: N,
        config: &ToolbarConfig,
        colors: &OverlayColors,
        anchor: Point,
        selected: usize,
    ) -> Result<Self, DomError> {
        let border = format!("1px solid {}", colors.accent);
        let width = px(config.width);
        doc.set_attribute(&panel, OVERLAY_ATTRIBUTE, "toolbar");
        apply_styles(
            doc,
            &panel,
            &[
                ("position", "fixed"),
                ("z-index", Z_TOOLBAR),
                ("width", width.as_str()),
                ("box-sizing", "border-box"),
                ("padding", "8px"),
                ("border", border.as_str()),
                ("border-radius", "6px"),
                ("background", "#ffffff"),
                ("box-shadow", "0 4px 16px rgba(0, 0, 0, 0.18)"),
                ("font", "13px/1.4 system-ui, sans-serif"),
            ],
        );

        let count = doc.create_element("div", Some(&panel))?;
        let input = doc.create_element("input", Some(&panel))?;
        doc.set_attribute(&input, "type", "text");
        doc.set_attribute(&input, "placeholder", "Describe the change");
        apply_styles(doc, &input, &[("width", "100%"), ("box-sizing", "border-box")]);

        let submit = doc.create_element("button", Some(&panel))?;
        doc.set_text(&submit, "Send");
        doc.set_style(&submit, "background", &colors.accent);
        let cancel = doc.create_element("button", Some(&panel))?;
        doc.set_text(&cancel, "Cancel");

        let feedback = doc.create_element("div", Some(&panel))?;
        apply_styles(doc, &feedback, &[("display", "none"), ("color", "#c0392b")]);

        let measured = doc.bounding_rect(&panel).height;
        let height = if measured > 0.0 { measured } else { config.fallback_height };
        let corner =
            placement(anchor, Size::new(config.width, height), doc.viewport().size(), config);
        doc.set_style(&panel, "left", &px(corner.x));
        doc.set_style(&panel, "top", &px(corner.y));

        for binding in [Binding::ToolbarKey, Binding::ToolbarKeyUp, Binding::ToolbarKeyPress] {
            doc.bind(ListenTarget::Node(panel.clone()), binding);
        }
        doc.bind(ListenTarget::Node(submit), Binding::ToolbarSubmit);
        doc.bind(ListenTarget::Node(cancel), Binding::ToolbarCancel);
        doc.focus(&input);

        let toolbar = Self { panel, count, input, feedback, feedback_until: None };
        toolbar.set_count(doc, selected);
        Ok(toolbar)
    }

    pub fn panel(&self) -> &N {
        &self.panel
    }

    pub fn set_count<D: Document<Node = N>>(&self, doc: &mut D, selected: usize) {
        let label = match selected {
            1 => "1 element selected".to_owned(),
            n => format!("{n} elements selected"),
        };
        doc.set_text(&self.count, &label);
    }

    pub fn query<D: Document<Node = N>>(&self, doc: &D) -> String {
        doc.input_value(&self.input)
    }

    pub fn has_feedback(&self) -> bool {
        self.feedback_until.is_some()
    }

    /// Shows `message` until `duration_ms` past the host clock.
    pub fn flash<D: Document<Node = N>>(&mut self, doc: &mut D, message: &str, duration_ms: f64) {
        doc.set_text(&self.feedback, message);
        doc.set_style(&self.feedback, "display", "");
        self.feedback_until = Some(doc.now_ms() + duration_ms);
    }

    /// Hides expired feedback. Returns whether feedback is still showing.
    pub fn expire_feedback<D: Document<Node = N>>(&mut self, doc: &mut D) -> bool {
        let Some(until) = self.feedback_until else {
            return false;
        };
        if doc.now_ms() < until {
            return true;
        }
        doc.set_text(&self.feedback, "");
        doc.set_style(&self.feedback, "display", "none");
        self.feedback_until = None;
        false
    }

    /// Removes the panel; its bindings go with it.
    pub fn close<D: Document<Node = N>>(self, doc: &mut D) {
        doc.remove(&self.panel);
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{placement, Toolbar, ToolbarKeyAction, EMPTY_SELECTION_FEEDBACK};
    use crate::config::{OverlayColors, ToolbarConfig};
    use crate::dom::{Binding, Document, KeyInput, ListenTarget, MemoryDocument, Modifiers};
    use crate::model::{Point, Rect, Size, Viewport};

    const VIEWPORT: Size = Size::new(800.0, 600.0);
    const PANEL: Size = Size::new(320.0, 104.0);

    #[rstest]
    #[case::room_below_right(Point::new(100.0, 100.0), Point::new(112.0, 112.0))]
    #[case::flips_left(Point::new(700.0, 100.0), Point::new(368.0, 112.0))]
    #[case::flips_up(Point::new(100.0, 550.0), Point::new(112.0, 434.0))]
    #[case::flips_both(Point::new(790.0, 590.0), Point::new(458.0, 474.0))]
    #[case::near_middle(Point::new(330.0, 100.0), Point::new(342.0, 112.0))]
    fn placement_stays_inside(#[case] anchor: Point, #[case] expected: Point) {
        let config = ToolbarConfig::default();
        let corner = placement(anchor, PANEL, VIEWPORT, &config);
        assert_eq!(corner, expected);
    }

    #[rstest]
    #[case(Point::new(0.0, 0.0))]
    #[case(Point::new(799.0, 599.0))]
    #[case(Point::new(400.0, 300.0))]
    #[case(Point::new(-50.0, 900.0))]
    fn placement_keeps_inset(#[case] anchor: Point) {
        let config = ToolbarConfig::default();
        let corner = placement(anchor, PANEL, VIEWPORT, &config);
        let inset = config.edge_inset;
        assert!(corner.x >= inset && corner.x + PANEL.width <= VIEWPORT.width - inset);
        assert!(corner.y >= inset && corner.y + PANEL.height <= VIEWPORT.height - inset);
    }

    #[test]
    fn tiny_viewport_pins_to_leading_inset() {
        let config = ToolbarConfig::default();
        let corner = placement(Point::new(50.0, 50.0), PANEL, Size::new(200.0, 80.0), &config);
        assert_eq!(corner, Point::new(8.0, 8.0));
    }

    #[rstest]
    #[case("Escape", Modifiers::NONE, ToolbarKeyAction::Abort)]
    #[case("Enter", Modifiers::NONE, ToolbarKeyAction::Submit)]
    #[case("Enter", Modifiers::SHIFT, ToolbarKeyAction::Contained)]
    #[case("a", Modifiers::NONE, ToolbarKeyAction::Contained)]
    #[case("Backspace", Modifiers::NONE, ToolbarKeyAction::Contained)]
    fn classifies_keys(
        #[case] key: &str,
        #[case] modifiers: Modifiers,
        #[case] expected: ToolbarKeyAction,
    ) {
        let input = KeyInput { key: key.to_owned(), modifiers };
        assert_eq!(ToolbarKeyAction::classify(&input, "Escape"), expected);
    }

    #[test]
    fn open_builds_focused_panel_inside_viewport() {
        let mut doc = MemoryDocument::new(Viewport::new(800.0, 600.0));
        let config = ToolbarConfig::default();
        let toolbar =
            Toolbar::open(&mut doc, &config, &OverlayColors::default(), Point::new(780.0, 20.0), 2)
                .unwrap();

        let rect = doc.bounding_rect(toolbar.panel());
        assert_eq!(rect, Rect::new(448.0, 32.0, 320.0, 0.0));
        for binding in [Binding::ToolbarKey, Binding::ToolbarKeyUp, Binding::ToolbarKeyPress] {
            assert!(doc.is_bound(&ListenTarget::Node(*toolbar.panel()), binding));
        }
        let focused = doc.focused().unwrap();
        assert_eq!(doc.tag_name(&focused), "input");
        assert_eq!(doc.text(doc.children(*toolbar.panel())[0]), "2 elements selected");

        doc.set_input_value(&focused, "make this blue");
        assert_eq!(toolbar.query(&doc), "make this blue");

        let panel = *toolbar.panel();
        toolbar.close(&mut doc);
        assert!(!doc.is_connected(&panel));
        assert!(doc.bindings().is_empty());
    }

    #[test]
    fn feedback_expires_on_the_host_clock() {
        let mut doc = MemoryDocument::new(Viewport::new(800.0, 600.0));
        let mut toolbar = Toolbar::open(
            &mut doc,
            &ToolbarConfig::default(),
            &OverlayColors::default(),
            Point::new(10.0, 10.0),
            0,
        )
        .unwrap();
        let line = doc.children(*toolbar.panel())[4];

        toolbar.flash(&mut doc, EMPTY_SELECTION_FEEDBACK, 2000.0);
        assert_eq!(doc.text(line), EMPTY_SELECTION_FEEDBACK);
        doc.advance_clock(1999.0);
        assert!(toolbar.expire_feedback(&mut doc));
        doc.advance_clock(1.0);
        assert!(!toolbar.expire_feedback(&mut doc));
        assert_eq!(doc.text(line), "");
        assert_eq!(doc.style(&line, "display"), "none");
    }
}
