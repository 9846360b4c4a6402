// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Point lookup that sees through the controller's own overlays.
//!
//! The interception layer, highlight markers and toolbar all sit above the page, so a plain
//! `elementFromPoint` would return one of them. The shim hides them for the duration of a single
//! lookup and puts back the exact inline values it found, on every exit path.

use std::ops::{Deref, DerefMut};

use crate::dom::Document;
use crate::model::Point;

const POINTER_EVENTS: &str = "pointer-events";
const VISIBILITY: &str = "visibility";

/// Returns the page element under `point`, ignoring `overlays`.
///
/// A failing host lookup is logged and reported as "nothing found".
pub fn underlying_element_at<D: Document>(
    doc: &mut D,
    overlays: &[D::Node],
    point: Point,
) -> Option<D::Node> {
    let concealed = Concealed::new(doc, overlays);
    match concealed.element_from_point(point) {
        Ok(Some(node)) if overlays.contains(&node) => None,
        Ok(found) => found,
        Err(err) => {
            tracing::warn!(error = %err, x = point.x, y = point.y, "hit test failed");
            None
        }
    }
}

/// Overlays forced non-interactive and hidden until dropped.
struct Concealed<'a, D: Document> {
    doc: &'a mut D,
    saved: Vec<(D::Node, String, String)>,
}

impl<'a, D: Document> Concealed<'a, D> {
    fn new(doc: &'a mut D, overlays: &[D::Node]) -> Self {
        let mut saved = Vec::with_capacity(overlays.len());
        for node in overlays {
            let pointer_events = doc.style(node, POINTER_EVENTS);
            let visibility = doc.style(node, VISIBILITY);
            saved.push((node.clone(), pointer_events, visibility));
        }
        for (node, _, _) in &saved {
            doc.set_style(node, POINTER_EVENTS, "none");
            doc.set_style(node, VISIBILITY, "hidden");
        }
        Self { doc, saved }
    }
}

impl<D: Document> Deref for Concealed<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.doc
    }
}

impl<D: Document> DerefMut for Concealed<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.doc
    }
}

impl<D: Document> Drop for Concealed<'_, D> {
    fn drop(&mut self) {
        for (node, pointer_events, visibility) in self.saved.drain(..) {
            self.doc.set_style(&node, POINTER_EVENTS, &pointer_events);
            self.doc.set_style(&node, VISIBILITY, &visibility);
        }
    }
}
