// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use crate::config::AttributeNames;
use crate::dom::Document;
use crate::model::{GroupId, Provenance, TaggedElement};

/// Upper bound on nodes inspected per lookup: the start node plus nine ancestors.
///
/// Guards against unbounded traversal in malformed or pathological trees. It is a fixed part of
/// the lookup contract, not a tuning knob.
pub const MAX_ANCESTOR_HOPS: usize = 10;

/// Finds the nearest tagged element at or above `node`.
///
/// A node is tagged when it carries a component, file or line attribute; a group id alone does
/// not qualify. The group id is read from the same node as the descriptive fields. Malformed
/// group ids are dropped rather than rejected.
pub fn resolve<D: Document>(
    doc: &D,
    attributes: &AttributeNames,
    node: &D::Node,
) -> Option<TaggedElement<D::Node>> {
    let mut current = Some(node.clone());
    for _ in 0..MAX_ANCESTOR_HOPS {
        let candidate = current?;
        let provenance = read(doc, attributes, &candidate);
        if provenance.is_tagged() {
            return Some(TaggedElement { target: candidate, provenance });
        }
        current = doc.parent(&candidate);
    }
    None
}

/// Reads all four provenance attributes from exactly `node`.
pub fn read<D: Document>(doc: &D, attributes: &AttributeNames, node: &D::Node) -> Provenance {
    let text = |name: &str| doc.attribute(node, name).map(SmolStr::from);
    Provenance {
        component: text(&attributes.component),
        file: text(&attributes.file),
        line: text(&attributes.line),
        group_id: doc.attribute(node, &attributes.group_id).and_then(|raw| GroupId::new(raw).ok()),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{resolve, MAX_ANCESTOR_HOPS};
    use crate::config::AttributeNames;
    use crate::dom::{Document, MemoryDocument, NodeId, SourceFixture};
    use crate::model::{Rect, Viewport};

    /// A tagged root with an untagged chain of `depth` descendants below it. Returns the root
    /// and the deepest node.
    fn chain(depth: usize) -> (MemoryDocument, NodeId, NodeId) {
        let mut doc = MemoryDocument::new(Viewport::new(800.0, 600.0));
        let body = doc.body();
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let root =
            doc.append_tagged(body, "div", rect, &SourceFixture::new("Card", "a.tsx", 10, 2));
        let mut leaf = root;
        for _ in 0..depth {
            leaf = doc.append(leaf, "span", rect);
        }
        (doc, root, leaf)
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(MAX_ANCESTOR_HOPS - 1)]
    fn finds_tagged_ancestor_within_bound(#[case] depth: usize) {
        let (doc, root, leaf) = chain(depth);
        let found = resolve(&doc, &AttributeNames::default(), &leaf).expect("tagged");
        assert_eq!(found.target, root);
        assert_eq!(found.provenance.component.as_deref(), Some("Card"));
        assert_eq!(found.provenance.file.as_deref(), Some("a.tsx"));
        assert_eq!(found.provenance.line.as_deref(), Some("10"));
        assert!(found.provenance.group_id.is_some());
    }

    #[rstest]
    #[case(MAX_ANCESTOR_HOPS)]
    #[case(MAX_ANCESTOR_HOPS + 5)]
    fn gives_up_beyond_bound(#[case] depth: usize) {
        let (doc, _root, leaf) = chain(depth);
        assert!(resolve(&doc, &AttributeNames::default(), &leaf).is_none());
    }

    #[test]
    fn nearest_tagged_ancestor_wins() {
        let (mut doc, _root, leaf) = chain(3);
        let middle = doc.parent(&leaf).unwrap();
        doc.set_attribute(&middle, "data-source-line", "42");

        let found = resolve(&doc, &AttributeNames::default(), &leaf).expect("tagged");
        assert_eq!(found.target, middle);
        assert_eq!(found.provenance.line.as_deref(), Some("42"));
        assert_eq!(found.provenance.component, None);
        assert_eq!(found.provenance.group_id, None);
    }

    #[test]
    fn group_id_alone_does_not_tag() {
        let mut doc = MemoryDocument::new(Viewport::new(800.0, 600.0));
        let body = doc.body();
        let node = doc.append(body, "div", Rect::new(0.0, 0.0, 10.0, 10.0));
        doc.set_attribute(&node, "data-raccoon-id", "abc");
        assert!(resolve(&doc, &AttributeNames::default(), &node).is_none());
    }

    #[test]
    fn malformed_group_id_is_dropped() {
        let mut doc = MemoryDocument::new(Viewport::new(800.0, 600.0));
        let body = doc.body();
        let node = doc.append(body, "div", Rect::new(0.0, 0.0, 10.0, 10.0));
        doc.set_attribute(&node, "data-source-file", "a.tsx");
        doc.set_attribute(&node, "data-raccoon-id", "");

        let found = resolve(&doc, &AttributeNames::default(), &node).expect("tagged");
        assert_eq!(found.provenance.group_id, None);
        assert_eq!(found.provenance.component_label(), "unknown");
    }
}
