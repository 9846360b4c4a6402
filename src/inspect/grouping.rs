// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::config::AttributeNames;
use crate::dom::Document;
use crate::model::{GroupId, SelectionKey};

/// Every connected node currently carrying `group_id`, in document order.
///
/// Always a live query; list re-renders between calls must show up immediately.
pub fn members_of<D: Document>(
    doc: &D,
    attributes: &AttributeNames,
    group_id: &GroupId,
) -> Vec<D::Node> {
    doc.query_by_attribute(&attributes.group_id, group_id.as_str())
}

/// Live members for a selection key. A node key is its own singleton group, empty once the node
/// leaves the document.
pub fn members_for_key<D: Document>(
    doc: &D,
    attributes: &AttributeNames,
    key: &SelectionKey<D::Node>,
) -> Vec<D::Node> {
    match key {
        SelectionKey::Group(group_id) => members_of(doc, attributes, group_id),
        SelectionKey::Node(node) if doc.is_connected(node) => vec![node.clone()],
        SelectionKey::Node(_) => Vec::new(),
    }
}
