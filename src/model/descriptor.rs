// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

/// Canonical opening tag of an element, children omitted.
///
/// Format: `<tag name="value" ...>` with a lowercase tag name, attributes in document order and
/// values escaped for `&`, `<`, `>` and `"`. Attributes without a value render as bare names.
/// The descriptor is plain text so it survives the frame boundary; it is an identification aid,
/// never a way back to the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementDescriptor(String);

impl ElementDescriptor {
    pub fn new<'a>(tag_name: &str, attributes: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut out = String::with_capacity(64);
        out.push('<');
        out.push_str(&tag_name.to_ascii_lowercase());
        for (name, value) in attributes {
            out.push(' ');
            out.push_str(name);
            if !value.is_empty() {
                out.push_str("=\"");
                escape_into(&mut out, value);
                out.push('"');
            }
        }
        out.push('>');
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ElementDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn escape_into(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
