// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Optional screenshot enrichment for submitted selections.
//!
//! Capturing spans several event turns, so it runs detached. By the time a [`CaptureTask`]
//! resolves the controller has already reset; the task owns its own copy of the selection and
//! of the channel handle and reports through them, whatever the controller is doing by then.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::channel::{FrameChannel, Outbound, SelectionMessage, Transport};
use crate::dom::Document;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Screenshot {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The element has nothing to draw (zero-sized or detached).
    NothingToCapture,
    /// The capture backend failed; the message is reported verbatim.
    Backend(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToCapture => f.write_str("element has no visible box"),
            Self::Backend(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for CaptureError {}

pub type CaptureFuture = Pin<Box<dyn Future<Output = Result<Screenshot, CaptureError>>>>;

/// Screenshot capability.
///
/// Implementations read whatever they need from `doc` before returning; the future must not
/// borrow the document.
pub trait Capture<D: Document> {
    fn capture(&self, doc: &D, target: &D::Node) -> CaptureFuture;
}

/// Draws the element's bounding box and opening tag as an SVG placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineCapture;

impl<D: Document> Capture<D> for OutlineCapture {
    fn capture(&self, doc: &D, target: &D::Node) -> CaptureFuture {
        let result = if doc.is_connected(target) {
            outline_svg(doc.bounding_rect(target).size(), &doc.tag_name(target))
        } else {
            Err(CaptureError::NothingToCapture)
        };
        Box::pin(std::future::ready(result))
    }
}

fn outline_svg(size: crate::model::Size, tag: &str) -> Result<Screenshot, CaptureError> {
    if size.is_empty() {
        return Err(CaptureError::NothingToCapture);
    }
    let svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\">\
         <rect x=\"1\" y=\"1\" width=\"{iw}\" height=\"{ih}\" fill=\"none\" stroke=\"#4d5fef\"/>\
         <text x=\"4\" y=\"14\" font-size=\"12\">{tag}</text></svg>",
        w = size.width,
        h = size.height,
        iw = (size.width - 2.0).max(0.0),
        ih = (size.height - 2.0).max(0.0),
    );
    Ok(Screenshot { mime: "image/svg+xml".to_owned(), bytes: svg.into_bytes() })
}

/// A submitted selection waiting on its screenshots.
///
/// `pending[i]` belongs to `message.elements[i]`.
pub struct CaptureTask<T> {
    message: SelectionMessage,
    pending: Vec<CaptureFuture>,
    channel: FrameChannel<T>,
}

impl<T> fmt::Debug for CaptureTask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureTask")
            .field("message", &self.message)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> CaptureTask<T> {
    pub(crate) fn new(
        message: SelectionMessage,
        pending: Vec<CaptureFuture>,
        channel: FrameChannel<T>,
    ) -> Self {
        Self { message, pending, channel }
    }

    pub fn message(&self) -> &SelectionMessage {
        &self.message
    }

    /// Awaits every capture, then posts the enriched selection. Returns whether the post went
    /// through.
    pub async fn run(self) -> bool {
        let Self { mut message, pending, channel } = self;
        for (entry, capture) in message.elements.iter_mut().zip(pending) {
            match capture.await {
                Ok(shot) => entry.screenshot = Some(shot.data_url()),
                Err(err) => {
                    tracing::debug!(error = %err, file = %entry.file, "screenshot capture failed");
                    entry.error = Some(err.to_string());
                }
            }
        }
        channel.send(&Outbound::Selected(message))
    }
}
