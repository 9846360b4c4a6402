// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Cross-frame message channel.
//!
//! Delivery is best effort: a failed post is logged and dropped, never retried, and never
//! surfaces as a controller error.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

pub mod messages;

pub use messages::{protocol_schema, ElementEntry, Inbound, Outbound, SelectionMessage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The message could not be turned into JSON.
    Encode(String),
    /// The host refused the post (no parent frame, cross-origin restriction, ...).
    Delivery(String),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(msg) => write!(f, "failed to encode message: {msg}"),
            Self::Delivery(msg) => write!(f, "failed to deliver message: {msg}"),
        }
    }
}

impl std::error::Error for ChannelError {}

/// Posts JSON to the containing frame.
///
/// Handles are cloned into detached capture tasks, so a transport must stay usable after the
/// controller that created it has moved on.
pub trait Transport: Clone {
    fn post(&self, message: &serde_json::Value) -> Result<(), ChannelError>;
}

#[derive(Debug, Clone)]
pub struct FrameChannel<T> {
    transport: T,
}

impl<T: Transport> FrameChannel<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `message`, logging instead of failing. Returns whether the post went through.
    pub fn send(&self, message: &Outbound) -> bool {
        match self.try_send(message) {
            Ok(()) => {
                tracing::debug!(kind = message.type_name(), "posted frame message");
                true
            }
            Err(err) => {
                tracing::warn!(kind = message.type_name(), error = %err, "frame message dropped");
                false
            }
        }
    }

    fn try_send(&self, message: &Outbound) -> Result<(), ChannelError> {
        let value =
            serde_json::to_value(message).map_err(|err| ChannelError::Encode(err.to_string()))?;
        self.transport.post(&value)
    }
}

#[derive(Debug, Default)]
struct Outbox {
    sent: Vec<serde_json::Value>,
    failing: bool,
}

/// In-process transport that records every post. Clones share the same outbox.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    outbox: Arc<Mutex<Outbox>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every post fails with [`ChannelError::Delivery`].
    pub fn set_failing(&self, failing: bool) {
        self.with_outbox(|outbox| outbox.failing = failing);
    }

    pub fn sent(&self) -> Vec<serde_json::Value> {
        self.with_outbox(|outbox| outbox.sent.clone())
    }

    pub fn take(&self) -> Vec<serde_json::Value> {
        self.with_outbox(|outbox| std::mem::take(&mut outbox.sent))
    }

    /// The `type` of every recorded message, in order.
    pub fn sent_types(&self) -> Vec<String> {
        self.with_outbox(|outbox| {
            outbox
                .sent
                .iter()
                .filter_map(|message| message.get("type")?.as_str().map(str::to_owned))
                .collect()
        })
    }

    fn with_outbox<R>(&self, f: impl FnOnce(&mut Outbox) -> R) -> R {
        let mut outbox = self.outbox.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut outbox)
    }
}

impl Transport for MemoryTransport {
    fn post(&self, message: &serde_json::Value) -> Result<(), ChannelError> {
        self.with_outbox(|outbox| {
            if outbox.failing {
                return Err(ChannelError::Delivery("transport is failing".to_owned()));
            }
            outbox.sent.push(message.clone());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameChannel, MemoryTransport, Outbound};

    #[test]
    fn failed_posts_are_dropped_not_retried() {
        let transport = MemoryTransport::new();
        let channel = FrameChannel::new(transport.clone());

        transport.set_failing(true);
        assert!(!channel.send(&Outbound::Ready));
        transport.set_failing(false);
        assert!(channel.send(&Outbound::Cancelled));

        assert_eq!(transport.sent_types(), vec!["SOURCE_SELECTION_CANCELLED"]);
    }

    #[test]
    fn clones_share_one_outbox() {
        let transport = MemoryTransport::new();
        let channel = FrameChannel::new(transport.clone());
        let detached = channel.clone();

        channel.send(&Outbound::Ready);
        detached.send(&Outbound::Ready);
        assert_eq!(transport.take().len(), 2);
        assert!(transport.sent().is_empty());
    }
}
