// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::dom::Document;

/// Single pending-frame flag. A request made while one is already pending is dropped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameGuard {
    pending: bool,
}

impl FrameGuard {
    pub fn is_pending(self) -> bool {
        self.pending
    }

    /// Asks the host for a frame unless one is already on its way. Returns whether a request
    /// was issued.
    pub fn request<D: Document + ?Sized>(&mut self, doc: &mut D) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        doc.request_animation_frame();
        true
    }

    /// Marks the pending frame as delivered. Returns whether one was pending.
    pub fn fire(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}
