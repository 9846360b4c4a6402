// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Raccoon Inspect: an embedded source selector.
//!
//! Pages built with the Raccoon Inspect annotator carry their JSX source location on every
//! rendered element. Once the containing frame activates it, the [`controller::Controller`]
//! lets the user hover and pick elements (grouped by the source location that rendered them),
//! collects a free-text query in a small toolbar and posts the selection back to the parent
//! frame.
//!
//! The controller runs against the [`dom::Document`] trait. [`dom::MemoryDocument`] backs tests
//! and the `raccoon-inspect` replay binary; the `web` feature adds a `web-sys` implementation.

pub mod capture;
pub mod channel;
pub mod config;
pub mod controller;
pub mod dom;
pub mod inspect;
pub mod model;
pub mod overlay;
pub mod replay;
#[cfg(feature = "web")]
pub mod web;
