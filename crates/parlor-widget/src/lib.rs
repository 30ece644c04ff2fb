// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Widget configuration service and embed delivery.
//!
//! Resolves a shop to a fully-populated, sanitized configuration document
//! (every rendering field non-null), persists validated merchant edits as a
//! full-row upsert, and renders the self-contained storefront embed script
//! whose content hash drives client-side refresh.

pub mod document;
pub mod embed;
pub mod store;

pub use document::{ConfigDocument, ConfigInput, WidgetPosition};
pub use embed::{config_hash, render_embed_script};
