// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Parlor chat-widget backend.
//!
//! Serves the storefront surface (widget configuration, the multiplexed
//! conversation API, chat, the embed script) with permissive CORS and
//! no-store caching, and the bearer-token-guarded admin surface (config
//! save, merchant provisioning, ingestion trigger/poll, usage). Merchant
//! identity on the admin surface is supplied by the external auth
//! collaborator; this crate only checks the service credential.

pub mod admin;
pub mod auth;
pub mod handlers;
pub mod server;
pub mod shop;

pub use server::{AppState, ServerConfig, build_router, start_server};
