// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parlor chat-widget backend.
//!
//! This crate provides the error taxonomy and the entity types shared by the
//! storage, quota, widget, ingestion, and gateway crates. Everything here is
//! tenant-scoped: the shop domain string is the partition key throughout.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ParlorError;
pub use types::{
    Conversation, ConversationStatus, Document, DocumentSource, IngestionJob, JobStatus,
    Merchant, Message, MessageRole, Plan, ShopPlan,
};

/// Format a UTC instant the way every persisted timestamp is stored.
pub fn format_timestamp(t: chrono::DateTime<chrono::Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Current UTC instant in the persisted timestamp format.
pub fn now_timestamp() -> String {
    format_timestamp(chrono::Utc::now())
}
