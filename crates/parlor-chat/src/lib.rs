// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword retrieval and canned replies.
//!
//! This is deliberately not a model: replies are keyword-matched canned
//! strings, and "retrieval" is a substring filter over the shop's ingested
//! documents. Both exist so the widget has something sensible to say and so
//! the ingestion pipeline's output is exercised end to end.

pub mod responder;
pub mod retrieval;

pub use responder::{FALLBACK_REPLY, respond};
pub use retrieval::relevant_documents;
