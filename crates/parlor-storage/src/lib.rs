// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Parlor chat-widget backend.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed CRUD
//! operations for merchants, plans, conversations, messages, documents, and
//! ingestion jobs.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread: `Database` wraps a single connection, query functions accept
//! `&Database` and go through `connection().call()`. Do NOT create
//! additional write connections; this is what keeps the find-or-create
//! closures atomic and eliminates SQLITE_BUSY under concurrent requests.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::{Database, map_tr_err};
pub use models::*;
