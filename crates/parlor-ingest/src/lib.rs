// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog ingestion for the Parlor chat-widget backend.
//!
//! Pulls products, collections, and pages from the commerce platform's admin
//! API, normalizes each record into a text document keyed by
//! `(shop, source, source_id)`, and tracks progress in an ingestion-job row.
//! The trigger returns a job id immediately; the run happens in a spawned
//! task and a failing resource kind never aborts the remaining kinds.

pub mod commerce;
pub mod job;
pub mod normalize;

pub use commerce::{CommerceClient, CommerceSettings};
pub use job::{IngestionSummary, run_ingestion, start_ingestion};
