// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plan usage gating for the Parlor chat-widget backend.
//!
//! The gate derives current-window usage by counting tenant rows created
//! since the first instant of the current UTC calendar month and compares
//! them against the shop's plan limits. It is a pure read: counters are
//! derived, never incremented, so concurrent gate checks cannot
//! double-count. The check-then-act race between a gate check and the
//! caller's insert is an accepted soft-limit (overage bounded by the number
//! of concurrent racers).
//!
//! Gating must never be a single point of outage for the chat feature: a
//! missing plan binding or any storage failure resolves to *allow*, with the
//! failure surfaced only through logs.

pub mod counts;
pub mod gate;

pub use gate::{QuotaDecision, QuotaGate, UsageStats};
