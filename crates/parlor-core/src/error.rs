// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parlor chat-widget backend.

use thiserror::Error;

/// The primary error type used across all Parlor crates.
///
/// Quota reads treat `Storage` as fail-open (allow and log); write paths
/// surface it to the caller as a structured failure. `QuotaExceeded` carries
/// the full limit context so the gateway can answer with a structured 403
/// instead of a generic error.
#[derive(Debug, Error)]
pub enum ParlorError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Bad input shape or enum value, rejected before any write.
    #[error("validation error: {0}")]
    Validation(String),

    /// An entity lookup came back empty.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A plan limit was reached; the operation performed no write.
    #[error("{reason} ({used}/{limit} on {plan})")]
    QuotaExceeded {
        reason: String,
        limit: i64,
        used: i64,
        plan: String,
    },

    /// Commerce API failure (network, non-success status, malformed body).
    #[error("upstream error: {message}")]
    Upstream {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParlorError {
    /// Wrap any error as a `Storage` variant.
    pub fn storage<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
        Self::Storage { source: Box::new(e) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_exceeded_message_carries_context() {
        let err = ParlorError::QuotaExceeded {
            reason: "Message limit reached".into(),
            limit: 1000,
            used: 1000,
            plan: "Free".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Message limit reached"));
        assert!(msg.contains("1000/1000"));
        assert!(msg.contains("Free"));
    }

    #[test]
    fn not_found_names_the_entity() {
        let err = ParlorError::NotFound {
            entity: "conversation",
            id: "conv-42".into(),
        };
        assert_eq!(err.to_string(), "conversation not found: conv-42");
    }

    #[test]
    fn storage_wraps_source() {
        let err = ParlorError::storage(std::io::Error::other("disk gone"));
        assert!(err.to_string().contains("disk gone"));
    }
}
