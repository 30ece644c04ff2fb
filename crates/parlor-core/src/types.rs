// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity types shared across the Parlor crates.
//!
//! All timestamps are ISO 8601 UTC strings (see [`crate::format_timestamp`]);
//! they are stored as TEXT and compare correctly as strings. Metadata and
//! feature-list columns are JSON strings so the storage layer stays free of
//! open maps at its boundary.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Sentinel plan limit meaning "unlimited".
pub const UNLIMITED: i64 = -1;

/// A merchant (tenant) identified by its shop domain.
///
/// Created on the first authenticated install callback; never hard-deleted
/// in normal operation (uninstall only stamps `uninstalled_at`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    /// Shop domain, the tenant partition key (e.g. "acme.myshopify.com").
    pub shop: String,
    /// Delegated commerce-API access token supplied by the auth collaborator.
    pub access_token: String,
    pub installed_at: String,
    pub uninstalled_at: Option<String>,
}

/// A named subscription tier. Static reference data, seeded once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Tier key: `free`, `starter`, `professional`, or `enterprise`.
    pub name: String,
    /// Human-facing name ("Free", "Starter", ...).
    pub display_name: String,
    /// Max conversations per billing window, or [`UNLIMITED`].
    pub max_conversations: i64,
    /// Max messages per billing window, or [`UNLIMITED`].
    pub max_messages: i64,
    /// Feature labels, stored as a JSON string array.
    pub features: String,
}

impl Plan {
    /// Decode the features column.
    pub fn feature_list(&self) -> Vec<String> {
        serde_json::from_str(&self.features).unwrap_or_default()
    }
}

/// Binds a merchant to a plan for a billing period. At most one per shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopPlan {
    pub shop: String,
    pub plan_name: String,
    pub current_period_start: String,
    pub current_period_end: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Conversation lifecycle states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Closed,
    Archived,
}

/// One chat session between a storefront visitor and the widget.
///
/// Counted toward the monthly conversation quota at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub shop: String,
    /// Client-generated session key; unique per shop (find-or-create key).
    pub session_id: String,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub status: ConversationStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Who authored a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single message in a conversation. Append-only; counted toward the
/// monthly message quota by its own timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: String,
    /// Optional structured metadata (responder tag, context-document count),
    /// stored as a JSON string.
    pub metadata: Option<String>,
    pub created_at: String,
}

/// Where a retrieval document came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    Product,
    Collection,
    Page,
}

/// A normalized text record used for keyword retrieval.
///
/// Unique per `(shop, source, source_id)`; upserted by the ingestion job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub shop: String,
    pub source: DocumentSource,
    pub source_id: String,
    pub title: String,
    pub content: String,
    pub metadata: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Ingestion run states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

/// Tracks one ingestion run. All counters are initialized at creation so the
/// failure path never writes a field that does not exist yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionJob {
    pub id: String,
    pub shop: String,
    pub status: JobStatus,
    /// Records processed so far, updated after every individual record.
    pub progress: i64,
    /// Total records processed at completion (0 while running).
    pub total: i64,
    /// JSON string array of per-resource-kind error messages.
    pub errors: String,
    pub started_at: String,
    pub finished_at: Option<String>,
}

impl IngestionJob {
    /// Decode the errors column.
    pub fn error_list(&self) -> Vec<String> {
        serde_json::from_str(&self.errors).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_enums_round_trip_through_strings() {
        for status in [
            ConversationStatus::Active,
            ConversationStatus::Closed,
            ConversationStatus::Archived,
        ] {
            let s = status.to_string();
            assert_eq!(ConversationStatus::from_str(&s).unwrap(), status);
        }
        assert_eq!(ConversationStatus::Active.to_string(), "active");
        assert_eq!(MessageRole::Assistant.to_string(), "assistant");
        assert_eq!(DocumentSource::Product.to_string(), "product");
        assert_eq!(JobStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        assert!(ConversationStatus::from_str("paused").is_err());
        assert!(MessageRole::from_str("bot").is_err());
    }

    #[test]
    fn plan_feature_list_decodes() {
        let plan = Plan {
            name: "free".into(),
            display_name: "Free".into(),
            max_conversations: 100,
            max_messages: 1000,
            features: r#"["Basic AI responses","Standard support"]"#.into(),
        };
        assert_eq!(
            plan.feature_list(),
            vec!["Basic AI responses".to_string(), "Standard support".to_string()]
        );
    }

    #[test]
    fn plan_feature_list_tolerates_garbage() {
        let plan = Plan {
            name: "free".into(),
            display_name: "Free".into(),
            max_conversations: 100,
            max_messages: 1000,
            features: "not json".into(),
        };
        assert!(plan.feature_list().is_empty());
    }

    #[test]
    fn job_error_list_decodes() {
        let job = IngestionJob {
            id: "job-1".into(),
            shop: "acme.myshopify.com".into(),
            status: JobStatus::Completed,
            progress: 3,
            total: 3,
            errors: r#"["collections: upstream error"]"#.into(),
            started_at: "2026-01-01T00:00:00.000Z".into(),
            finished_at: Some("2026-01-01T00:00:05.000Z".into()),
        };
        assert_eq!(job.error_list().len(), 1);
    }
}
