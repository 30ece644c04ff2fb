// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The quota gate: admit or reject conversation/message creation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parlor_core::ParlorError;
use parlor_storage::models::UNLIMITED;
use parlor_storage::queries::plans;
use parlor_storage::{Database, models::Plan};
use serde::Serialize;
use tracing::warn;

use crate::counts;

/// Injectable time source so the quota window is testable without wall-clock
/// coupling.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Result of a gate check.
///
/// `limit`/`used`/`plan` are populated only on denial, matching the
/// structured 403 body the ingest API returns.
#[derive(Debug, Clone, Serialize)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

impl QuotaDecision {
    fn allow(reason: &str) -> Self {
        Self {
            allowed: true,
            reason: reason.to_string(),
            limit: None,
            used: None,
            plan: None,
        }
    }

    fn deny(reason: &str, limit: i64, used: i64, plan: &Plan) -> Self {
        Self {
            allowed: false,
            reason: reason.to_string(),
            limit: Some(limit),
            used: Some(used),
            plan: Some(plan.display_name.clone()),
        }
    }

    /// Convert a denial into the structured error carried to the API layer.
    pub fn into_error(self) -> ParlorError {
        ParlorError::QuotaExceeded {
            reason: self.reason,
            limit: self.limit.unwrap_or_default(),
            used: self.used.unwrap_or_default(),
            plan: self.plan.unwrap_or_default(),
        }
    }
}

/// Current-window usage counters for a shop.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UsageStats {
    pub conversations: i64,
    pub messages: i64,
}

/// Admits or rejects new activity against the shop's plan limits.
///
/// Pure read; see the crate docs for the fail-open and soft-limit policy.
#[derive(Clone)]
pub struct QuotaGate {
    db: Database,
    clock: Clock,
}

impl QuotaGate {
    /// Gate against the wall clock.
    pub fn new(db: Database) -> Self {
        Self::with_clock(db, Arc::new(Utc::now))
    }

    /// Gate with an injected time source (tests, replay).
    pub fn with_clock(db: Database, clock: Clock) -> Self {
        Self { db, clock }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// First instant of the current UTC calendar month.
    fn window_start(&self) -> String {
        plans::month_bounds(self.now()).0
    }

    /// May `shop` start a new conversation right now?
    pub async fn can_create_conversation(&self, shop: &str) -> QuotaDecision {
        let plan = match plans::get_shop_plan(&self.db, shop, self.now()).await {
            Ok(Some((_, plan))) => plan,
            Ok(None) => return QuotaDecision::allow("No plan restrictions"),
            Err(e) => {
                warn!(shop, error = %e, "plan lookup failed, allowing conversation");
                return QuotaDecision::allow("Error checking limits");
            }
        };

        if plan.max_conversations == UNLIMITED {
            return QuotaDecision::allow("Unlimited plan");
        }

        let used =
            match counts::conversations_since(&self.db, shop, &self.window_start()).await {
                Ok(count) => count,
                Err(e) => {
                    warn!(shop, error = %e, "usage count failed, allowing conversation");
                    return QuotaDecision::allow("Error checking limits");
                }
            };

        if used >= plan.max_conversations {
            return QuotaDecision::deny(
                "Conversation limit reached",
                plan.max_conversations,
                used,
                &plan,
            );
        }
        QuotaDecision::allow("Within limits")
    }

    /// May `shop` send another message right now?
    pub async fn can_send_message(&self, shop: &str) -> QuotaDecision {
        let plan = match plans::get_shop_plan(&self.db, shop, self.now()).await {
            Ok(Some((_, plan))) => plan,
            Ok(None) => return QuotaDecision::allow("No plan restrictions"),
            Err(e) => {
                warn!(shop, error = %e, "plan lookup failed, allowing message");
                return QuotaDecision::allow("Error checking limits");
            }
        };

        if plan.max_messages == UNLIMITED {
            return QuotaDecision::allow("Unlimited plan");
        }

        let used = match counts::messages_since(&self.db, shop, &self.window_start()).await {
            Ok(count) => count,
            Err(e) => {
                warn!(shop, error = %e, "usage count failed, allowing message");
                return QuotaDecision::allow("Error checking limits");
            }
        };

        if used >= plan.max_messages {
            return QuotaDecision::deny("Message limit reached", plan.max_messages, used, &plan);
        }
        QuotaDecision::allow("Within limits")
    }

    /// Current-window usage for reporting. Fails open to zeros.
    pub async fn usage_stats(&self, shop: &str) -> UsageStats {
        let since = self.window_start();
        let conversations = counts::conversations_since(&self.db, shop, &since)
            .await
            .unwrap_or_else(|e| {
                warn!(shop, error = %e, "conversation usage count failed");
                0
            });
        let messages = counts::messages_since(&self.db, shop, &since)
            .await
            .unwrap_or_else(|e| {
                warn!(shop, error = %e, "message usage count failed");
                0
            });
        UsageStats {
            conversations,
            messages,
        }
    }

    /// Does the shop's plan carry `feature`? Defaults to allowing when the
    /// shop has no plan binding or the lookup fails.
    pub async fn has_feature(&self, shop: &str, feature: &str) -> bool {
        match plans::get_shop_plan(&self.db, shop, self.now()).await {
            Ok(Some((_, plan))) => plan.feature_list().iter().any(|f| f == feature),
            Ok(None) => true,
            Err(e) => {
                warn!(shop, error = %e, "feature lookup failed, allowing");
                true
            }
        }
    }

    /// The window start the gate is currently counting from (diagnostics).
    pub fn current_window_start(&self) -> String {
        self.window_start()
    }
}

impl std::fmt::Debug for QuotaGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaGate")
            .field("window_start", &self.window_start())
            .finish()
    }
}
