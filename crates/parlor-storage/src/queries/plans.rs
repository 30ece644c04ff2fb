// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plan reference data and per-shop plan bindings.
//!
//! Plans are static reference data seeded once with `INSERT OR IGNORE`
//! (administrative reseed only). Each shop has at most one `shop_plans` row;
//! its billing period is the current UTC calendar month and rolls forward
//! when read past its end.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use parlor_core::{ParlorError, format_timestamp};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{Plan, ShopPlan, UNLIMITED};

/// The built-in subscription tiers.
fn default_plans() -> Vec<Plan> {
    vec![
        Plan {
            name: "free".into(),
            display_name: "Free".into(),
            max_conversations: 100,
            max_messages: 1000,
            features: r#"["Basic AI responses","Standard support"]"#.into(),
        },
        Plan {
            name: "starter".into(),
            display_name: "Starter".into(),
            max_conversations: 500,
            max_messages: 5000,
            features: r#"["Custom AI personality","Email support","Basic analytics"]"#.into(),
        },
        Plan {
            name: "professional".into(),
            display_name: "Professional".into(),
            max_conversations: 2000,
            max_messages: 20000,
            features: r#"["Advanced AI training","Priority support","Advanced analytics","Custom integrations"]"#.into(),
        },
        Plan {
            name: "enterprise".into(),
            display_name: "Enterprise".into(),
            max_conversations: UNLIMITED,
            max_messages: UNLIMITED,
            features: r#"["Custom AI models","Dedicated support","White-label options","API access"]"#.into(),
        },
    ]
}

/// Seed the plan table. Existing rows win (`INSERT OR IGNORE`).
pub async fn seed_default_plans(db: &Database) -> Result<(), ParlorError> {
    db.connection()
        .call(move |conn| {
            for plan in default_plans() {
                conn.execute(
                    "INSERT OR IGNORE INTO plans
                         (name, display_name, max_conversations, max_messages, features)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        plan.name,
                        plan.display_name,
                        plan.max_conversations,
                        plan.max_messages,
                        plan.features,
                    ],
                )?;
            }
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a plan by tier name.
pub async fn get_plan(db: &Database, name: &str) -> Result<Option<Plan>, ParlorError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT name, display_name, max_conversations, max_messages, features
                 FROM plans WHERE name = ?1",
            )?;
            let result = stmt.query_row(params![name], |row| {
                Ok(Plan {
                    name: row.get(0)?,
                    display_name: row.get(1)?,
                    max_conversations: row.get(2)?,
                    max_messages: row.get(3)?,
                    features: row.get(4)?,
                })
            });
            match result {
                Ok(plan) => Ok(Some(plan)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// UTC calendar-month bounds containing `now`: `[first instant, next first)`.
pub fn month_bounds(now: DateTime<Utc>) -> (String, String) {
    let start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    let (next_year, next_month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    (format_timestamp(start), format_timestamp(end))
}

/// Bind a shop to a plan, replacing any existing binding and resetting the
/// billing period to the current month.
pub async fn assign_plan(
    db: &Database,
    shop: &str,
    plan_name: &str,
    now: DateTime<Utc>,
) -> Result<(), ParlorError> {
    let shop = shop.to_string();
    let plan_name = plan_name.to_string();
    let (period_start, period_end) = month_bounds(now);
    let now_ts = format_timestamp(now);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO shop_plans
                     (shop, plan_name, current_period_start, current_period_end,
                      created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(shop) DO UPDATE SET
                     plan_name = excluded.plan_name,
                     current_period_start = excluded.current_period_start,
                     current_period_end = excluded.current_period_end,
                     updated_at = excluded.updated_at",
                params![shop, plan_name, period_start, period_end, now_ts],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Bind a shop to the free plan only if it has no binding yet (install hook).
pub async fn ensure_free_plan(
    db: &Database,
    shop: &str,
    now: DateTime<Utc>,
) -> Result<(), ParlorError> {
    let shop = shop.to_string();
    let (period_start, period_end) = month_bounds(now);
    let now_ts = format_timestamp(now);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO shop_plans
                     (shop, plan_name, current_period_start, current_period_end,
                      created_at, updated_at)
                 VALUES (?1, 'free', ?2, ?3, ?4, ?4)",
                params![shop, period_start, period_end, now_ts],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a shop's plan binding joined with its plan, rolling the billing
/// period forward if `now` is past the stored period end.
pub async fn get_shop_plan(
    db: &Database,
    shop: &str,
    now: DateTime<Utc>,
) -> Result<Option<(ShopPlan, Plan)>, ParlorError> {
    let shop = shop.to_string();
    let (period_start, period_end) = month_bounds(now);
    let now_ts = format_timestamp(now);
    db.connection()
        .call(move |conn| {
            // Roll the period forward before reading; the rollover is cheap
            // and keeps the stored window informational rather than stale.
            conn.execute(
                "UPDATE shop_plans
                 SET current_period_start = ?1,
                     current_period_end = ?2,
                     updated_at = ?3
                 WHERE shop = ?4 AND current_period_end <= ?3",
                params![period_start, period_end, now_ts, shop],
            )?;

            let mut stmt = conn.prepare(
                "SELECT sp.shop, sp.plan_name, sp.current_period_start,
                        sp.current_period_end, sp.created_at, sp.updated_at,
                        p.name, p.display_name, p.max_conversations,
                        p.max_messages, p.features
                 FROM shop_plans sp JOIN plans p ON p.name = sp.plan_name
                 WHERE sp.shop = ?1",
            )?;
            let result = stmt.query_row(params![shop], |row| {
                Ok((
                    ShopPlan {
                        shop: row.get(0)?,
                        plan_name: row.get(1)?,
                        current_period_start: row.get(2)?,
                        current_period_end: row.get(3)?,
                        created_at: row.get(4)?,
                        updated_at: row.get(5)?,
                    },
                    Plan {
                        name: row.get(6)?,
                        display_name: row.get(7)?,
                        max_conversations: row.get(8)?,
                        max_messages: row.get(9)?,
                        features: row.get(10)?,
                    },
                ))
            });
            match result {
                Ok(pair) => Ok(Some(pair)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[tokio::test]
    async fn seed_creates_four_tiers() {
        let db = Database::open_in_memory().await.unwrap();
        seed_default_plans(&db).await.unwrap();

        let free = get_plan(&db, "free").await.unwrap().unwrap();
        assert_eq!(free.display_name, "Free");
        assert_eq!(free.max_conversations, 100);
        assert_eq!(free.max_messages, 1000);

        let enterprise = get_plan(&db, "enterprise").await.unwrap().unwrap();
        assert_eq!(enterprise.max_conversations, UNLIMITED);
        assert_eq!(enterprise.max_messages, UNLIMITED);
        assert!(
            enterprise
                .feature_list()
                .iter()
                .any(|f| f.contains("White-label"))
        );
    }

    #[tokio::test]
    async fn reseed_does_not_clobber_existing_rows() {
        let db = Database::open_in_memory().await.unwrap();
        seed_default_plans(&db).await.unwrap();
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "UPDATE plans SET max_conversations = 7 WHERE name = 'free'",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        seed_default_plans(&db).await.unwrap();
        let free = get_plan(&db, "free").await.unwrap().unwrap();
        assert_eq!(free.max_conversations, 7);
    }

    #[test]
    fn month_bounds_cover_calendar_month() {
        let (start, end) = month_bounds(at("2026-03-15T09:30:00Z"));
        assert_eq!(start, "2026-03-01T00:00:00.000Z");
        assert_eq!(end, "2026-04-01T00:00:00.000Z");
    }

    #[test]
    fn month_bounds_wrap_december() {
        let (start, end) = month_bounds(at("2026-12-31T23:59:59Z"));
        assert_eq!(start, "2026-12-01T00:00:00.000Z");
        assert_eq!(end, "2027-01-01T00:00:00.000Z");
    }

    #[tokio::test]
    async fn ensure_free_plan_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        seed_default_plans(&db).await.unwrap();
        let now = at("2026-03-15T00:00:00Z");

        ensure_free_plan(&db, "acme.myshopify.com", now).await.unwrap();
        assign_plan(&db, "acme.myshopify.com", "starter", now).await.unwrap();
        // A second install callback must not downgrade the shop.
        ensure_free_plan(&db, "acme.myshopify.com", now).await.unwrap();

        let (shop_plan, plan) = get_shop_plan(&db, "acme.myshopify.com", now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(shop_plan.plan_name, "starter");
        assert_eq!(plan.display_name, "Starter");
    }

    #[tokio::test]
    async fn period_rolls_over_when_read_in_a_new_month() {
        let db = Database::open_in_memory().await.unwrap();
        seed_default_plans(&db).await.unwrap();
        let march = at("2026-03-15T00:00:00Z");
        ensure_free_plan(&db, "acme.myshopify.com", march).await.unwrap();

        let april = at("2026-04-02T00:00:00Z");
        let (shop_plan, _) = get_shop_plan(&db, "acme.myshopify.com", april)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(shop_plan.current_period_start, "2026-04-01T00:00:00.000Z");
        assert_eq!(shop_plan.current_period_end, "2026-05-01T00:00:00.000Z");
    }

    #[tokio::test]
    async fn missing_binding_returns_none() {
        let db = Database::open_in_memory().await.unwrap();
        seed_default_plans(&db).await.unwrap();
        let got = get_shop_plan(&db, "ghost.myshopify.com", at("2026-03-15T00:00:00Z"))
            .await
            .unwrap();
        assert!(got.is_none());
    }
}
