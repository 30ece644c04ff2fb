// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merchant (tenant) records.
//!
//! A merchant row is upserted on every install callback: re-installing a
//! previously uninstalled shop refreshes the token and clears the
//! uninstall stamp. Rows are never hard-deleted.

use parlor_core::ParlorError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::Merchant;

/// Insert a merchant, or refresh its token if the shop already exists.
pub async fn upsert_merchant(db: &Database, merchant: &Merchant) -> Result<(), ParlorError> {
    let merchant = merchant.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO merchants (shop, access_token, installed_at, uninstalled_at)
                 VALUES (?1, ?2, ?3, NULL)
                 ON CONFLICT(shop) DO UPDATE SET
                     access_token = excluded.access_token,
                     uninstalled_at = NULL",
                params![merchant.shop, merchant.access_token, merchant.installed_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a merchant by shop domain.
pub async fn get_merchant(db: &Database, shop: &str) -> Result<Option<Merchant>, ParlorError> {
    let shop = shop.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT shop, access_token, installed_at, uninstalled_at
                 FROM merchants WHERE shop = ?1",
            )?;
            let result = stmt.query_row(params![shop], |row| {
                Ok(Merchant {
                    shop: row.get(0)?,
                    access_token: row.get(1)?,
                    installed_at: row.get(2)?,
                    uninstalled_at: row.get(3)?,
                })
            });
            match result {
                Ok(merchant) => Ok(Some(merchant)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Stamp a merchant as uninstalled (soft delete).
pub async fn mark_uninstalled(db: &Database, shop: &str, at: &str) -> Result<(), ParlorError> {
    let shop = shop.to_string();
    let at = at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE merchants SET uninstalled_at = ?1 WHERE shop = ?2",
                params![at, shop],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
