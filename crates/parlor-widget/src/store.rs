// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence for widget configuration documents.
//!
//! One row per shop, written only as a full-row upsert. Reads never fail on
//! missing rows; they synthesize defaults instead.

use parlor_core::{ParlorError, now_timestamp};
use parlor_storage::{Database, map_tr_err};
use rusqlite::params;

use crate::document::ConfigDocument;

fn row_to_document(row: &rusqlite::Row<'_>) -> Result<ConfigDocument, rusqlite::Error> {
    let position: String = row.get(3)?;
    Ok(ConfigDocument {
        title: row.get(0)?,
        color: row.get(1)?,
        greeting: row.get(2)?,
        position: position.parse().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("invalid position `{position}`").into(),
            )
        })?,
        is_active: row.get(4)?,
        agent_name: row.get(5)?,
        agent_role: row.get(6)?,
        response_length: row.get(7)?,
        language: row.get(8)?,
        tone: row.get(9)?,
        avatar: row.get(10)?,
        start_color: row.get(11)?,
        end_color: row.get(12)?,
        chat_bg_color: row.get(13)?,
        font_family: row.get(14)?,
        font_color: row.get(15)?,
        open_by_default: row.get(16)?,
        is_pulsing: row.get(17)?,
    })
}

/// Fetch the stored document for a shop, if any.
pub async fn get_stored(
    db: &Database,
    shop: &str,
) -> Result<Option<ConfigDocument>, ParlorError> {
    let shop = shop.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT title, color, greeting, position, is_active,
                        agent_name, agent_role, response_length, language, tone, avatar,
                        start_color, end_color, chat_bg_color, font_family, font_color,
                        open_by_default, is_pulsing
                 FROM widget_configs WHERE shop = ?1",
            )?;
            let result = stmt.query_row(params![shop], row_to_document);
            match result {
                Ok(doc) => Ok(Some(doc)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// The document for a shop: stored row, or the inactive defaults (no write).
///
/// Storefront rendering never breaks for un-configured shops; the inactive
/// flag just means nothing renders.
pub async fn get_config(db: &Database, shop: &str) -> Result<ConfigDocument, ParlorError> {
    Ok(get_stored(db, shop)
        .await?
        .unwrap_or_else(ConfigDocument::inactive_default))
}

/// The document for a shop, persisting active defaults on first read (embed
/// path: a shop that embeds the script gets a live widget immediately).
pub async fn get_or_create(db: &Database, shop: &str) -> Result<ConfigDocument, ParlorError> {
    if let Some(doc) = get_stored(db, shop).await? {
        return Ok(doc);
    }
    let doc = ConfigDocument::active_default();
    save_config(db, shop, &doc).await?;
    Ok(doc)
}

/// Persist a sanitized document as a full-row upsert.
pub async fn save_config(
    db: &Database,
    shop: &str,
    doc: &ConfigDocument,
) -> Result<(), ParlorError> {
    let shop = shop.to_string();
    let doc = doc.clone();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO widget_configs
                     (shop, title, color, greeting, position, is_active,
                      agent_name, agent_role, response_length, language, tone, avatar,
                      start_color, end_color, chat_bg_color, font_family, font_color,
                      open_by_default, is_pulsing, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                         ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?20)
                 ON CONFLICT(shop) DO UPDATE SET
                     title = excluded.title,
                     color = excluded.color,
                     greeting = excluded.greeting,
                     position = excluded.position,
                     is_active = excluded.is_active,
                     agent_name = excluded.agent_name,
                     agent_role = excluded.agent_role,
                     response_length = excluded.response_length,
                     language = excluded.language,
                     tone = excluded.tone,
                     avatar = excluded.avatar,
                     start_color = excluded.start_color,
                     end_color = excluded.end_color,
                     chat_bg_color = excluded.chat_bg_color,
                     font_family = excluded.font_family,
                     font_color = excluded.font_color,
                     open_by_default = excluded.open_by_default,
                     is_pulsing = excluded.is_pulsing,
                     updated_at = excluded.updated_at",
                params![
                    shop,
                    doc.title,
                    doc.color,
                    doc.greeting,
                    doc.position.to_string(),
                    doc.is_active,
                    doc.agent_name,
                    doc.agent_role,
                    doc.response_length,
                    doc.language,
                    doc.tone,
                    doc.avatar,
                    doc.start_color,
                    doc.end_color,
                    doc.chat_bg_color,
                    doc.font_family,
                    doc.font_color,
                    doc.open_by_default,
                    doc.is_pulsing,
                    now,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
