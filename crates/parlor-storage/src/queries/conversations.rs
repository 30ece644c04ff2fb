// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation records.
//!
//! Conversations are deduplicated per shop by session id: the ingest API
//! finds-or-creates inside a single writer-thread closure, so two racing
//! requests for the same session cannot both insert.

use parlor_core::ParlorError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{Conversation, ConversationStatus};
use crate::queries::parse_enum;

fn row_to_conversation(row: &rusqlite::Row<'_>) -> Result<Conversation, rusqlite::Error> {
    Ok(Conversation {
        id: row.get(0)?,
        shop: row.get(1)?,
        session_id: row.get(2)?,
        customer_email: row.get(3)?,
        customer_name: row.get(4)?,
        status: parse_enum(5, row.get::<_, String>(5)?)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

const SELECT_COLUMNS: &str = "id, shop, session_id, customer_email, customer_name, \
                              status, created_at, updated_at";

/// Get a conversation by id.
pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, ParlorError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM conversations WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_conversation);
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Get a conversation by its find-or-create key.
pub async fn get_by_session(
    db: &Database,
    shop: &str,
    session_id: &str,
) -> Result<Option<Conversation>, ParlorError> {
    let shop = shop.to_string();
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM conversations
                 WHERE shop = ?1 AND session_id = ?2"
            ))?;
            let result = stmt.query_row(params![shop, session_id], row_to_conversation);
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Find the conversation for `(shop, session_id)` or insert `candidate`.
///
/// Select and insert run in one closure on the single writer thread, so the
/// operation is atomic with respect to other callers. Returns the surviving
/// row and whether this call created it.
pub async fn find_or_create(
    db: &Database,
    candidate: &Conversation,
) -> Result<(Conversation, bool), ParlorError> {
    let candidate = candidate.clone();
    db.connection()
        .call(move |conn| {
            let existing = {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM conversations
                     WHERE shop = ?1 AND session_id = ?2"
                ))?;
                match stmt.query_row(
                    params![candidate.shop, candidate.session_id],
                    row_to_conversation,
                ) {
                    Ok(conversation) => Some(conversation),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e),
                }
            };

            if let Some(conversation) = existing {
                return Ok((conversation, false));
            }

            conn.execute(
                "INSERT INTO conversations
                     (id, shop, session_id, customer_email, customer_name,
                      status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    candidate.id,
                    candidate.shop,
                    candidate.session_id,
                    candidate.customer_email,
                    candidate.customer_name,
                    candidate.status.to_string(),
                    candidate.created_at,
                    candidate.updated_at,
                ],
            )?;
            Ok((candidate, true))
        })
        .await
        .map_err(map_tr_err)
}

/// Change a conversation's status (admin action).
pub async fn update_status(
    db: &Database,
    id: &str,
    status: ConversationStatus,
    at: &str,
) -> Result<(), ParlorError> {
    let id = id.to_string();
    let status = status.to_string();
    let at = at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status, at, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a conversation and (via cascade) its messages (admin action).
pub async fn delete_conversation(db: &Database, id: &str) -> Result<(), ParlorError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// List a shop's conversations, newest first (admin history view).
pub async fn list_by_shop(db: &Database, shop: &str) -> Result<Vec<Conversation>, ParlorError> {
    let shop = shop.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM conversations
                 WHERE shop = ?1 ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map(params![shop], row_to_conversation)?;
            let mut conversations = Vec::new();
            for row in rows {
                conversations.push(row?);
            }
            Ok(conversations)
        })
        .await
        .map_err(map_tr_err)
}
