// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalized retrieval documents.
//!
//! Documents are unique per `(shop, source, source_id)` and only ever change
//! by re-ingestion overwrite.

use parlor_core::ParlorError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::Document;
use crate::queries::parse_enum;

fn row_to_document(row: &rusqlite::Row<'_>) -> Result<Document, rusqlite::Error> {
    Ok(Document {
        id: row.get(0)?,
        shop: row.get(1)?,
        source: parse_enum(2, row.get::<_, String>(2)?)?,
        source_id: row.get(3)?,
        title: row.get(4)?,
        content: row.get(5)?,
        metadata: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

const SELECT_COLUMNS: &str =
    "id, shop, source, source_id, title, content, metadata, created_at, updated_at";

/// Insert a document, or overwrite the existing `(shop, source, source_id)`
/// row's title/content/metadata.
pub async fn upsert_document(db: &Database, document: &Document) -> Result<(), ParlorError> {
    let document = document.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO documents
                     (id, shop, source, source_id, title, content, metadata,
                      created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(shop, source, source_id) DO UPDATE SET
                     title = excluded.title,
                     content = excluded.content,
                     metadata = excluded.metadata,
                     updated_at = excluded.updated_at",
                params![
                    document.id,
                    document.shop,
                    document.source.to_string(),
                    document.source_id,
                    document.title,
                    document.content,
                    document.metadata,
                    document.created_at,
                    document.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// A shop's most recently updated documents, bounded by `limit`.
pub async fn list_recent(
    db: &Database,
    shop: &str,
    limit: u32,
) -> Result<Vec<Document>, ParlorError> {
    let shop = shop.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM documents
                 WHERE shop = ?1 ORDER BY updated_at DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![shop, limit], row_to_document)?;
            let mut documents = Vec::new();
            for row in rows {
                documents.push(row?);
            }
            Ok(documents)
        })
        .await
        .map_err(map_tr_err)
}

/// Number of documents stored for a shop.
pub async fn count_for_shop(db: &Database, shop: &str) -> Result<i64, ParlorError> {
    let shop = shop.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM documents WHERE shop = ?1",
                params![shop],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}
