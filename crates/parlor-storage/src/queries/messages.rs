// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message records. Append-only.

use parlor_core::ParlorError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::Message;
use crate::queries::parse_enum;

/// Append a message to its conversation.
pub async fn insert_message(db: &Database, message: &Message) -> Result<(), ParlorError> {
    let message = message.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, conversation_id, role, content, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    message.id,
                    message.conversation_id,
                    message.role.to_string(),
                    message.content,
                    message.metadata,
                    message.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All messages of a conversation, ordered by timestamp ascending.
pub async fn list_for_conversation(
    db: &Database,
    conversation_id: &str,
) -> Result<Vec<Message>, ParlorError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            // rowid breaks ties between messages stamped in the same
            // millisecond, keeping insertion order.
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, role, content, metadata, created_at
                 FROM messages WHERE conversation_id = ?1
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt.query_map(params![conversation_id], |row| {
                Ok(Message {
                    id: row.get(0)?,
                    conversation_id: row.get(1)?,
                    role: parse_enum(2, row.get::<_, String>(2)?)?,
                    content: row.get(3)?,
                    metadata: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Conversation, ConversationStatus, MessageRole};
    use crate::queries::conversations;

    async fn seeded_conversation(db: &Database) -> Conversation {
        let candidate = Conversation {
            id: uuid::Uuid::new_v4().to_string(),
            shop: "acme.myshopify.com".to_string(),
            session_id: "sess-msg".to_string(),
            customer_email: None,
            customer_name: None,
            status: ConversationStatus::Active,
            created_at: "2026-03-01T10:00:00.000Z".to_string(),
            updated_at: "2026-03-01T10:00:00.000Z".to_string(),
        };
        conversations::find_or_create(db, &candidate).await.unwrap().0
    }

    fn make_message(conversation_id: &str, role: MessageRole, at: &str) -> Message {
        Message {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            role,
            content: format!("{role} says hi"),
            metadata: None,
            created_at: at.to_string(),
        }
    }

    #[tokio::test]
    async fn messages_come_back_in_timestamp_order() {
        let db = Database::open_in_memory().await.unwrap();
        let conversation = seeded_conversation(&db).await;

        // Insert out of order; the listing must sort by timestamp.
        for at in [
            "2026-03-01T10:00:02.000Z",
            "2026-03-01T10:00:00.000Z",
            "2026-03-01T10:00:01.000Z",
        ] {
            insert_message(&db, &make_message(&conversation.id, MessageRole::User, at))
                .await
                .unwrap();
        }

        let messages = list_for_conversation(&db, &conversation.id).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].created_at, "2026-03-01T10:00:00.000Z");
        assert_eq!(messages[2].created_at, "2026-03-01T10:00:02.000Z");
    }

    #[tokio::test]
    async fn same_millisecond_messages_keep_insertion_order() {
        let db = Database::open_in_memory().await.unwrap();
        let conversation = seeded_conversation(&db).await;

        let at = "2026-03-01T10:00:00.000Z";
        let first = make_message(&conversation.id, MessageRole::User, at);
        let second = make_message(&conversation.id, MessageRole::Assistant, at);
        insert_message(&db, &first).await.unwrap();
        insert_message(&db, &second).await.unwrap();

        let messages = list_for_conversation(&db, &conversation.id).await.unwrap();
        assert_eq!(messages[0].id, first.id);
        assert_eq!(messages[1].id, second.id);
    }

    #[tokio::test]
    async fn metadata_round_trips() {
        let db = Database::open_in_memory().await.unwrap();
        let conversation = seeded_conversation(&db).await;

        let mut message = make_message(
            &conversation.id,
            MessageRole::Assistant,
            "2026-03-01T10:00:00.000Z",
        );
        message.metadata = Some(r#"{"model":"canned-v1","contextDocs":2}"#.to_string());
        insert_message(&db, &message).await.unwrap();

        let messages = list_for_conversation(&db, &conversation.id).await.unwrap();
        assert_eq!(messages[0].role, MessageRole::Assistant);
        assert_eq!(
            messages[0].metadata.as_deref(),
            Some(r#"{"model":"canned-v1","contextDocs":2}"#)
        );
    }

    #[tokio::test]
    async fn empty_conversation_lists_nothing() {
        let db = Database::open_in_memory().await.unwrap();
        let conversation = seeded_conversation(&db).await;
        let messages = list_for_conversation(&db, &conversation.id).await.unwrap();
        assert!(messages.is_empty());
    }
}
