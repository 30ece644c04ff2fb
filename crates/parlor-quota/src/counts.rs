// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-window usage counting.
//!
//! Messages are counted by their own timestamp, joined to the owning shop
//! through their conversation. Conversations are counted by creation time.

use parlor_core::ParlorError;
use parlor_storage::{Database, map_tr_err};
use rusqlite::params;

/// Conversations created by `shop` at or after `since`.
pub async fn conversations_since(
    db: &Database,
    shop: &str,
    since: &str,
) -> Result<i64, ParlorError> {
    let shop = shop.to_string();
    let since = since.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM conversations
                 WHERE shop = ?1 AND created_at >= ?2",
                params![shop, since],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}

/// Messages sent in `shop`'s conversations at or after `since`, counted by
/// the message's own timestamp.
pub async fn messages_since(
    db: &Database,
    shop: &str,
    since: &str,
) -> Result<i64, ParlorError> {
    let shop = shop.to_string();
    let since = since.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages m
                 JOIN conversations c ON c.id = m.conversation_id
                 WHERE c.shop = ?1 AND m.created_at >= ?2",
                params![shop, since],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_storage::models::{Conversation, ConversationStatus, Message, MessageRole};
    use parlor_storage::queries::{conversations, messages};

    async fn seed_conversation(db: &Database, shop: &str, session: &str, at: &str) -> String {
        let candidate = Conversation {
            id: uuid::Uuid::new_v4().to_string(),
            shop: shop.to_string(),
            session_id: session.to_string(),
            customer_email: None,
            customer_name: None,
            status: ConversationStatus::Active,
            created_at: at.to_string(),
            updated_at: at.to_string(),
        };
        conversations::find_or_create(db, &candidate).await.unwrap().0.id
    }

    async fn seed_message(db: &Database, conversation_id: &str, at: &str) {
        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            role: MessageRole::User,
            content: "hello".to_string(),
            metadata: None,
            created_at: at.to_string(),
        };
        messages::insert_message(db, &message).await.unwrap();
    }

    #[tokio::test]
    async fn conversations_before_window_are_not_counted() {
        let db = Database::open_in_memory().await.unwrap();
        seed_conversation(&db, "acme.myshopify.com", "old", "2026-02-20T00:00:00.000Z").await;
        seed_conversation(&db, "acme.myshopify.com", "new", "2026-03-02T00:00:00.000Z").await;

        let count = conversations_since(&db, "acme.myshopify.com", "2026-03-01T00:00:00.000Z")
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn messages_counted_by_their_own_timestamp() {
        let db = Database::open_in_memory().await.unwrap();
        // Conversation created in February, messages sent in March: the
        // March window counts the messages, not the conversation.
        let conversation_id =
            seed_conversation(&db, "acme.myshopify.com", "s", "2026-02-20T00:00:00.000Z").await;
        seed_message(&db, &conversation_id, "2026-02-21T00:00:00.000Z").await;
        seed_message(&db, &conversation_id, "2026-03-05T00:00:00.000Z").await;
        seed_message(&db, &conversation_id, "2026-03-06T00:00:00.000Z").await;

        let since = "2026-03-01T00:00:00.000Z";
        assert_eq!(
            messages_since(&db, "acme.myshopify.com", since).await.unwrap(),
            2
        );
        assert_eq!(
            conversations_since(&db, "acme.myshopify.com", since).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn other_tenants_do_not_leak_into_counts() {
        let db = Database::open_in_memory().await.unwrap();
        let mine =
            seed_conversation(&db, "a.myshopify.com", "s", "2026-03-02T00:00:00.000Z").await;
        let theirs =
            seed_conversation(&db, "b.myshopify.com", "s", "2026-03-02T00:00:00.000Z").await;
        seed_message(&db, &mine, "2026-03-02T01:00:00.000Z").await;
        seed_message(&db, &theirs, "2026-03-02T01:00:00.000Z").await;

        let since = "2026-03-01T00:00:00.000Z";
        assert_eq!(messages_since(&db, "a.myshopify.com", since).await.unwrap(), 1);
        assert_eq!(
            conversations_since(&db, "a.myshopify.com", since).await.unwrap(),
            1
        );
    }
}
