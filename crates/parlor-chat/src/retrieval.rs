// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Naive keyword retrieval over ingested documents.
//!
//! Pulls the shop's most recently updated documents and keeps the ones whose
//! title or content contains the query, case-insensitively. Top three win.

use parlor_core::ParlorError;
use parlor_storage::models::Document;
use parlor_storage::{Database, queries::documents};

/// How many candidate documents to scan per query.
const CANDIDATE_LIMIT: u32 = 5;

/// How many matches to hand to the responder.
const MATCH_LIMIT: usize = 3;

/// Documents relevant to `query` for `shop`.
pub async fn relevant_documents(
    db: &Database,
    shop: &str,
    query: &str,
) -> Result<Vec<Document>, ParlorError> {
    let candidates = documents::list_recent(db, shop, CANDIDATE_LIMIT).await?;
    let needle = query.to_lowercase();

    let mut matches: Vec<Document> = candidates
        .into_iter()
        .filter(|doc| {
            doc.title.to_lowercase().contains(&needle)
                || doc.content.to_lowercase().contains(&needle)
        })
        .collect();
    matches.truncate(MATCH_LIMIT);
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_storage::models::DocumentSource;

    async fn seed_document(db: &Database, source_id: &str, title: &str, at: &str) {
        let document = Document {
            id: uuid::Uuid::new_v4().to_string(),
            shop: "acme.myshopify.com".to_string(),
            source: DocumentSource::Product,
            source_id: source_id.to_string(),
            title: title.to_string(),
            content: format!("Product: {title}\nPrice: 12.00"),
            metadata: None,
            created_at: at.to_string(),
            updated_at: at.to_string(),
        };
        documents::upsert_document(db, &document).await.unwrap();
    }

    #[tokio::test]
    async fn matches_title_case_insensitively() {
        let db = Database::open_in_memory().await.unwrap();
        seed_document(&db, "p-1", "Blue Mug", "2026-03-01T00:00:00.000Z").await;
        seed_document(&db, "p-2", "Red Scarf", "2026-03-02T00:00:00.000Z").await;

        let hits = relevant_documents(&db, "acme.myshopify.com", "blue").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Blue Mug");
    }

    #[tokio::test]
    async fn matches_content_too() {
        let db = Database::open_in_memory().await.unwrap();
        seed_document(&db, "p-1", "Mug", "2026-03-01T00:00:00.000Z").await;
        let hits = relevant_documents(&db, "acme.myshopify.com", "price")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn caps_at_three_matches() {
        let db = Database::open_in_memory().await.unwrap();
        for i in 0..5 {
            seed_document(
                &db,
                &format!("p-{i}"),
                &format!("Mug {i}"),
                &format!("2026-03-0{}T00:00:00.000Z", i + 1),
            )
            .await;
        }
        let hits = relevant_documents(&db, "acme.myshopify.com", "mug").await.unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn no_documents_means_no_matches() {
        let db = Database::open_in_memory().await.unwrap();
        let hits = relevant_documents(&db, "acme.myshopify.com", "anything")
            .await
            .unwrap();
        assert!(hits.is_empty());
    }
}
