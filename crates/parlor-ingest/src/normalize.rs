// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record-to-document normalization.
//!
//! Each commerce record flattens to a titled text block plus a small
//! metadata object, keyed by `(shop, source, source_id)` for upsert.

use parlor_core::format_timestamp;
use parlor_storage::models::{Document, DocumentSource};
use serde_json::{Value, json};

fn text(record: &Value, key: &str) -> String {
    record.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Normalize one record. Returns `None` for records without an id (nothing
/// stable to key the upsert on).
pub fn document_from_record(
    shop: &str,
    source: DocumentSource,
    record: &Value,
    now: chrono::DateTime<chrono::Utc>,
) -> Option<Document> {
    let source_id = match record.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => return None,
    };

    let title = text(record, "title");
    let handle = text(record, "handle");
    let body = text(record, "body_html");

    let (content, metadata) = match source {
        DocumentSource::Product => {
            let price = record
                .pointer("/variants/0/price")
                .and_then(Value::as_str)
                .unwrap_or("N/A");
            let vendor = text(record, "vendor");
            let tags = text(record, "tags");
            (
                format!(
                    "Product: {title}\nDescription: {body}\nPrice: {price}\n\
                     Vendor: {vendor}\nTags: {tags}\nHandle: {handle}"
                ),
                json!({ "price": price, "vendor": vendor, "tags": tags, "handle": handle }),
            )
        }
        DocumentSource::Collection => (
            format!("Collection: {title}\nDescription: {body}\nHandle: {handle}"),
            json!({ "handle": handle }),
        ),
        DocumentSource::Page => (
            format!("Page: {title}\nContent: {body}\nHandle: {handle}"),
            json!({ "handle": handle }),
        ),
    };

    let now_ts = format_timestamp(now);
    Some(Document {
        id: uuid::Uuid::new_v4().to_string(),
        shop: shop.to_string(),
        source,
        source_id,
        title,
        content,
        metadata: Some(metadata.to_string()),
        created_at: now_ts.clone(),
        updated_at: now_ts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::parse_from_rfc3339("2026-03-01T00:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc)
    }

    #[test]
    fn product_record_flattens_with_price_and_vendor() {
        let record = serde_json::json!({
            "id": 42,
            "title": "Blue Mug",
            "body_html": "A mug.",
            "vendor": "Acme",
            "tags": "kitchen, ceramic",
            "handle": "blue-mug",
            "variants": [{"price": "12.00"}]
        });
        let doc =
            document_from_record("acme.myshopify.com", DocumentSource::Product, &record, now())
                .unwrap();
        assert_eq!(doc.source_id, "42");
        assert_eq!(doc.title, "Blue Mug");
        assert!(doc.content.contains("Product: Blue Mug"));
        assert!(doc.content.contains("Price: 12.00"));
        assert!(doc.content.contains("Vendor: Acme"));
        let metadata: serde_json::Value =
            serde_json::from_str(doc.metadata.as_deref().unwrap()).unwrap();
        assert_eq!(metadata["handle"], "blue-mug");
    }

    #[test]
    fn product_without_variants_prices_as_na() {
        let record = serde_json::json!({ "id": 7, "title": "Gift Card" });
        let doc =
            document_from_record("acme.myshopify.com", DocumentSource::Product, &record, now())
                .unwrap();
        assert!(doc.content.contains("Price: N/A"));
    }

    #[test]
    fn collection_and_page_use_their_own_shapes() {
        let record = serde_json::json!({
            "id": "9",
            "title": "Spring",
            "body_html": "Fresh picks",
            "handle": "spring"
        });
        let collection = document_from_record(
            "acme.myshopify.com",
            DocumentSource::Collection,
            &record,
            now(),
        )
        .unwrap();
        assert!(collection.content.starts_with("Collection: Spring"));

        let page =
            document_from_record("acme.myshopify.com", DocumentSource::Page, &record, now())
                .unwrap();
        assert!(page.content.starts_with("Page: Spring"));
        assert!(page.content.contains("Content: Fresh picks"));
    }

    #[test]
    fn record_without_id_is_skipped() {
        let record = serde_json::json!({ "title": "No id" });
        assert!(
            document_from_record("acme.myshopify.com", DocumentSource::Page, &record, now())
                .is_none()
        );
    }
}
