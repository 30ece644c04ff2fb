// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests over the full gateway stack.
//!
//! Each test builds an isolated router over a fresh in-memory database with
//! seeded plans. Tests are independent and order-insensitive.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use parlor_gateway::{AppState, ServerConfig, build_router};
use parlor_ingest::{CommerceClient, CommerceSettings};
use parlor_quota::QuotaGate;
use parlor_storage::Database;
use parlor_storage::models::{Message, MessageRole};
use parlor_storage::queries::{conversations, messages, plans};
use serde_json::{Value, json};
use tower::ServiceExt;

const SHOP: &str = "acme.myshopify.com";
const TOKEN: &str = "admin-test-token";

async fn harness() -> (Router, Database) {
    harness_with_commerce(CommerceSettings::default()).await
}

async fn harness_with_commerce(settings: CommerceSettings) -> (Router, Database) {
    let db = Database::open_in_memory().await.unwrap();
    plans::seed_default_plans(&db).await.unwrap();

    let state = AppState {
        db: db.clone(),
        quota: QuotaGate::new(db.clone()),
        commerce: CommerceClient::new(settings).unwrap(),
        public_base_url: "http://127.0.0.1:8470".to_string(),
        tenant_suffix: ".myshopify.com".to_string(),
    };
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        admin_token: Some(TOKEN.to_string()),
    };
    (build_router(&config, state), db)
}

fn public_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn provision(app: &Router) {
    let response = app
        .clone()
        .oneshot(admin_json(
            "POST",
            "/admin/merchants",
            json!({ "shop": SHOP, "accessToken": "shpat_e2e" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ---- Free-plan usage scenario ----

#[tokio::test]
async fn free_plan_conversation_and_messages_are_counted() {
    let (app, _db) = harness().await;
    provision(&app).await;

    let created = body_json(
        app.clone()
            .oneshot(public_json(
                "POST",
                &format!("/widget-config?shop={SHOP}"),
                json!({ "action": "create_conversation", "sessionId": "sess-e2e" }),
            ))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(created["success"], true);
    let conversation_id = created["conversationId"].as_str().unwrap().to_string();

    for text in ["hello", "do you ship to EU?", "thanks"] {
        let response = app
            .clone()
            .oneshot(public_json(
                "POST",
                "/widget-config",
                json!({
                    "action": "save_message",
                    "conversationId": conversation_id,
                    "role": "user",
                    "message": text,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let usage = body_json(
        app.clone()
            .oneshot(admin_get(&format!("/admin/usage?shop={SHOP}")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(usage["conversations"], 1);
    assert_eq!(usage["messages"], 3);
}

#[tokio::test]
async fn message_1001_is_rejected_citing_the_free_plan() {
    let (app, db) = harness().await;
    provision(&app).await;

    // One conversation, then fill the free plan's 1000-message window
    // directly through storage (the gate derives usage by counting rows).
    let created = body_json(
        app.clone()
            .oneshot(public_json(
                "POST",
                &format!("/widget-config?shop={SHOP}"),
                json!({ "action": "create_conversation", "sessionId": "sess-full" }),
            ))
            .await
            .unwrap(),
    )
    .await;
    let conversation_id = created["conversationId"].as_str().unwrap().to_string();

    let now = chrono::Utc::now();
    let window_ts = parlor_core::format_timestamp(now);
    for i in 0..1000 {
        messages::insert_message(
            &db,
            &Message {
                id: format!("m-{i}"),
                conversation_id: conversation_id.clone(),
                role: if i % 2 == 0 { MessageRole::User } else { MessageRole::Assistant },
                content: format!("message {i}"),
                metadata: None,
                created_at: window_ts.clone(),
            },
        )
        .await
        .unwrap();
    }

    let response = app
        .clone()
        .oneshot(public_json(
            "POST",
            "/widget-config",
            json!({
                "action": "save_message",
                "conversationId": conversation_id,
                "role": "user",
                "message": "one too many",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Message limit reached");
    assert_eq!(body["limit"], 1000);
    assert_eq!(body["used"], 1000);
    assert_eq!(body["plan"], "Free");

    // Nothing was written past the limit.
    let stored = messages::list_for_conversation(&db, &conversation_id).await.unwrap();
    assert_eq!(stored.len(), 1000);
}

#[tokio::test]
async fn unprovisioned_shop_chats_without_restrictions() {
    // No merchant, no plan binding: the gate fails open by design.
    let (app, _db) = harness().await;

    let body = body_json(
        app.oneshot(public_json(
            "POST",
            "/chat",
            json!({ "message": "hi there", "shop": "ghost.myshopify.com" }),
        ))
        .await
        .unwrap(),
    )
    .await;
    assert!(body["reply"].as_str().is_some());
    assert!(body["conversationId"].as_str().is_some());
}

// ---- Configuration propagation ----

#[tokio::test]
async fn saved_config_is_immediately_visible_and_changes_the_hash() {
    let (app, _db) = harness().await;

    let before = body_json(
        app.clone()
            .oneshot(
                Request::get(format!("/widget-config?shop={SHOP}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap(),
    )
    .await;
    let before_hash = before["configHash"].as_str().unwrap().to_string();

    let saved = app
        .clone()
        .oneshot(admin_json(
            "PUT",
            &format!("/admin/widget-config?shop={SHOP}"),
            json!({
                "isActive": true,
                "title": "Ask Acme",
                "color": "#224466",
                "greeting": "Hey! Need a hand?",
                "position": "left",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(saved.status(), StatusCode::OK);

    let after = body_json(
        app.clone()
            .oneshot(
                Request::get(format!("/widget-config?shop={SHOP}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(after["title"], "Ask Acme");
    assert_eq!(after["color"], "#224466");
    assert_eq!(after["position"], "left");
    assert_eq!(after["isActive"], true);
    assert_ne!(after["configHash"].as_str().unwrap(), before_hash);

    // The embed script now carries the saved branding.
    let embed = app
        .oneshot(
            Request::get(format!("/embed.js?shop={SHOP}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let script = String::from_utf8(
        to_bytes(embed.into_body(), usize::MAX).await.unwrap().to_vec(),
    )
    .unwrap();
    assert!(script.contains("Ask Acme"));
    assert!(script.contains("#224466"));
}

// ---- Ingestion through the admin surface ----

#[tokio::test]
async fn ingestion_flows_from_trigger_to_retrieval() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    for (resource, records) in [
        (
            "products",
            json!([{ "id": 1, "title": "Waxed Canvas Tote", "variants": [{"price": "89.00"}] }]),
        ),
        ("custom_collections", json!([])),
        ("pages", json!([{ "id": 2, "title": "Shipping FAQ" }])),
    ] {
        let mut body = serde_json::Map::new();
        body.insert(resource.to_string(), records);
        Mock::given(method("GET"))
            .and(path(format!("/admin/api/2023-10/{resource}.json")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(Value::Object(body)),
            )
            .mount(&server)
            .await;
    }

    let (app, _db) = harness_with_commerce(CommerceSettings {
        base_url_override: Some(server.uri()),
        ..CommerceSettings::default()
    })
    .await;
    provision(&app).await;

    let triggered = app
        .clone()
        .oneshot(admin_json("POST", "/admin/ingest", json!({ "shop": SHOP })))
        .await
        .unwrap();
    assert_eq!(triggered.status(), StatusCode::ACCEPTED);
    let job_id = body_json(triggered).await["jobId"].as_str().unwrap().to_string();

    // Poll the job row to a terminal state.
    let mut job = Value::Null;
    for _ in 0..100 {
        job = body_json(
            app.clone()
                .oneshot(admin_get(&format!("/admin/ingest/{job_id}")))
                .await
                .unwrap(),
        )
        .await;
        if job["status"] != "running" {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(job["status"], "completed", "job: {job}");
    assert_eq!(job["total"], 2);
    assert_eq!(job["errors"].as_array().unwrap().len(), 0);

    // The ingested documents feed chat retrieval metadata.
    let reply = body_json(
        app.oneshot(public_json(
            "POST",
            "/chat",
            json!({ "message": "tote", "shop": SHOP, "sessionId": "sess-docs" }),
        ))
        .await
        .unwrap(),
    )
    .await;
    assert!(reply["reply"].as_str().is_some());
}

#[tokio::test]
async fn widget_api_rejects_unknown_actions() {
    let (app, _db) = harness().await;
    let response = app
        .oneshot(public_json(
            "POST",
            &format!("/widget-config?shop={SHOP}"),
            json!({ "action": "drop_tables" }),
        ))
        .await
        .unwrap();
    // Unknown discriminants fail deserialization before any handler runs.
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn conversations_survive_across_surfaces() {
    let (app, db) = harness().await;
    provision(&app).await;

    // A chat turn creates the conversation; the widget API then reads it.
    let chat = body_json(
        app.clone()
            .oneshot(public_json(
                "POST",
                "/chat",
                json!({ "message": "hello", "shop": SHOP, "sessionId": "sess-x" }),
            ))
            .await
            .unwrap(),
    )
    .await;
    let conversation_id = chat["conversationId"].as_str().unwrap().to_string();

    let fetched = body_json(
        app.oneshot(public_json(
            "POST",
            "/widget-config",
            json!({ "action": "get_conversation", "conversationId": conversation_id }),
        ))
        .await
        .unwrap(),
    )
    .await;
    assert_eq!(fetched["conversation"]["sessionId"], "sess-x");
    let stored = conversations::get_by_session(&db, SHOP, "sess-x").await.unwrap();
    assert!(stored.is_some());
}
