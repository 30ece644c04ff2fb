// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storefront-facing request handlers.
//!
//! Every response that carries configuration is served with no-store
//! semantics: merchants expect a save to show up on the next storefront
//! load, and a cached stale config silently breaks their branding.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use parlor_chat::{relevant_documents, respond};
use parlor_core::{ParlorError, now_timestamp};
use parlor_quota::QuotaDecision;
use parlor_storage::models::{Conversation, ConversationStatus, Message, MessageRole};
use parlor_storage::queries::{conversations, messages};
use parlor_widget::{ConfigDocument, config_hash, render_embed_script, store};

use crate::server::AppState;
use crate::shop::resolve_shop;

/// Generic apology the widget renders instead of internal error text.
const APOLOGY_REPLY: &str = "I'm sorry, I'm having trouble processing your request \
    right now. Please try again later.";

/// `?shop=<domain>` for the storefront routes.
#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    #[serde(default)]
    pub shop: Option<String>,
}

/// The multiplexed widget API body, discriminated by `action`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WidgetAction {
    #[serde(rename_all = "camelCase")]
    CreateConversation {
        session_id: Option<String>,
        #[serde(default)]
        customer_email: Option<String>,
        #[serde(default)]
        customer_name: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    SaveMessage {
        conversation_id: Option<String>,
        role: Option<MessageRole>,
        message: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    GetConversation { conversation_id: Option<String> },
}

/// `POST /chat` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: Option<String>,
    pub shop: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
}

/// `GET /health` body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

fn no_store() -> [(header::HeaderName, &'static str); 3] {
    [
        (
            header::CACHE_CONTROL,
            "no-cache, no-store, must-revalidate, max-age=0",
        ),
        (header::PRAGMA, "no-cache"),
        (header::EXPIRES, "0"),
    ]
}

fn missing_shop() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Missing shop parameter" })),
    )
        .into_response()
}

fn missing_fields() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Missing required fields" })),
    )
        .into_response()
}

/// The structured 403 for a quota denial: reason plus the full limit context.
fn quota_rejection(decision: &QuotaDecision) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "success": false,
            "error": decision.reason,
            "limit": decision.limit,
            "used": decision.used,
            "plan": decision.plan,
        })),
    )
        .into_response()
}

fn storage_failure(context: &str, e: &ParlorError) -> Response {
    tracing::error!(context, error = %e, "storefront request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": "Unexpected error" })),
    )
        .into_response()
}

/// Serialize a config document plus its content hash (the client's change
/// detection token).
fn config_with_hash(doc: &ConfigDocument) -> serde_json::Value {
    let mut value = serde_json::to_value(doc).unwrap_or_else(|_| json!({}));
    if let Some(object) = value.as_object_mut() {
        object.insert("configHash".to_string(), json!(config_hash(doc)));
    }
    value
}

/// GET /health
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /widget-config
///
/// 200 always for resolvable shops: missing rows and even storage failures
/// serve the inactive defaults so storefront rendering never breaks.
pub async fn get_widget_config(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(shop) = resolve_shop(query.shop.as_deref(), &headers, &state.tenant_suffix)
    else {
        return missing_shop();
    };

    let doc = match store::get_config(&state.db, &shop).await {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(shop, error = %e, "config read failed, serving defaults");
            ConfigDocument::inactive_default()
        }
    };

    (no_store(), Json(config_with_hash(&doc))).into_response()
}

/// POST /widget-config
///
/// Action-discriminated conversation surface used by the embedded widget.
pub async fn post_widget_api(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
    headers: HeaderMap,
    Json(body): Json<WidgetAction>,
) -> Response {
    match body {
        WidgetAction::CreateConversation {
            session_id,
            customer_email,
            customer_name,
        } => {
            let Some(shop) =
                resolve_shop(query.shop.as_deref(), &headers, &state.tenant_suffix)
            else {
                return missing_shop();
            };
            let Some(session_id) = session_id.filter(|s| !s.trim().is_empty()) else {
                return missing_fields();
            };
            create_conversation(&state, &shop, &session_id, customer_email, customer_name)
                .await
        }
        WidgetAction::SaveMessage {
            conversation_id,
            role,
            message,
        } => {
            let (Some(conversation_id), Some(role), Some(message)) =
                (conversation_id, role, message.filter(|m| !m.is_empty()))
            else {
                return missing_fields();
            };
            save_message(&state, &conversation_id, role, &message).await
        }
        WidgetAction::GetConversation { conversation_id } => {
            let Some(conversation_id) = conversation_id else {
                return missing_fields();
            };
            get_conversation(&state, &conversation_id).await
        }
    }
}

async fn create_conversation(
    state: &AppState,
    shop: &str,
    session_id: &str,
    customer_email: Option<String>,
    customer_name: Option<String>,
) -> Response {
    // Find-or-create: an existing session reuses its conversation and
    // consumes no quota.
    match conversations::get_by_session(&state.db, shop, session_id).await {
        Ok(Some(existing)) => {
            return (
                StatusCode::OK,
                Json(json!({ "success": true, "conversationId": existing.id })),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => return storage_failure("create_conversation", &e),
    }

    let decision = state.quota.can_create_conversation(shop).await;
    if !decision.allowed {
        tracing::info!(shop, reason = %decision.reason, "conversation creation blocked");
        return quota_rejection(&decision);
    }

    let now = now_timestamp();
    let candidate = Conversation {
        id: uuid::Uuid::new_v4().to_string(),
        shop: shop.to_string(),
        session_id: session_id.to_string(),
        customer_email,
        customer_name,
        status: ConversationStatus::Active,
        created_at: now.clone(),
        updated_at: now,
    };
    match conversations::find_or_create(&state.db, &candidate).await {
        Ok((conversation, _created)) => (
            StatusCode::OK,
            Json(json!({ "success": true, "conversationId": conversation.id })),
        )
            .into_response(),
        Err(e) => storage_failure("create_conversation", &e),
    }
}

async fn save_message(
    state: &AppState,
    conversation_id: &str,
    role: MessageRole,
    content: &str,
) -> Response {
    // The gate is keyed by the shop owning the conversation.
    let conversation = match conversations::get_conversation(&state.db, conversation_id).await
    {
        Ok(Some(conversation)) => conversation,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Conversation not found" })),
            )
                .into_response();
        }
        Err(e) => return storage_failure("save_message", &e),
    };

    let decision = state.quota.can_send_message(&conversation.shop).await;
    if !decision.allowed {
        tracing::info!(shop = %conversation.shop, reason = %decision.reason, "message blocked");
        return quota_rejection(&decision);
    }

    let message = Message {
        id: uuid::Uuid::new_v4().to_string(),
        conversation_id: conversation_id.to_string(),
        role,
        content: content.to_string(),
        metadata: None,
        created_at: now_timestamp(),
    };
    match messages::insert_message(&state.db, &message).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "messageId": message.id })),
        )
            .into_response(),
        Err(e) => storage_failure("save_message", &e),
    }
}

async fn get_conversation(state: &AppState, conversation_id: &str) -> Response {
    let conversation = match conversations::get_conversation(&state.db, conversation_id).await
    {
        Ok(Some(conversation)) => conversation,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Conversation not found" })),
            )
                .into_response();
        }
        Err(e) => return storage_failure("get_conversation", &e),
    };

    let message_list = match messages::list_for_conversation(&state.db, conversation_id).await
    {
        Ok(list) => list,
        Err(e) => return storage_failure("get_conversation", &e),
    };

    let mut value = serde_json::to_value(&conversation).unwrap_or_else(|_| json!({}));
    if let Some(object) = value.as_object_mut() {
        object.insert(
            "messages".to_string(),
            serde_json::to_value(&message_list).unwrap_or_else(|_| json!([])),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "success": true, "conversation": value })),
    )
        .into_response()
}

/// POST /chat
///
/// Find-or-create the session's conversation, store the visitor message,
/// answer with a keyword-matched canned reply informed by naive document
/// retrieval, and store the reply. Both writes pass the quota gates; any
/// internal failure yields the generic apology rather than error internals.
pub async fn post_chat(State(state): State<AppState>, Json(body): Json<ChatRequest>) -> Response {
    let (Some(message), Some(shop)) = (
        body.message.filter(|m| !m.trim().is_empty()),
        body.shop.filter(|s| !s.trim().is_empty()),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Message and shop are required" })),
        )
            .into_response();
    };
    let session_id = body.session_id.unwrap_or_else(|| "default".to_string());

    match chat_turn(&state, &shop, &session_id, &message, body.customer_email, body.customer_name)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(shop, error = %e, "chat turn failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to process message",
                    "reply": APOLOGY_REPLY,
                })),
            )
                .into_response()
        }
    }
}

async fn chat_turn(
    state: &AppState,
    shop: &str,
    session_id: &str,
    message: &str,
    customer_email: Option<String>,
    customer_name: Option<String>,
) -> Result<Response, ParlorError> {
    let conversation = match conversations::get_by_session(&state.db, shop, session_id).await? {
        Some(existing) => existing,
        None => {
            let decision = state.quota.can_create_conversation(shop).await;
            if !decision.allowed {
                return Ok(quota_rejection(&decision));
            }
            let now = now_timestamp();
            let candidate = Conversation {
                id: uuid::Uuid::new_v4().to_string(),
                shop: shop.to_string(),
                session_id: session_id.to_string(),
                customer_email,
                customer_name,
                status: ConversationStatus::Active,
                created_at: now.clone(),
                updated_at: now,
            };
            conversations::find_or_create(&state.db, &candidate).await?.0
        }
    };

    let decision = state.quota.can_send_message(shop).await;
    if !decision.allowed {
        return Ok(quota_rejection(&decision));
    }

    messages::insert_message(
        &state.db,
        &Message {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation.id.clone(),
            role: MessageRole::User,
            content: message.to_string(),
            metadata: None,
            created_at: now_timestamp(),
        },
    )
    .await?;

    let context_docs = relevant_documents(&state.db, shop, message).await?;
    let reply = respond(message);

    messages::insert_message(
        &state.db,
        &Message {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation.id.clone(),
            role: MessageRole::Assistant,
            content: reply.to_string(),
            metadata: Some(
                json!({ "model": "canned-v1", "contextDocs": context_docs.len() }).to_string(),
            ),
            created_at: now_timestamp(),
        },
    )
    .await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "reply": reply,
            "conversationId": conversation.id,
            "sessionId": conversation.session_id,
        })),
    )
        .into_response())
}

/// GET /embed.js
///
/// The self-contained storefront script. Lazily persists active defaults for
/// shops that embed before configuring, and carries no-store headers plus an
/// `ETag` derived from the config hash.
pub async fn get_embed_script(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(shop) = resolve_shop(query.shop.as_deref(), &headers, &state.tenant_suffix)
    else {
        return (StatusCode::BAD_REQUEST, "Shop parameter required").into_response();
    };

    let doc = match store::get_or_create(&state.db, &shop).await {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(shop, error = %e, "embed config read failed, serving defaults");
            ConfigDocument::active_default()
        }
    };

    let script = render_embed_script(&doc, &shop, &state.public_base_url);
    let etag = format!("\"{}\"", config_hash(&doc));

    (
        no_store(),
        [
            (header::CONTENT_TYPE, "application/javascript".to_string()),
            (header::ETAG, etag),
        ],
        script,
    )
        .into_response()
}
