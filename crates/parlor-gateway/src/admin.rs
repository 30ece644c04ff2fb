// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin handlers, behind the bearer-token middleware.
//!
//! The external auth collaborator authenticates the merchant; these routes
//! take the already-resolved shop domain (query parameter or body field)
//! and surface literal validation messages back to the admin UI.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use parlor_core::{ParlorError, now_timestamp};
use parlor_ingest::start_ingestion;
use parlor_storage::models::{ConversationStatus, Merchant};
use parlor_storage::queries::{conversations, jobs, merchants, plans};
use parlor_widget::{ConfigInput, store};

use crate::handlers::ShopQuery;
use crate::server::AppState;

/// POST /admin/merchants body: the install callback payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    pub shop: String,
    pub access_token: String,
}

/// POST /admin/ingest body.
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub shop: String,
}

fn unexpected(context: &str, e: &ParlorError) -> Response {
    tracing::error!(context, error = %e, "admin request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": "Unexpected error" })),
    )
        .into_response()
}

/// PUT /admin/widget-config?shop=<domain>
///
/// Validated full-row save. Invalid colors are coerced; an invalid position
/// rejects the write and leaves the stored row untouched.
pub async fn put_widget_config(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
    Json(input): Json<ConfigInput>,
) -> Response {
    let Some(shop) = query.shop.filter(|s| !s.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Missing shop parameter" })),
        )
            .into_response();
    };

    let doc = match input.sanitize() {
        Ok(doc) => doc,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response();
        }
    };

    match store::save_config(&state.db, &shop, &doc).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Widget settings saved successfully!",
            })),
        )
            .into_response(),
        Err(e) => unexpected("put_widget_config", &e),
    }
}

/// POST /admin/merchants
///
/// Provisioning hook called after an authenticated install: upserts the
/// merchant and binds the free plan if the shop has none.
pub async fn post_merchant(
    State(state): State<AppState>,
    Json(body): Json<ProvisionRequest>,
) -> Response {
    if body.shop.trim().is_empty() || body.access_token.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "shop and accessToken are required" })),
        )
            .into_response();
    }

    let merchant = Merchant {
        shop: body.shop.trim().to_string(),
        access_token: body.access_token,
        installed_at: now_timestamp(),
        uninstalled_at: None,
    };

    if let Err(e) = merchants::upsert_merchant(&state.db, &merchant).await {
        return unexpected("post_merchant", &e);
    }
    if let Err(e) = plans::ensure_free_plan(&state.db, &merchant.shop, chrono::Utc::now()).await
    {
        return unexpected("post_merchant", &e);
    }

    tracing::info!(shop = %merchant.shop, "merchant provisioned");
    (StatusCode::OK, Json(json!({ "success": true }))).into_response()
}

/// POST /admin/ingest
///
/// Creates the job row and spawns the run; returns the job id immediately.
/// Progress is polled via `GET /admin/ingest/{job_id}`.
pub async fn post_ingest(
    State(state): State<AppState>,
    Json(body): Json<IngestRequest>,
) -> Response {
    match start_ingestion(&state.db, &state.commerce, &body.shop).await {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(json!({ "success": true, "jobId": job_id })),
        )
            .into_response(),
        Err(ParlorError::NotFound { .. }) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Merchant not found" })),
        )
            .into_response(),
        Err(e) => unexpected("post_ingest", &e),
    }
}

/// GET /admin/ingest/{job_id}
pub async fn get_ingest_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    match jobs::get_job(&state.db, &job_id).await {
        Ok(Some(job)) => {
            let errors = job.error_list();
            (
                StatusCode::OK,
                Json(json!({
                    "jobId": job.id,
                    "shop": job.shop,
                    "status": job.status,
                    "progress": job.progress,
                    "total": job.total,
                    "errors": errors,
                    "startedAt": job.started_at,
                    "finishedAt": job.finished_at,
                })),
            )
                .into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Job not found" })),
        )
            .into_response(),
        Err(e) => unexpected("get_ingest_job", &e),
    }
}

/// PUT /admin/conversations/{id}/status body.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ConversationStatus,
}

/// GET /admin/conversations?shop=<domain>
///
/// The merchant's conversation history, newest first.
pub async fn list_conversations(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
) -> Response {
    let Some(shop) = query.shop.filter(|s| !s.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing shop parameter" })),
        )
            .into_response();
    };

    match conversations::list_by_shop(&state.db, &shop).await {
        Ok(list) => (
            StatusCode::OK,
            Json(json!({ "conversations": list })),
        )
            .into_response(),
        Err(e) => unexpected("list_conversations", &e),
    }
}

/// PUT /admin/conversations/{id}/status
pub async fn put_conversation_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Response {
    match conversations::get_conversation(&state.db, &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Conversation not found" })),
            )
                .into_response();
        }
        Err(e) => return unexpected("put_conversation_status", &e),
    }

    match conversations::update_status(&state.db, &id, body.status, &now_timestamp()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Conversation status updated" })),
        )
            .into_response(),
        Err(e) => unexpected("put_conversation_status", &e),
    }
}

/// DELETE /admin/conversations/{id}
///
/// Removes the conversation and, by cascade, its messages.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match conversations::delete_conversation(&state.db, &id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Conversation deleted" })),
        )
            .into_response(),
        Err(e) => unexpected("delete_conversation", &e),
    }
}

/// GET /admin/usage?shop=<domain>
///
/// Current-window usage counters for the admin dashboard.
pub async fn get_usage(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
) -> Response {
    let Some(shop) = query.shop.filter(|s| !s.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing shop parameter" })),
        )
            .into_response();
    };

    let stats = state.quota.usage_stats(&shop).await;
    (
        StatusCode::OK,
        Json(json!({
            "shop": shop,
            "conversations": stats.conversations,
            "messages": stats.messages,
        })),
    )
        .into_response()
}
