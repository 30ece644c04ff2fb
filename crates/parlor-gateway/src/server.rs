// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. The storefront routes are
//! public with permissive CORS (the script runs on merchant storefronts);
//! the admin routes sit behind the bearer middleware.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use parlor_core::ParlorError;
use parlor_ingest::CommerceClient;
use parlor_quota::QuotaGate;
use parlor_storage::Database;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::{admin, handlers};

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Tenant store handle.
    pub db: Database,
    /// Plan usage gate.
    pub quota: QuotaGate,
    /// Commerce API client for the ingestion trigger.
    pub commerce: CommerceClient,
    /// Public URL of this service, baked into the embed script.
    pub public_base_url: String,
    /// Domain suffix accepted for Referer-based shop resolution.
    pub tenant_suffix: String,
}

/// Server bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Bearer token for the admin surface (`None` = admin rejected).
    pub admin_token: Option<String>,
}

/// Build the full router.
pub fn build_router(config: &ServerConfig, state: AppState) -> Router {
    let auth_state = AuthConfig {
        admin_token: config.admin_token.clone(),
    };

    // Public storefront surface.
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route(
            "/widget-config",
            get(handlers::get_widget_config).post(handlers::post_widget_api),
        )
        .route("/chat", post(handlers::post_chat))
        .route("/embed.js", get(handlers::get_embed_script))
        .with_state(state.clone());

    // Admin surface behind the bearer middleware.
    let admin_routes = Router::new()
        .route("/admin/widget-config", put(admin::put_widget_config))
        .route("/admin/merchants", post(admin::post_merchant))
        .route("/admin/ingest", post(admin::post_ingest))
        .route("/admin/ingest/{job_id}", get(admin::get_ingest_job))
        .route("/admin/usage", get(admin::get_usage))
        .route("/admin/conversations", get(admin::list_conversations))
        .route(
            "/admin/conversations/{id}/status",
            put(admin::put_conversation_status),
        )
        .route(
            "/admin/conversations/{id}",
            axum::routing::delete(admin::delete_conversation),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process exits.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<(), ParlorError> {
    let app = build_router(config, state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ParlorError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ParlorError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
