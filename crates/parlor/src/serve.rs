// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `serve` subcommand: wire storage, quota, and the gateway together.

use parlor_config::ParlorConfig;
use parlor_core::ParlorError;
use parlor_gateway::{AppState, ServerConfig, start_server};
use parlor_ingest::{CommerceClient, CommerceSettings};
use parlor_quota::QuotaGate;
use parlor_storage::Database;
use parlor_storage::queries::plans;

/// Open storage, seed reference data, and serve until shutdown.
pub async fn run(config: &ParlorConfig) -> Result<(), ParlorError> {
    let db = Database::open_with(&config.storage.database_path, config.storage.wal_mode)
        .await?;
    plans::seed_default_plans(&db).await?;

    let commerce = CommerceClient::new(commerce_settings(config))?;

    let state = AppState {
        db: db.clone(),
        quota: QuotaGate::new(db),
        commerce,
        public_base_url: config.server.public_base_url.trim_end_matches('/').to_string(),
        tenant_suffix: config.tenant.domain_suffix.clone(),
    };

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        admin_token: config.auth.admin_token.clone(),
    };

    tracing::info!(
        database = %config.storage.database_path,
        base_url = %state.public_base_url,
        "parlor starting"
    );
    start_server(&server_config, state).await
}

/// Map the config section onto the ingest client's settings mirror.
pub fn commerce_settings(config: &ParlorConfig) -> CommerceSettings {
    CommerceSettings {
        api_version: config.commerce.api_version.clone(),
        page_size: config.commerce.page_size,
        request_timeout: std::time::Duration::from_secs(config.commerce.request_timeout_secs),
        max_retries: config.commerce.max_retries,
        base_url_override: config.commerce.base_url_override.clone(),
    }
}
