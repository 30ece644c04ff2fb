// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parlor chat-widget backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Parlor configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParlorConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Admin authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Tenant-domain resolution settings.
    #[serde(default)]
    pub tenant: TenantConfig,

    /// Commerce platform API settings (ingestion).
    #[serde(default)]
    pub commerce: CommerceConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Public base URL the embed script uses to call back into the service.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_base_url: default_public_base_url(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8470
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:8470".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("parlor").join("parlor.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "parlor.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Admin authentication configuration.
///
/// The external auth collaborator owns merchant identity; the only gateway
/// credential is the bearer token guarding the admin routes. `None` rejects
/// every admin request (fail-closed).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Bearer token required on `/admin/*` routes.
    #[serde(default)]
    pub admin_token: Option<String>,
}

/// Tenant-domain resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TenantConfig {
    /// Domain suffix a Referer hostname must carry to be accepted as a shop
    /// identifier (see shop resolution order in the gateway).
    #[serde(default = "default_domain_suffix")]
    pub domain_suffix: String,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            domain_suffix: default_domain_suffix(),
        }
    }
}

fn default_domain_suffix() -> String {
    ".myshopify.com".to_string()
}

/// Commerce platform API configuration for the ingestion job.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CommerceConfig {
    /// Admin API version segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Page size for paginated resource fetches (1..=250).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retry attempts for transient transport failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Override the API base URL scheme+host (testing). When unset, requests
    /// go to `https://<shop>`.
    #[serde(default)]
    pub base_url_override: Option<String>,
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            base_url_override: None,
        }
    }
}

fn default_api_version() -> String {
    "2023-10".to_string()
}

fn default_page_size() -> u32 {
    250
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = ParlorConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8470);
        assert_eq!(config.server.log_level, "info");
        assert!(config.auth.admin_token.is_none());
        assert_eq!(config.tenant.domain_suffix, ".myshopify.com");
        assert_eq!(config.commerce.page_size, 250);
        assert_eq!(config.commerce.max_retries, 2);
        assert!(config.storage.wal_mode);
    }

    #[test]
    fn config_serializes_round_trip() {
        let config = ParlorConfig::default();
        let toml = toml::to_string(&config).unwrap();
        let back: ParlorConfig = toml::from_str(&toml).unwrap();
        assert_eq!(back.server.port, config.server.port);
        assert_eq!(back.commerce.api_version, config.commerce.api_version);
    }
}
