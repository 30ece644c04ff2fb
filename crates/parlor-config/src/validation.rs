// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses, URL shapes, and page-size
//! bounds.

use crate::diagnostic::ConfigError;
use crate::model::ParlorConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ParlorConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::Validation {
            message: "server.port must be non-zero".to_string(),
        });
    }

    let base_url = config.server.public_base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!(
                "server.public_base_url must start with http:// or https://, got `{base_url}`"
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if !config.tenant.domain_suffix.starts_with('.') {
        errors.push(ConfigError::Validation {
            message: format!(
                "tenant.domain_suffix must start with `.`, got `{}`",
                config.tenant.domain_suffix
            ),
        });
    }

    if config.commerce.page_size == 0 || config.commerce.page_size > 250 {
        errors.push(ConfigError::Validation {
            message: format!(
                "commerce.page_size must be in 1..=250, got {}",
                config.commerce.page_size
            ),
        });
    }

    if config.commerce.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "commerce.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if let Some(token) = &config.auth.admin_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "auth.admin_token must not be empty when set".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
