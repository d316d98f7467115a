// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints that serde attributes cannot express.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::BreakdeskConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns every violation found rather than stopping at the first.
pub fn validate_config(config: &BreakdeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.log_level.to_ascii_lowercase().as_str()) {
        fail(format!(
            "log_level `{}` is not one of {}",
            config.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.server.port == 0 {
        fail("server.port must not be 0".to_string());
    }

    let mut seen_names = HashSet::new();
    for (i, operator) in config.auth.operators.iter().enumerate() {
        if operator.username.trim().is_empty() {
            fail(format!("auth.operators[{i}].username must not be empty"));
        } else if operator.username.contains(':') {
            fail(format!(
                "auth.operators[{i}].username must not contain `:`"
            ));
        } else if !seen_names.insert(operator.username.as_str()) {
            fail(format!(
                "duplicate operator `{}` in [[auth.operators]]",
                operator.username
            ));
        }
        if operator.key.is_empty() {
            fail(format!("auth.operators[{i}].key must not be empty"));
        }
    }

    if let Some(token) = &config.ingest.webhook_token
        && token.trim().is_empty()
    {
        fail("ingest.webhook_token must not be empty when set".to_string());
    }

    if config.broadcast.channel_capacity == 0 {
        fail("broadcast.channel_capacity must be at least 1".to_string());
    }
    if config.broadcast.delivery_timeout_ms == 0 {
        fail("broadcast.delivery_timeout_ms must be at least 1".to_string());
    }
    if config.broadcast.keep_alive_secs == 0 {
        fail("broadcast.keep_alive_secs must be at least 1".to_string());
    }

    let base_url = config.client.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        fail(format!(
            "client.base_url `{base_url}` must start with http:// or https://"
        ));
    }
    if config.client.reconnect_initial_ms == 0 {
        fail("client.reconnect_initial_ms must be at least 1".to_string());
    }
    if config.client.reconnect_initial_ms > config.client.reconnect_max_ms {
        fail(format!(
            "client.reconnect_initial_ms ({}) must not exceed client.reconnect_max_ms ({})",
            config.client.reconnect_initial_ms, config.client.reconnect_max_ms
        ));
    }
    if config.client.request_timeout_secs == 0 {
        fail("client.request_timeout_secs must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
