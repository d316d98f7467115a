// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./breakdesk.toml` > `~/.config/breakdesk/breakdesk.toml`
//! > `/etc/breakdesk/breakdesk.toml` with environment variable overrides via the
//! `BREAKDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::BreakdeskConfig;

const SYSTEM_CONFIG: &str = "/etc/breakdesk/breakdesk.toml";
const LOCAL_CONFIG: &str = "breakdesk.toml";

/// Config files in merge order, lowest precedence first.
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("breakdesk").join(LOCAL_CONFIG));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG));
    paths
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/breakdesk/breakdesk.toml` (system-wide)
/// 3. `~/.config/breakdesk/breakdesk.toml` (user XDG config)
/// 4. `./breakdesk.toml` (local directory)
/// 5. `BREAKDESK_*` environment variables
pub fn load_config() -> Result<BreakdeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<BreakdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BreakdeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BreakdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BreakdeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    config_file_paths().into_iter().fold(
        Figment::new().merge(Serialized::defaults(BreakdeskConfig::default())),
        |figment, path| figment.merge(Toml::file(path)),
    )
    .merge(env_provider())
}

/// Environment provider mapping `BREAKDESK_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `BREAKDESK_CLIENT_BASE_URL`
/// must become `client.base_url`, not `client.base.url`.
fn env_provider() -> Env {
    Env::prefixed("BREAKDESK_").map(|key| {
        let key_str = key.as_str();
        let mapped = ["server", "ingest", "broadcast", "client"]
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}
