// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Breakdesk configuration.
//!
//! One TOML schema shared by `breakdesk serve` and the operator commands.
//! Files are layered (system, user, working directory), `BREAKDESK_*`
//! variables override them, and every problem is reported at once as a
//! miette diagnostic.
//!
//! ```no_run
//! match breakdesk_config::load_and_validate() {
//!     Ok(config) => println!("gateway on {}:{}", config.server.host, config.server.port),
//!     Err(errors) => breakdesk_config::render_errors(&errors),
//! }
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, format_errors, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::BreakdeskConfig;

/// Load from the standard locations plus environment, then validate.
pub fn load_and_validate() -> Result<BreakdeskConfig, Vec<ConfigError>> {
    checked(loader::load_config(), standard_sources)
}

/// Load one explicit file plus environment, then validate.
pub fn load_and_validate_path(path: &Path) -> Result<BreakdeskConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_source(path.to_path_buf()).into_iter().collect()
    })
}

/// Load a TOML string (no files, no environment), then validate.
pub fn load_and_validate_str(toml_content: &str) -> Result<BreakdeskConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Validate a loaded config, or turn the load error into diagnostics. The
/// sources are only read when there is an error to point into.
fn checked(
    loaded: Result<BreakdeskConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<BreakdeskConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

fn standard_sources() -> Vec<(String, String)> {
    loader::config_file_paths()
        .into_iter()
        .filter_map(read_source)
        .collect()
}

/// `(absolute path, content)`, matching how figment names file sources.
fn read_source(path: std::path::PathBuf) -> Option<(String, String)> {
    let content = std::fs::read_to_string(&path).ok()?;
    let name = std::path::absolute(&path).unwrap_or(path);
    Some((name.display().to_string(), content))
}
