// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Breakdesk - live break queue for stream card breaks.
//!
//! One binary for both sides: `serve` runs the gateway, the other commands
//! are the operator's dashboard client.

mod operator;
mod render;
mod serve;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use breakdesk_config::BreakdeskConfig;
use breakdesk_core::{BreakdeskError, OrderNumber};
use clap::{Parser, Subcommand};

/// Breakdesk - live break queue for stream card breaks.
#[derive(Parser, Debug)]
#[command(name = "breakdesk", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the gateway: ingest orders and serve dashboard sessions.
    Serve,
    /// Verify operator credentials and save them for later commands.
    Login {
        #[arg(long, short)]
        username: Option<String>,
        /// Read the key from stdin instead of prompting.
        #[arg(long)]
        password_stdin: bool,
    },
    /// Forget saved credentials.
    Logout,
    /// Follow the live queue until interrupted.
    Watch,
    /// Print the pending queue once.
    Orders,
    /// Mark a break done.
    Complete {
        /// Order number, with or without a leading `#`.
        order: OrderNumber,
    },
    /// Change a pending break's handle or line item notes.
    Update {
        order: OrderNumber,
        /// New stream handle; an empty value clears it.
        #[arg(long)]
        handle: Option<String>,
        /// Set the note of line item IDX.
        #[arg(long = "note", value_name = "IDX=TEXT", value_parser = operator::parse_note)]
        notes: Vec<(usize, String)>,
        /// Clear the note of line item IDX.
        #[arg(long = "clear-note", value_name = "IDX")]
        clear_notes: Vec<usize>,
    },
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => breakdesk_config::load_and_validate_path(path),
        None => breakdesk_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            breakdesk_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.log_level);

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: &BreakdeskConfig) -> Result<(), BreakdeskError> {
    match command {
        Commands::Serve => serve::run_serve(config, shutdown::install_signal_handler()).await,
        Commands::Login {
            username,
            password_stdin,
        } => operator::login(config, username, password_stdin).await,
        Commands::Logout => operator::logout(config),
        Commands::Watch => operator::watch(config, shutdown::install_signal_handler()).await,
        Commands::Orders => operator::orders(config).await,
        Commands::Complete { order } => operator::complete(config, order).await,
        Commands::Update {
            order,
            handle,
            notes,
            clear_notes,
        } => {
            let patch = operator::build_patch(handle, notes, clear_notes);
            operator::update(config, order, patch).await
        }
        Commands::Config => {
            print!("{}", redacted_toml(config)?);
            Ok(())
        }
    }
}

/// The config as TOML, with operator keys and the webhook token masked.
fn redacted_toml(config: &BreakdeskConfig) -> Result<String, BreakdeskError> {
    const MASK: &str = "[redacted]";

    let mut shown = config.clone();
    for operator in &mut shown.auth.operators {
        operator.key = MASK.to_string();
    }
    if let Some(token) = &mut shown.ingest.webhook_token {
        *token = MASK.to_string();
    }
    toml::to_string_pretty(&shown)
        .map_err(|e| BreakdeskError::Internal(format!("failed to render config: {e}")))
}

/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("breakdesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use breakdesk_config::model::OperatorConfig;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn update_flags_parse() {
        let cli = Cli::try_parse_from([
            "breakdesk",
            "update",
            "#10019",
            "--handle",
            "argablarga",
            "--note",
            "0=holo",
            "--note",
            "2=sealed",
            "--clear-note",
            "1",
        ])
        .unwrap();
        match cli.command {
            Commands::Update {
                order,
                handle,
                notes,
                clear_notes,
            } => {
                assert_eq!(order, OrderNumber::new(10019));
                assert_eq!(handle.as_deref(), Some("argablarga"));
                assert_eq!(notes, vec![(0, "holo".into()), (2, "sealed".into())]);
                assert_eq!(clear_notes, vec![1]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn bad_order_number_is_rejected() {
        assert!(Cli::try_parse_from(["breakdesk", "complete", "abc"]).is_err());
    }

    #[test]
    fn config_output_hides_secrets() {
        let mut config = BreakdeskConfig::default();
        config.auth.operators = vec![OperatorConfig {
            username: "streamer".into(),
            key: "hunter2".into(),
        }];
        config.ingest.webhook_token = Some("wix-secret".into());

        let text = redacted_toml(&config).unwrap();
        assert!(text.contains("streamer"));
        assert!(!text.contains("hunter2"));
        assert!(!text.contains("wix-secret"));
        assert!(text.contains("[redacted]"));
    }

    #[test]
    fn default_config_is_valid() {
        let config = breakdesk_config::load_and_validate_str("").unwrap();
        assert_eq!(config.server.port, 3000);
    }
}
