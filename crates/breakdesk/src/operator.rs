// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator commands: `login`, `logout`, `watch`, `orders`, `complete`,
//! `update`.
//!
//! Each command builds a [`Session`] against `client.base_url`. Commands
//! other than `login` use the credentials saved by the last login.

use std::io::{BufRead, IsTerminal, Write};

use breakdesk_client::{CredentialStore, GatewayClient, ReconnectPolicy, Session};
use breakdesk_config::BreakdeskConfig;
use breakdesk_core::{BreakPatch, BreakdeskError, Credentials, OrderNumber};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::render::render_breaks;

pub fn session(config: &BreakdeskConfig) -> Result<Session, BreakdeskError> {
    let api = GatewayClient::new(&config.client.base_url, config.client.request_timeout())?;
    Ok(Session::new(
        api,
        ReconnectPolicy {
            initial: config.client.reconnect_initial(),
            max: config.client.reconnect_max(),
        },
    ))
}

fn store(config: &BreakdeskConfig) -> Result<CredentialStore, BreakdeskError> {
    CredentialStore::at(config.client.credentials_path.as_deref())
}

/// A session logged in with the saved credentials.
async fn resume(config: &BreakdeskConfig) -> Result<Session, BreakdeskError> {
    let store = store(config)?;
    let credentials = store.load()?.ok_or_else(|| {
        BreakdeskError::Config("not logged in; run `breakdesk login` first".to_string())
    })?;
    let session = session(config)?;
    session.login(credentials).await?;
    Ok(session)
}

pub async fn login(
    config: &BreakdeskConfig,
    username: Option<String>,
    password_stdin: bool,
) -> Result<(), BreakdeskError> {
    let username = match username {
        Some(username) => username,
        None => prompt_line("Username: ")?,
    };
    let password = if password_stdin {
        read_stdin_line()?
    } else {
        prompt_password()?
    };
    if username.is_empty() {
        return Err(BreakdeskError::Config("username must not be empty".to_string()));
    }

    let credentials = Credentials::new(username, password);
    let session = session(config)?;
    session.login(credentials.clone()).await?;

    let store = store(config)?;
    store.save(&credentials)?;
    println!(
        "logged in to {} as {}",
        config.client.base_url, credentials.username
    );
    debug!(path = %store.path().display(), "credentials stored");
    Ok(())
}

pub fn logout(config: &BreakdeskConfig) -> Result<(), BreakdeskError> {
    store(config)?.clear()?;
    println!("logged out");
    Ok(())
}

/// Follow the push stream and print every snapshot until `shutdown`.
pub async fn watch(
    config: &BreakdeskConfig,
    shutdown: CancellationToken,
) -> Result<(), BreakdeskError> {
    let session = resume(config).await?;
    let mut view = session.view();
    let mut status = session.status();

    let printer = async {
        loop {
            tokio::select! {
                changed = view.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let breaks = view.borrow_and_update().clone();
                    print!("\n{}", render_breaks(&breaks));
                    let _ = std::io::stdout().flush();
                }
                changed = status.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = status.borrow_and_update().clone();
                    eprintln!("[{current}]");
                }
            }
        }
    };

    tokio::select! {
        result = session.run_stream(shutdown) => result,
        _ = printer => Ok(()),
    }
}

pub async fn orders(config: &BreakdeskConfig) -> Result<(), BreakdeskError> {
    let session = resume(config).await?;
    let breaks = session.refresh().await?;
    print!("{}", render_breaks(&breaks));
    Ok(())
}

pub async fn complete(config: &BreakdeskConfig, order: OrderNumber) -> Result<(), BreakdeskError> {
    let session = resume(config).await?;
    session.complete_order(order).await?;
    println!("order #{order} marked complete");
    Ok(())
}

pub async fn update(
    config: &BreakdeskConfig,
    order: OrderNumber,
    patch: BreakPatch,
) -> Result<(), BreakdeskError> {
    if patch.is_empty() {
        return Err(BreakdeskError::Config(
            "nothing to update; pass --handle, --note or --clear-note".to_string(),
        ));
    }
    let session = resume(config).await?;
    session.update_order(order, &patch).await?;
    println!("order #{order} updated");
    Ok(())
}

/// Assemble a patch from `update` flags. Clears come after sets, so
/// `--note 0=x --clear-note 0` clears.
pub fn build_patch(
    handle: Option<String>,
    notes: Vec<(usize, String)>,
    clear_notes: Vec<usize>,
) -> BreakPatch {
    let patch = BreakPatch {
        twitch_username: handle,
        ..BreakPatch::default()
    };
    let patch = notes
        .into_iter()
        .fold(patch, |patch, (idx, text)| patch.with_note(idx, Some(text)));
    clear_notes
        .into_iter()
        .fold(patch, |patch, idx| patch.with_note(idx, None))
}

/// clap value parser for `--note IDX=TEXT`.
pub fn parse_note(value: &str) -> Result<(usize, String), String> {
    let (idx, text) = value
        .split_once('=')
        .ok_or_else(|| format!("expected IDX=TEXT, got `{value}`"))?;
    let idx = idx
        .trim()
        .parse()
        .map_err(|_| format!("line item index `{idx}` is not a number"))?;
    Ok((idx, text.to_string()))
}

fn prompt_line(prompt: &str) -> Result<String, BreakdeskError> {
    eprint!("{prompt}");
    let _ = std::io::stderr().flush();
    read_stdin_line()
}

fn read_stdin_line() -> Result<String, BreakdeskError> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| BreakdeskError::Internal(format!("failed to read stdin: {e}")))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn prompt_password() -> Result<String, BreakdeskError> {
    if !std::io::stdin().is_terminal() {
        return Err(BreakdeskError::Config(
            "no terminal for the password prompt; use --password-stdin".to_string(),
        ));
    }
    eprint!("Key: ");
    rpassword::read_password()
        .map_err(|e| BreakdeskError::Internal(format!("failed to read key: {e}")))
}
