// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observable session state.
//!
//! Login and the push channel are tracked independently: a logged-in
//! session may be between stream connections, and a stream may still be
//! draining while a logout is processed.

use std::fmt;

/// Login progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginState {
    #[default]
    LoggedOut,
    /// A login request is in flight; further logins are ignored.
    Authenticating,
    LoggedIn,
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginState::LoggedOut => write!(f, "logged out"),
            LoginState::Authenticating => write!(f, "authenticating"),
            LoginState::LoggedIn => write!(f, "logged in"),
        }
    }
}

/// Push channel progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelState::Disconnected => write!(f, "disconnected"),
            ChannelState::Connecting => write!(f, "connecting"),
            ChannelState::Connected => write!(f, "connected"),
        }
    }
}

/// Snapshot of a session's state, published on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStatus {
    pub login: LoginState,
    pub channel: ChannelState,
    /// Why the last login (or authenticated call) failed.
    pub last_error: Option<String>,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, stream {}", self.login, self.channel)?;
        if let Some(error) = &self.last_error {
            write!(f, " (last error: {error})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_logged_out_and_disconnected() {
        let status = SessionStatus::default();
        assert_eq!(status.login, LoginState::LoggedOut);
        assert_eq!(status.channel, ChannelState::Disconnected);
        assert_eq!(status.to_string(), "logged out, stream disconnected");
    }

    #[test]
    fn display_includes_last_error() {
        let status = SessionStatus {
            last_error: Some("authentication denied".into()),
            ..SessionStatus::default()
        };
        assert!(status.to_string().ends_with("(last error: authentication denied)"));
    }
}
