// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard session client for breakdesk.
//!
//! [`Session`] logs an operator in, follows the server's push stream and
//! sends mutation commands. [`CredentialStore`] keeps the operator logged in
//! across restarts.

pub mod api;
pub mod backoff;
pub mod session;
pub mod sse;
pub mod state;
pub mod store;

pub use api::{EventStream, GatewayClient};
pub use backoff::Backoff;
pub use session::{ReconnectPolicy, Session};
pub use state::{ChannelState, LoginState, SessionStatus};
pub use store::CredentialStore;
