// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the break queue.
//!
//! Operators authenticate with Basic auth on every request and receive the
//! queue over SSE; mutations go through plain POST endpoints and reach every
//! open dashboard as a fresh snapshot. The storefront feeds paid orders in
//! through a webhook.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod sse;

pub use auth::{CredentialVerifier, Operator, StaticOperators};
pub use handlers::{ApiError, ErrorResponse, HealthResponse};
pub use server::{GatewayState, HealthState, ServerConfig, SseSettings, build_router, start_server};
