// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use breakdesk_core::BreakdeskError;
use breakdesk_queue::BreakRelay;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{
    AuthState, CredentialVerifier, WebhookAuth, basic_auth_middleware, webhook_auth_middleware,
};
use crate::handlers;
use crate::sse;

/// Process start, for `GET /health`.
#[derive(Debug, Clone)]
pub struct HealthState {
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }
}

/// Per-session stream settings.
#[derive(Debug, Clone, Copy)]
pub struct SseSettings {
    /// Snapshots buffered per session.
    pub channel_capacity: usize,
    /// Interval of keep-alive comments.
    pub keep_alive: Duration,
}

impl Default for SseSettings {
    fn default() -> Self {
        Self {
            channel_capacity: 16,
            keep_alive: Duration::from_secs(15),
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The break queue and its session broadcaster.
    pub relay: Arc<BreakRelay>,
    pub auth: AuthState,
    pub webhook: WebhookAuth,
    pub sse: SseSettings,
    pub health: HealthState,
    /// Cancelled on shutdown; ends open SSE streams so the server can drain.
    pub shutdown: CancellationToken,
}

impl GatewayState {
    pub fn new(relay: Arc<BreakRelay>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            relay,
            auth: AuthState { verifier },
            webhook: WebhookAuth::default(),
            sse: SseSettings::default(),
            health: HealthState::default(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_webhook_token(mut self, token: Option<String>) -> Self {
        self.webhook.token = token.map(Arc::from);
        self
    }

    pub fn with_sse(mut self, sse: SseSettings) -> Self {
        self.sse = sse;
        self
    }

    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }
}

/// Gateway listener configuration (mirrors `[server]` from breakdesk-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Build the gateway router.
///
/// - `GET /health` (public)
/// - `POST /new_order` (webhook token, if configured)
/// - `GET /login`, `GET /sse`, `GET /all_orders`,
///   `POST /order_completed/{n}`, `POST /update_order/{n}` (Basic auth)
pub fn build_router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let webhook_routes = Router::new()
        .route("/new_order", post(handlers::post_new_order))
        .route_layer(axum_middleware::from_fn_with_state(
            state.webhook.clone(),
            webhook_auth_middleware,
        ))
        .with_state(state.clone());

    let dashboard_routes = Router::new()
        .route("/login", get(handlers::get_login))
        .route("/sse", get(sse::sse_handler))
        .route("/all_orders", get(handlers::get_all_orders))
        .route(
            "/order_completed/{order_number}",
            post(handlers::post_order_completed),
        )
        .route(
            "/update_order/{order_number}",
            post(handlers::post_update_order),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            basic_auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(webhook_routes)
        .merge(dashboard_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the state's shutdown token is cancelled.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), BreakdeskError> {
    let shutdown = state.shutdown.clone();
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BreakdeskError::Http {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| BreakdeskError::Http {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("Gateway server stopped");
    Ok(())
}
