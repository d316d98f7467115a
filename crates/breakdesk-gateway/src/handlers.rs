// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! Handles `GET /login`, `GET /all_orders`, `POST /order_completed/{n}`,
//! `POST /update_order/{n}`, `POST /new_order` and `GET /health`. The SSE
//! stream lives in [`crate::sse`].
//!
//! Mutation handlers respond only after the queue change and its broadcast
//! have both been attempted.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use breakdesk_core::{BreakPatch, Breaks, BreakdeskError, Order, OrderNumber};
use serde::{Deserialize, Serialize};

use crate::auth::Operator;
use crate::server::GatewayState;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub started_at: String,
    pub uptime_secs: u64,
    pub pending_breaks: usize,
    pub sessions: usize,
}

/// A [`BreakdeskError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub BreakdeskError);

impl From<BreakdeskError> for ApiError {
    fn from(err: BreakdeskError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            BreakdeskError::AuthDenied => StatusCode::UNAUTHORIZED,
            BreakdeskError::DuplicateOrder(_) => StatusCode::CONFLICT,
            BreakdeskError::NotFound(_) => StatusCode::NOT_FOUND,
            BreakdeskError::InvalidPatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            BreakdeskError::ChannelDelivery { .. } => StatusCode::SERVICE_UNAVAILABLE,
            BreakdeskError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// GET /login
///
/// Reaching the handler means the credentials were accepted.
pub async fn get_login(Extension(operator): Extension<Operator>) -> StatusCode {
    tracing::info!(operator = %operator.0, "operator logged in");
    StatusCode::OK
}

/// GET /all_orders
///
/// The current queue, for dashboards that poll instead of streaming.
pub async fn get_all_orders(State(state): State<GatewayState>) -> Json<Breaks> {
    Json(Breaks::clone(&state.relay.snapshot()))
}

/// POST /order_completed/{order_number}
///
/// Idempotent: completing an absent break is reported as success.
pub async fn post_order_completed(
    State(state): State<GatewayState>,
    Extension(operator): Extension<Operator>,
    Path(order_number): Path<OrderNumber>,
) -> Result<StatusCode, ApiError> {
    match state.relay.complete(order_number).await {
        Ok(report) => {
            tracing::info!(
                operator = %operator.0,
                order_number = %order_number,
                sessions = report.delivered,
                "order completed"
            );
            Ok(StatusCode::OK)
        }
        Err(BreakdeskError::NotFound(_)) => {
            tracing::debug!(order_number = %order_number, "completion of absent break ignored");
            Ok(StatusCode::OK)
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /update_order/{order_number}
///
/// Body: a [`BreakPatch`]. Unknown orders are 404, invalid patches 422.
pub async fn post_update_order(
    State(state): State<GatewayState>,
    Extension(operator): Extension<Operator>,
    Path(order_number): Path<OrderNumber>,
    Json(patch): Json<BreakPatch>,
) -> Result<StatusCode, ApiError> {
    let report = state.relay.update(order_number, &patch).await?;
    tracing::info!(
        operator = %operator.0,
        order_number = %order_number,
        sessions = report.delivered,
        "order updated"
    );
    Ok(StatusCode::OK)
}

/// POST /new_order
///
/// Storefront "order paid" webhook. Redelivery of a known order is logged
/// and acknowledged so the storefront stops retrying.
pub async fn post_new_order(
    State(state): State<GatewayState>,
    Json(order): Json<Order>,
) -> Result<StatusCode, ApiError> {
    let order_number = order.order_number;
    if let Err(e) = order.twitch_username() {
        tracing::debug!(order_number = %order_number, reason = %e, "order has no handle");
    }

    match state.relay.ingest(order).await {
        Ok(report) => {
            tracing::info!(
                order_number = %order_number,
                sessions = report.delivered,
                "new order received"
            );
            Ok(StatusCode::OK)
        }
        Err(BreakdeskError::DuplicateOrder(_)) => {
            tracing::info!(order_number = %order_number, "duplicate order received");
            Ok(StatusCode::OK)
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /health
///
/// Unauthenticated liveness probe.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: state.health.started_at.to_rfc3339(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        pending_breaks: state.relay.queue().len(),
        sessions: state.relay.subscriber_count(),
    })
}
