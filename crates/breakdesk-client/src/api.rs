// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the gateway endpoints.
//!
//! Every call carries the operator's Basic credentials; the server keeps no
//! session. Status codes map onto [`BreakdeskError`] variants so callers can
//! tell a rejected login from an unknown order from a transport failure.

use std::pin::Pin;
use std::time::Duration;

use breakdesk_core::{BreakPatch, Breaks, BreakdeskError, Credentials, OrderNumber, ServerEvent};
use futures::Stream;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::debug;

use crate::sse;

/// Boxed stream of decoded push messages.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<ServerEvent, BreakdeskError>> + Send>>;

/// Thin wrapper over the gateway's HTTP surface.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    stream_client: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    /// `request_timeout` bounds plain requests; the push stream is unbounded.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, BreakdeskError> {
        let build_error = |e: reqwest::Error| BreakdeskError::Http {
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        };

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(build_error)?;
        let stream_client = reqwest::Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .map_err(build_error)?;

        Ok(Self {
            client,
            stream_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /login`. `Ok` means the credentials were accepted.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), BreakdeskError> {
        let request = self.client.get(self.url("/login"));
        self.send(request, credentials, None).await.map(drop)
    }

    /// `GET /all_orders`.
    pub async fn all_orders(&self, credentials: &Credentials) -> Result<Breaks, BreakdeskError> {
        let request = self.client.get(self.url("/all_orders"));
        let response = self.send(request, credentials, None).await?;
        response.json().await.map_err(|e| BreakdeskError::Protocol(format!(
            "failed to parse queue snapshot: {e}"
        )))
    }

    /// `POST /order_completed/{n}`.
    pub async fn complete_order(
        &self,
        credentials: &Credentials,
        order_number: OrderNumber,
    ) -> Result<(), BreakdeskError> {
        let request = self
            .client
            .post(self.url(&format!("/order_completed/{order_number}")));
        self.send(request, credentials, Some(order_number))
            .await
            .map(drop)
    }

    /// `POST /update_order/{n}` with `patch` as the JSON body.
    pub async fn update_order(
        &self,
        credentials: &Credentials,
        order_number: OrderNumber,
        patch: &BreakPatch,
    ) -> Result<(), BreakdeskError> {
        let request = self
            .client
            .post(self.url(&format!("/update_order/{order_number}")))
            .json(patch);
        self.send(request, credentials, Some(order_number))
            .await
            .map(drop)
    }

    /// `GET /sse`, decoded into [`ServerEvent`]s.
    pub async fn open_stream(&self, credentials: &Credentials) -> Result<EventStream, BreakdeskError> {
        let request = self
            .stream_client
            .get(self.url("/sse"))
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"));
        let response = self.send(request, credentials, None).await?;
        Ok(sse::parse_event_stream(response))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `order_number` is the order the request targets, if any; it decides
    /// how 404 and 422 responses are reported.
    async fn send(
        &self,
        request: RequestBuilder,
        credentials: &Credentials,
        order_number: Option<OrderNumber>,
    ) -> Result<Response, BreakdeskError> {
        let authorization = HeaderValue::from_str(&credentials.basic_auth_header())
            .map_err(|e| BreakdeskError::Config(format!("credentials are not a valid header: {e}")))?;

        let response = request
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| BreakdeskError::Http {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, url = %response.url(), "gateway response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body, order_number))
    }
}

/// Map a non-success gateway response to an error. Not-found and rejected
/// patches only become order errors for requests that name an order.
fn status_error(
    status: StatusCode,
    body: &str,
    order_number: Option<OrderNumber>,
) -> BreakdeskError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string());

    match (status, order_number) {
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => BreakdeskError::AuthDenied,
        (StatusCode::NOT_FOUND, Some(order_number)) => BreakdeskError::NotFound(order_number),
        (StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST, Some(order_number)) => {
            BreakdeskError::InvalidPatch {
                order_number,
                reason: detail,
            }
        }
        (StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST, None) => {
            BreakdeskError::Protocol(format!("gateway rejected request: {detail}"))
        }
        _ => BreakdeskError::Http {
            message: format!("gateway returned {status}: {detail}"),
            source: None,
        },
    }
}
