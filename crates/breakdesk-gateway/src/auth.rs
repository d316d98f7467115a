// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication middleware for the gateway.
//!
//! Dashboard routes use HTTP Basic auth on every request; the server keeps
//! no session state. The storefront webhook optionally uses a bearer token.
//!
//! When no operator is configured, every dashboard request is rejected
//! (fail-closed).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use breakdesk_core::Credentials;

use crate::handlers::ErrorResponse;

/// Decides whether a set of credentials belongs to an operator.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, credentials: &Credentials) -> bool;
}

/// Fixed operator list, typically from `[[auth.operators]]`.
#[derive(Clone, Default)]
pub struct StaticOperators {
    keys: HashMap<String, String>,
}

impl StaticOperators {
    pub fn new<I, U, K>(operators: I) -> Self
    where
        I: IntoIterator<Item = (U, K)>,
        U: Into<String>,
        K: Into<String>,
    {
        Self {
            keys: operators
                .into_iter()
                .map(|(username, key)| (username.into(), key.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl std::fmt::Debug for StaticOperators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.keys.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("StaticOperators")
            .field("operators", &names)
            .finish()
    }
}

#[async_trait]
impl CredentialVerifier for StaticOperators {
    async fn verify(&self, credentials: &Credentials) -> bool {
        self.keys
            .get(&credentials.username)
            .is_some_and(|key| *key == credentials.password)
    }
}

/// The operator a request was authenticated as. Inserted into request
/// extensions by [`basic_auth_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator(pub String);

/// State for [`basic_auth_middleware`].
#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn CredentialVerifier>,
}

/// State for [`webhook_auth_middleware`].
#[derive(Clone, Default)]
pub struct WebhookAuth {
    /// Expected bearer token. `None` leaves the webhook open.
    pub token: Option<Arc<str>>,
}

impl std::fmt::Debug for WebhookAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookAuth")
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"breakdesk\"")],
        Json(ErrorResponse {
            error: "authentication denied".to_string(),
        }),
    )
        .into_response()
}

/// Middleware that admits a request only with valid operator credentials.
///
/// Accepts `Authorization: Basic <base64>` and, for older dashboards, the
/// bare `<base64>` value.
pub async fn basic_auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let credentials = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(Credentials::from_basic_auth_header);

    let Some(credentials) = credentials else {
        tracing::debug!(path = %request.uri().path(), "request without basic credentials");
        return unauthorized();
    };

    if !auth.verifier.verify(&credentials).await {
        tracing::warn!(username = %credentials.username, "authentication denied");
        return unauthorized();
    }

    request
        .extensions_mut()
        .insert(Operator(credentials.username));
    next.run(request).await
}

/// Middleware guarding the storefront webhook with a bearer token.
pub async fn webhook_auth_middleware(
    State(auth): State<WebhookAuth>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = auth.token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(token) if token == expected => Ok(next.run(request).await),
        _ => {
            tracing::warn!("webhook call rejected: bad or missing token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
