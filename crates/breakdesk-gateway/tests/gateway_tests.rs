// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests for the gateway, driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use breakdesk_core::{Breaks, Credentials, OrderNumber};
use breakdesk_gateway::{GatewayState, StaticOperators, build_router};
use breakdesk_queue::BreakRelay;
use breakdesk_test_utils::MockChannel;
use breakdesk_test_utils::fixtures::{order_10019, wix_order_10019_json};
use futures::StreamExt;
use tower::ServiceExt;

fn state() -> GatewayState {
    let relay = Arc::new(BreakRelay::new(Duration::from_millis(500)));
    let operators = StaticOperators::new([("streamer", "hunter2")]);
    GatewayState::new(relay, Arc::new(operators))
}

fn auth() -> String {
    Credentials::new("streamer", "hunter2").basic_auth_header()
}

fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, authorization: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn post_empty(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn seeded() -> (GatewayState, Router) {
    let state = state();
    state.relay.ingest(order_10019()).await.unwrap();
    let app = build_router(state.clone());
    (state, app)
}

#[tokio::test]
async fn login_accepts_only_operator_credentials() {
    let app = build_router(state());

    let (status, _) = send(&app, get("/login", Some(&auth()))).await;
    assert_eq!(status, StatusCode::OK);

    // Bare base64, as sent by the first dashboard.
    let bare = auth().trim_start_matches("Basic ").to_string();
    let (status, _) = send(&app, get("/login", Some(&bare))).await;
    assert_eq!(status, StatusCode::OK);

    let wrong = Credentials::new("streamer", "nope").basic_auth_header();
    let response = app.clone().oneshot(get("/login", Some(&wrong))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

    let (status, _) = send(&app, get("/login", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn every_dashboard_route_requires_auth() {
    let (state, app) = seeded().await;
    for request in [
        get("/sse", None),
        get("/all_orders", None),
        post_empty("/order_completed/10019", None),
        post_json("/update_order/10019", None, serde_json::json!({})),
    ] {
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    assert_eq!(state.relay.snapshot().len(), 1);
}

#[tokio::test]
async fn health_is_public() {
    let (_, app) = seeded().await;
    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["pending_breaks"], 1);
}

#[tokio::test]
async fn all_orders_returns_snapshot() {
    let (_, app) = seeded().await;
    let (status, body) = send(&app, get("/all_orders", Some(&auth()))).await;
    assert_eq!(status, StatusCode::OK);
    let breaks: Breaks = serde_json::from_slice(&body).unwrap();
    assert_eq!(breaks.order_ids(), vec![OrderNumber::new(10019)]);
}

#[tokio::test]
async fn order_completed_is_idempotent() {
    let (state, app) = seeded().await;

    let (status, _) = send(&app, post_empty("/order_completed/10019", Some(&auth()))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(state.relay.snapshot().is_empty());

    let (status, _) = send(&app, post_empty("/order_completed/10019", Some(&auth()))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn update_order_applies_patch() {
    let (state, app) = seeded().await;
    let body = serde_json::json!({
        "twitch_username": "newhandle",
        "line_item_notes": [{ "index": 0, "note": "hello" }]
    });

    let (status, _) = send(&app, post_json("/update_order/10019", Some(&auth()), body)).await;
    assert_eq!(status, StatusCode::OK);

    let snapshot = state.relay.snapshot();
    let brk = snapshot.get(OrderNumber::new(10019)).unwrap();
    assert_eq!(brk.twitch_username.as_deref(), Some("newhandle"));
    assert_eq!(brk.order.line_items[0].notes.as_deref(), Some("hello"));
    assert!(brk.order.line_items[1].notes.is_none());
}

#[tokio::test]
async fn update_of_unknown_order_is_404_and_not_broadcast() {
    let (state, app) = seeded().await;
    let sessions = [MockChannel::new(), MockChannel::new()];
    let mut subscriptions = Vec::new();
    for channel in &sessions {
        subscriptions.push(state.relay.subscribe(Arc::new(channel.clone())).await.unwrap());
    }

    let body = serde_json::json!({ "line_item_notes": [{ "index": 0, "note": "x" }] });
    let (status, body) = send(&app, post_json("/update_order/424242", Some(&auth()), body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(error["error"].as_str().unwrap().contains("424242"));

    for channel in &sessions {
        // Only the registration snapshot.
        assert_eq!(channel.received_count().await, 1);
    }
}

#[tokio::test]
async fn invalid_patches_are_rejected() {
    let (state, app) = seeded().await;

    let long_handle = "x".repeat(65);
    let (status, _) = send(
        &app,
        post_json(
            "/update_order/10019",
            Some(&auth()),
            serde_json::json!({ "twitch_username": long_handle }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        post_json(
            "/update_order/10019",
            Some(&auth()),
            serde_json::json!({ "line_item_notes": [{ "index": 3, "note": "x" }] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Unknown fields fail body extraction.
    let (status, _) = send(
        &app,
        post_json(
            "/update_order/10019",
            Some(&auth()),
            serde_json::json!({ "quantity": 99 }),
        ),
    )
    .await;
    assert!(status.is_client_error());

    let snapshot = state.relay.snapshot();
    let brk = snapshot.get(OrderNumber::new(10019)).unwrap();
    assert_eq!(brk.order, order_10019());
    assert_eq!(brk.twitch_username.as_deref(), Some("argablarga"));
}

#[tokio::test]
async fn mutation_reaches_every_session_once() {
    let (state, app) = seeded().await;
    let sessions = [MockChannel::new(), MockChannel::new(), MockChannel::new()];
    let mut subscriptions = Vec::new();
    for channel in &sessions {
        subscriptions.push(state.relay.subscribe(Arc::new(channel.clone())).await.unwrap());
    }

    let body = serde_json::json!({ "line_item_notes": [{ "index": 2, "note": "graded" }] });
    let (status, _) = send(&app, post_json("/update_order/10019", Some(&auth()), body)).await;
    assert_eq!(status, StatusCode::OK);

    for channel in &sessions {
        assert_eq!(channel.received_count().await, 2);
        let last = channel.last().await.unwrap();
        let brk = last.get(OrderNumber::new(10019)).unwrap();
        assert_eq!(brk.order.line_items[2].notes.as_deref(), Some("graded"));
    }
}

#[tokio::test]
async fn new_order_webhook_deduplicates() {
    let state = state();
    let app = build_router(state.clone());

    let (status, _) = send(&app, post_json("/new_order", None, wix_order_10019_json())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, post_json("/new_order", None, wix_order_10019_json())).await;
    assert_eq!(status, StatusCode::OK);

    let snapshot = state.relay.snapshot();
    assert_eq!(snapshot.len(), 1);
    let brk = snapshot.get(OrderNumber::new(10019)).unwrap();
    assert_eq!(brk.twitch_username.as_deref(), Some("argablarga"));
    let quantities: Vec<u32> = brk.order.line_items.iter().map(|i| i.quantity).collect();
    assert_eq!(quantities, vec![4, 10, 2]);
}

#[tokio::test]
async fn new_order_webhook_checks_token_when_configured() {
    let state = state().with_webhook_token(Some("whsec".into()));
    let app = build_router(state.clone());

    let (status, _) = send(&app, post_json("/new_order", None, wix_order_10019_json())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(state.relay.snapshot().is_empty());

    let (status, _) = send(
        &app,
        post_json("/new_order", Some("Bearer whsec"), wix_order_10019_json()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.relay.snapshot().len(), 1);
}

#[tokio::test]
async fn sse_opens_with_current_snapshot() {
    let (state, app) = seeded().await;
    let response = app.clone().oneshot(get("/sse", Some(&auth()))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    assert_eq!(state.relay.subscriber_count(), 1);

    let mut body = response.into_body().into_data_stream();
    let frame = body.next().await.unwrap().unwrap();
    let text = String::from_utf8(frame.to_vec()).unwrap();
    let data = text
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .expect("data line");
    let event = breakdesk_core::ServerEvent::decode(data).unwrap();
    assert_eq!(
        event,
        breakdesk_core::ServerEvent::BreaksUpdated(Breaks::clone(&state.relay.snapshot()))
    );

    drop(body);
    assert_eq!(state.relay.subscriber_count(), 0);
}

#[tokio::test]
async fn sse_stream_ends_on_shutdown() {
    let (state, app) = seeded().await;
    let response = app.clone().oneshot(get("/sse", Some(&auth()))).await.unwrap();
    let mut body = response.into_body().into_data_stream();
    assert!(body.next().await.is_some());

    state.shutdown.cancel();
    let end = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(frame) = body.next().await {
            frame.unwrap();
        }
    })
    .await;
    assert!(end.is_ok(), "stream should end after shutdown");
}
