// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `GET /sse`: the dashboard's snapshot stream.
//!
//! Each message is a single-key JSON envelope:
//!
//! ```text
//! data: {"BreaksUpdated":{"ordered_breaks":[...]}}
//! ```
//!
//! The first message is the queue at connection time. The stream ends when
//! the client disconnects (which unregisters its channel), when the session
//! is dropped for falling behind, or on server shutdown.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Extension,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use breakdesk_core::{Breaks, ServerEvent};
use breakdesk_queue::MpscSnapshotChannel;
use futures::stream::{self, Stream, StreamExt};

use crate::auth::Operator;
use crate::handlers::ApiError;
use crate::server::GatewayState;

/// GET /sse
pub async fn sse_handler(
    State(state): State<GatewayState>,
    Extension(operator): Extension<Operator>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let (channel, rx) = MpscSnapshotChannel::new(state.sse.channel_capacity);
    let subscription = state.relay.subscribe(Arc::new(channel)).await?;
    tracing::info!(
        operator = %operator.0,
        subscription = %subscription.id(),
        "dashboard session opened"
    );

    // The subscription travels with the receiver: dropping the response
    // stream unregisters the channel.
    let events = stream::unfold((rx, subscription), |(mut rx, subscription)| async move {
        let snapshot = rx.recv().await?;
        Some((Ok(snapshot_event(&snapshot)), (rx, subscription)))
    })
    .take_until(state.shutdown.clone().cancelled_owned());

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(state.sse.keep_alive)))
}

fn snapshot_event(breaks: &Breaks) -> Event {
    match ServerEvent::encode_breaks_updated(breaks) {
        Ok(json) => Event::default().data(json),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode snapshot");
            Event::default().comment("snapshot unavailable")
        }
    }
}

