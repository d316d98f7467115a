// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push stream parser.
//!
//! Converts the `/sse` response body into [`ServerEvent`]s using the
//! `eventsource-stream` crate for SSE framing. Keep-alive comments never
//! surface as events; messages that fail to decode are logged and skipped.

use breakdesk_core::{BreakdeskError, ServerEvent};
use eventsource_stream::Eventsource;
use futures::stream::StreamExt;

use crate::api::EventStream;

pub fn parse_event_stream(response: reqwest::Response) -> EventStream {
    let events = response.bytes_stream().eventsource().filter_map(|result| async move {
        match result {
            Ok(event) if event.data.trim().is_empty() => None,
            Ok(event) => match ServerEvent::decode(&event.data) {
                Ok(decoded) => Some(Ok(decoded)),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping undecodable push message");
                    None
                }
            },
            Err(e) => Some(Err(BreakdeskError::Http {
                message: format!("push stream error: {e}"),
                source: None,
            })),
        }
    });

    Box::pin(events)
}
