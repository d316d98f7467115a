// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push stream envelope.
//!
//! Every SSE message is a JSON object whose key names the event:
//!
//! ```json
//! {"BreaksUpdated": {"ordered_breaks": [...]}}
//! ```
//!
//! Decoders dispatch on the first key they know and ignore the rest, so the
//! envelope can grow sibling keys. A message with no known key is surfaced
//! as [`ServerEvent::Unknown`] so older dashboards keep working when new
//! events are added.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::breaks::Breaks;
use crate::error::BreakdeskError;

/// Envelope key for a full queue snapshot.
pub const BREAKS_UPDATED: &str = "BreaksUpdated";

/// A decoded push stream message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// The whole pending queue. Replaces the receiver's view.
    BreaksUpdated(Breaks),
    /// An event this build does not understand, by envelope key.
    Unknown(String),
}

#[derive(Serialize)]
enum Outgoing<'a> {
    BreaksUpdated(&'a Breaks),
}

impl ServerEvent {
    /// Encode a snapshot push without cloning the queue.
    pub fn encode_breaks_updated(breaks: &Breaks) -> Result<String, BreakdeskError> {
        serde_json::to_string(&Outgoing::BreaksUpdated(breaks))
            .map_err(|e| BreakdeskError::Internal(format!("failed to encode snapshot: {e}")))
    }

    /// Decode one message body.
    pub fn decode(data: &str) -> Result<Self, BreakdeskError> {
        let mut envelope: Map<String, Value> = serde_json::from_str(data)
            .map_err(|e| BreakdeskError::Protocol(format!("event is not a JSON object: {e}")))?;

        if let Some(payload) = envelope.remove(BREAKS_UPDATED) {
            return serde_json::from_value(payload)
                .map(ServerEvent::BreaksUpdated)
                .map_err(|e| BreakdeskError::Protocol(format!("bad {BREAKS_UPDATED} payload: {e}")));
        }

        envelope
            .into_iter()
            .next()
            .map(|(key, _)| ServerEvent::Unknown(key))
            .ok_or_else(|| BreakdeskError::Protocol("empty event envelope".into()))
    }
}
