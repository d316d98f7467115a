// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock snapshot channel for deterministic testing.
//!
//! `MockChannel` implements `SnapshotChannel` and captures every snapshot it
//! is handed, so tests can count broadcasts per mutation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use breakdesk_core::{Breaks, BreakdeskError};
use breakdesk_queue::SnapshotChannel;

/// How a [`MockChannel`] responds to deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelBehavior {
    /// Record the snapshot and succeed.
    Accept = 0,
    /// Fail as if the connection had closed.
    Fail = 1,
    /// Never complete the delivery.
    Stall = 2,
}

impl ChannelBehavior {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Fail,
            2 => Self::Stall,
            _ => Self::Accept,
        }
    }
}

/// A mock session channel for testing.
///
/// Clones share the same capture buffer, so a test can keep one handle and
/// register another.
#[derive(Clone)]
pub struct MockChannel {
    received: Arc<Mutex<Vec<Arc<Breaks>>>>,
    behavior: Arc<AtomicU8>,
}

impl MockChannel {
    /// Create a mock channel that accepts every delivery.
    pub fn new() -> Self {
        Self::with_behavior(ChannelBehavior::Accept)
    }

    pub fn with_behavior(behavior: ChannelBehavior) -> Self {
        Self {
            received: Arc::new(Mutex::new(Vec::new())),
            behavior: Arc::new(AtomicU8::new(behavior as u8)),
        }
    }

    /// Change how later deliveries are handled.
    pub fn set_behavior(&self, behavior: ChannelBehavior) {
        self.behavior.store(behavior as u8, Ordering::SeqCst);
    }

    /// Get every snapshot delivered so far.
    pub async fn received(&self) -> Vec<Arc<Breaks>> {
        self.received.lock().await.clone()
    }

    /// Get the count of delivered snapshots.
    pub async fn received_count(&self) -> usize {
        self.received.lock().await.len()
    }

    /// The most recent snapshot, if any.
    pub async fn last(&self) -> Option<Arc<Breaks>> {
        self.received.lock().await.last().cloned()
    }

    /// Clear captured snapshots.
    pub async fn clear(&self) {
        self.received.lock().await.clear();
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotChannel for MockChannel {
    async fn deliver(&self, snapshot: Arc<Breaks>) -> Result<(), BreakdeskError> {
        match ChannelBehavior::from_u8(self.behavior.load(Ordering::SeqCst)) {
            ChannelBehavior::Accept => {
                self.received.lock().await.push(snapshot);
                Ok(())
            }
            ChannelBehavior::Fail => Err(BreakdeskError::ChannelDelivery {
                subscription: "mock".to_string(),
                message: "connection closed".to_string(),
            }),
            ChannelBehavior::Stall => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deliver_captures_snapshots() {
        let channel = MockChannel::new();
        channel.deliver(Arc::new(Breaks::empty())).await.unwrap();
        channel.deliver(Arc::new(Breaks::empty())).await.unwrap();
        assert_eq!(channel.received_count().await, 2);
        assert_eq!(*channel.last().await.unwrap(), Breaks::empty());
    }

    #[tokio::test]
    async fn clones_share_capture_buffer() {
        let channel = MockChannel::new();
        let handle = channel.clone();
        channel.deliver(Arc::new(Breaks::empty())).await.unwrap();
        assert_eq!(handle.received_count().await, 1);
        handle.clear().await;
        assert_eq!(channel.received_count().await, 0);
    }

    #[tokio::test]
    async fn failing_channel_records_nothing() {
        let channel = MockChannel::with_behavior(ChannelBehavior::Fail);
        let err = channel.deliver(Arc::new(Breaks::empty())).await.unwrap_err();
        assert!(matches!(err, BreakdeskError::ChannelDelivery { .. }));
        assert_eq!(channel.received_count().await, 0);

        channel.set_behavior(ChannelBehavior::Accept);
        channel.deliver(Arc::new(Breaks::empty())).await.unwrap();
        assert_eq!(channel.received_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_channel_never_completes() {
        let channel = MockChannel::with_behavior(ChannelBehavior::Stall);
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            channel.deliver(Arc::new(Breaks::empty())),
        )
        .await;
        assert!(result.is_err());
    }
}
