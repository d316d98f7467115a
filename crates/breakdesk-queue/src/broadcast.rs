// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fan-out of queue snapshots to connected dashboard sessions.
//!
//! Every push carries the whole queue, so a session that misses a push (or
//! reconnects) only needs the next one to be current again.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use breakdesk_core::{Breaks, BreakdeskError};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A delivery target for queue snapshots, typically one SSE response.
#[async_trait]
pub trait SnapshotChannel: Send + Sync {
    /// Push one snapshot. An error means the session is gone.
    async fn deliver(&self, snapshot: Arc<Breaks>) -> Result<(), BreakdeskError>;
}

/// Identifies one registered channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(uuid::Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of one [`Broadcaster::notify`] round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Channels that accepted the snapshot.
    pub delivered: usize,
    /// Channels that failed or timed out and were unregistered.
    pub dropped: Vec<SubscriptionId>,
}

/// The set of registered snapshot channels.
pub struct Broadcaster {
    channels: DashMap<SubscriptionId, Arc<dyn SnapshotChannel>>,
    delivery_timeout: Duration,
}

impl fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("channels", &self.channels.len())
            .field("delivery_timeout", &self.delivery_timeout)
            .finish()
    }
}

impl Broadcaster {
    /// `delivery_timeout` bounds how long one push to one channel may take.
    pub fn new(delivery_timeout: Duration) -> Self {
        Self {
            channels: DashMap::new(),
            delivery_timeout,
        }
    }

    /// Add a channel and push `current` to it right away.
    ///
    /// If that first push fails the channel is not kept.
    pub async fn register(
        &self,
        channel: Arc<dyn SnapshotChannel>,
        current: Arc<Breaks>,
    ) -> Result<SubscriptionId, BreakdeskError> {
        let id = SubscriptionId::new();
        self.deliver_one(id, channel.as_ref(), current).await?;
        self.channels.insert(id, channel);
        debug!(subscription = %id, subscribers = self.channels.len(), "channel registered");
        Ok(id)
    }

    /// Remove a channel. Returns whether it was still registered.
    pub fn unregister(&self, id: SubscriptionId) -> bool {
        let removed = self.channels.remove(&id).is_some();
        if removed {
            debug!(subscription = %id, subscribers = self.channels.len(), "channel unregistered");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.channels.len()
    }

    pub fn is_registered(&self, id: SubscriptionId) -> bool {
        self.channels.contains_key(&id)
    }

    /// Push `snapshot` to every registered channel.
    ///
    /// Deliveries run concurrently over a copy of the channel set. A channel
    /// whose delivery fails or exceeds the timeout is unregistered; the
    /// others are unaffected.
    pub async fn notify(&self, snapshot: Arc<Breaks>) -> DeliveryReport {
        let targets: Vec<(SubscriptionId, Arc<dyn SnapshotChannel>)> = self
            .channels
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();

        let deliveries = targets.iter().map(|(id, channel)| {
            let snapshot = Arc::clone(&snapshot);
            async move { (*id, self.deliver_one(*id, channel.as_ref(), snapshot).await) }
        });

        let mut report = DeliveryReport::default();
        for (id, result) in futures::future::join_all(deliveries).await {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(subscription = %id, error = %e, "dropping dashboard session");
                    self.unregister(id);
                    report.dropped.push(id);
                }
            }
        }
        report
    }

    async fn deliver_one(
        &self,
        id: SubscriptionId,
        channel: &dyn SnapshotChannel,
        snapshot: Arc<Breaks>,
    ) -> Result<(), BreakdeskError> {
        match tokio::time::timeout(self.delivery_timeout, channel.deliver(snapshot)).await {
            Ok(result) => result,
            Err(_) => Err(BreakdeskError::ChannelDelivery {
                subscription: id.to_string(),
                message: format!("no progress within {:?}", self.delivery_timeout),
            }),
        }
    }
}

/// Unregisters its channel when dropped.
///
/// Held by whatever owns the receiving end of a channel (the SSE response
/// stream), so a closed connection leaves the broadcast set immediately.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    broadcaster: Weak<Broadcaster>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, broadcaster: &Arc<Broadcaster>) -> Self {
        Self {
            id,
            broadcaster: Arc::downgrade(broadcaster),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(broadcaster) = self.broadcaster.upgrade() {
            broadcaster.unregister(self.id);
        }
    }
}

/// Snapshot channel backed by a bounded mpsc queue.
///
/// The receiving half is drained by the SSE response; once it is dropped,
/// deliveries fail and the broadcaster forgets the channel.
#[derive(Debug, Clone)]
pub struct MpscSnapshotChannel {
    tx: mpsc::Sender<Arc<Breaks>>,
}

impl MpscSnapshotChannel {
    /// Create a channel holding at most `capacity` undelivered snapshots.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Arc<Breaks>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl SnapshotChannel for MpscSnapshotChannel {
    async fn deliver(&self, snapshot: Arc<Breaks>) -> Result<(), BreakdeskError> {
        self.tx
            .send(snapshot)
            .await
            .map_err(|_| BreakdeskError::ChannelDelivery {
                subscription: "mpsc".to_string(),
                message: "receiver closed".to_string(),
            })
    }
}
