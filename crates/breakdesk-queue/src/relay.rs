// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue mutations coupled to their broadcast.
//!
//! [`BreakRelay`] is the single owner of the break queue for a running
//! server. Each successful mutation is followed by exactly one broadcast of
//! the resulting snapshot; a failed mutation broadcasts nothing. Mutations
//! and their broadcasts are serialized, so sessions receive snapshots in
//! commit order and a subscriber registered between two mutations sees the
//! queue as of the first one before it sees the second.

use std::sync::Arc;
use std::time::Duration;

use breakdesk_core::{BreakPatch, Breaks, BreakdeskError, Order, OrderNumber};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::broadcast::{Broadcaster, DeliveryReport, SnapshotChannel, Subscription};
use crate::queue::BreakQueue;

/// Break queue plus the sessions watching it.
#[derive(Debug)]
pub struct BreakRelay {
    queue: BreakQueue,
    broadcaster: Arc<Broadcaster>,
    commit: Mutex<()>,
}

impl BreakRelay {
    /// An empty relay whose deliveries are bounded by `delivery_timeout`.
    pub fn new(delivery_timeout: Duration) -> Self {
        Self::with_queue(BreakQueue::new(), delivery_timeout)
    }

    pub fn with_queue(queue: BreakQueue, delivery_timeout: Duration) -> Self {
        Self {
            queue,
            broadcaster: Arc::new(Broadcaster::new(delivery_timeout)),
            commit: Mutex::new(()),
        }
    }

    /// Queue a paid order and broadcast.
    ///
    /// A redelivered order fails with [`BreakdeskError::DuplicateOrder`] and
    /// is not broadcast.
    pub async fn ingest(&self, order: Order) -> Result<DeliveryReport, BreakdeskError> {
        let _guard = self.commit.lock().await;
        let id = self.queue.insert(order)?;
        info!(order_number = %id, "break queued");
        Ok(self.broadcast().await)
    }

    /// Patch a pending break and broadcast.
    pub async fn update(
        &self,
        id: OrderNumber,
        patch: &BreakPatch,
    ) -> Result<DeliveryReport, BreakdeskError> {
        let _guard = self.commit.lock().await;
        self.queue.update(id, patch)?;
        info!(order_number = %id, "break updated");
        Ok(self.broadcast().await)
    }

    /// Remove a break from the pending queue and broadcast.
    ///
    /// An absent break fails with [`BreakdeskError::NotFound`] and is not
    /// broadcast; callers that treat completion as idempotent swallow it.
    pub async fn complete(&self, id: OrderNumber) -> Result<DeliveryReport, BreakdeskError> {
        let _guard = self.commit.lock().await;
        self.queue.complete(id)?;
        info!(order_number = %id, "break completed");
        Ok(self.broadcast().await)
    }

    /// Register a session channel. It receives the current snapshot before
    /// any later mutation is broadcast.
    ///
    /// The returned guard unregisters the channel when dropped.
    pub async fn subscribe(
        &self,
        channel: Arc<dyn SnapshotChannel>,
    ) -> Result<Subscription, BreakdeskError> {
        let _guard = self.commit.lock().await;
        let id = self
            .broadcaster
            .register(channel, self.queue.snapshot())
            .await?;
        Ok(Subscription::new(id, &self.broadcaster))
    }

    pub fn snapshot(&self) -> Arc<Breaks> {
        self.queue.snapshot()
    }

    pub fn queue(&self) -> &BreakQueue {
        &self.queue
    }

    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    pub fn subscriber_count(&self) -> usize {
        self.broadcaster.subscriber_count()
    }

    async fn broadcast(&self) -> DeliveryReport {
        let report = self.broadcaster.notify(self.queue.snapshot()).await;
        debug!(
            delivered = report.delivered,
            dropped = report.dropped.len(),
            "snapshot broadcast"
        );
        report
    }
}
