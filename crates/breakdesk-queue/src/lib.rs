// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-authoritative break queue and its snapshot broadcaster.
//!
//! - [`BreakQueue`] holds pending breaks in arrival order.
//! - [`Broadcaster`] pushes full snapshots to registered session channels.
//! - [`BreakRelay`] couples the two: one broadcast per successful mutation.

pub mod broadcast;
pub mod queue;
pub mod relay;

pub use broadcast::{
    Broadcaster, DeliveryReport, MpscSnapshotChannel, SnapshotChannel, Subscription,
    SubscriptionId,
};
pub use queue::BreakQueue;
pub use relay::BreakRelay;
