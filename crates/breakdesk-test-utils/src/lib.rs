// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Breakdesk integration tests.
//!
//! Provides mock snapshot channels and order fixtures for fast,
//! deterministic tests without a storefront or a browser.
//!
//! # Components
//!
//! - [`MockChannel`] - Snapshot channel that records every delivery
//! - [`fixtures`] - Storefront orders and webhook payloads

pub mod fixtures;
pub mod mock_channel;

pub use mock_channel::{ChannelBehavior, MockChannel};
