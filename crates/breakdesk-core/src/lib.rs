// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for breakdesk.
//!
//! This crate provides the storefront order model, the break queue snapshot
//! type, the push stream envelope, operator credentials, and the error type
//! shared by every other crate in the workspace.

pub mod breaks;
pub mod credentials;
pub mod error;
pub mod event;
pub mod order;

// Re-export key items at crate root for ergonomic imports.
pub use breaks::{Break, BreakPatch, Breaks, LineItemNote, MAX_HANDLE_LEN};
pub use credentials::Credentials;
pub use error::BreakdeskError;
pub use event::ServerEvent;
pub use order::{Order, OrderLineItem, OrderNumber};
