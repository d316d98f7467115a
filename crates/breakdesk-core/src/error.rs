// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for breakdesk.

use thiserror::Error;

use crate::order::OrderNumber;

/// The error type shared by the queue, the gateway and the session client.
#[derive(Debug, Error)]
pub enum BreakdeskError {
    /// Missing or wrong credentials. Never retried automatically.
    #[error("authentication denied")]
    AuthDenied,

    /// The order is already in the queue (re-delivered "order paid" fact).
    #[error("order #{0} is already queued")]
    DuplicateOrder(OrderNumber),

    /// No pending break for the order.
    #[error("no pending break for order #{0}")]
    NotFound(OrderNumber),

    /// A patch that cannot be applied to the targeted break.
    #[error("invalid patch for order #{order_number}: {reason}")]
    InvalidPatch {
        order_number: OrderNumber,
        reason: String,
    },

    /// Pushing a snapshot to one dashboard session failed.
    #[error("delivery to subscription {subscription} failed: {message}")]
    ChannelDelivery {
        subscription: String,
        message: String,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Transport-level HTTP failures and unexpected status codes.
    #[error("http error: {message}")]
    Http {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A message on the push stream that could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Configuration errors (invalid values, unusable header values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Local persistence errors (credential file).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BreakdeskError {
    /// Whether the session client may retry after this error.
    ///
    /// Authentication failures and rejected commands are final.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BreakdeskError::Http { .. }
                | BreakdeskError::Timeout { .. }
                | BreakdeskError::Protocol(_)
                | BreakdeskError::ChannelDelivery { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_order_number() {
        let err = BreakdeskError::NotFound(OrderNumber::new(10019));
        assert_eq!(err.to_string(), "no pending break for order #10019");

        let err = BreakdeskError::DuplicateOrder(OrderNumber::new(7));
        assert!(err.to_string().contains("#7"));
    }

    #[test]
    fn auth_and_command_errors_are_final() {
        assert!(!BreakdeskError::AuthDenied.is_retryable());
        assert!(!BreakdeskError::NotFound(OrderNumber::new(1)).is_retryable());
        assert!(
            !BreakdeskError::InvalidPatch {
                order_number: OrderNumber::new(1),
                reason: "bad".into(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn transport_errors_are_retryable() {
        let http = BreakdeskError::Http {
            message: "connection reset".into(),
            source: None,
        };
        assert!(http.is_retryable());
        assert!(
            BreakdeskError::Timeout {
                duration: std::time::Duration::from_secs(1)
            }
            .is_retryable()
        );
    }
}
