// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `breakdesk serve`: run the gateway with an empty break queue.

use std::sync::Arc;

use breakdesk_config::BreakdeskConfig;
use breakdesk_core::BreakdeskError;
use breakdesk_gateway::{GatewayState, ServerConfig, SseSettings, StaticOperators, start_server};
use breakdesk_queue::BreakRelay;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Build the gateway state described by `config`.
pub fn gateway_state(config: &BreakdeskConfig, shutdown: CancellationToken) -> GatewayState {
    let operators = StaticOperators::new(
        config
            .auth
            .operators
            .iter()
            .map(|op| (op.username.clone(), op.key.clone())),
    );
    if operators.is_empty() {
        warn!("no [[auth.operators]] configured; every dashboard login will be denied");
    }
    if config.ingest.webhook_token.is_none() {
        warn!("ingest.webhook_token is not set; POST /new_order accepts any caller");
    }

    let relay = Arc::new(BreakRelay::new(config.broadcast.delivery_timeout()));
    GatewayState::new(relay, Arc::new(operators))
        .with_webhook_token(config.ingest.webhook_token.clone())
        .with_sse(SseSettings {
            channel_capacity: config.broadcast.channel_capacity,
            keep_alive: config.broadcast.keep_alive(),
        })
        .with_shutdown(shutdown)
}

pub async fn run_serve(
    config: &BreakdeskConfig,
    shutdown: CancellationToken,
) -> Result<(), BreakdeskError> {
    info!(
        operators = config.auth.operators.len(),
        delivery_timeout_ms = config.broadcast.delivery_timeout_ms,
        "starting breakdesk serve"
    );
    let state = gateway_state(config, shutdown);
    let server = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    start_server(&server, state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use breakdesk_config::model::OperatorConfig;

    #[test]
    fn state_carries_broadcast_settings() {
        let mut config = BreakdeskConfig::default();
        config.broadcast.channel_capacity = 3;
        config.broadcast.keep_alive_secs = 7;
        config.ingest.webhook_token = Some("hook".into());
        config.auth.operators = vec![OperatorConfig {
            username: "streamer".into(),
            key: "hunter2".into(),
        }];

        let state = gateway_state(&config, CancellationToken::new());
        assert_eq!(state.sse.channel_capacity, 3);
        assert_eq!(state.sse.keep_alive.as_secs(), 7);
        assert_eq!(state.webhook.token.as_deref(), Some("hook"));
        assert!(state.relay.snapshot().is_empty());
    }
}
