// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One operator's dashboard session.
//!
//! A [`Session`] owns the operator credentials, the login and push channel
//! state, and the local view of the queue. The view is only ever replaced
//! wholesale by a snapshot from the server: commands go out over HTTP and
//! their effect comes back through the push stream like everyone else's.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use breakdesk_core::{BreakPatch, Breaks, BreakdeskError, Credentials, OrderNumber, ServerEvent};
use futures::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::GatewayClient;
use crate::backoff::Backoff;
use crate::state::{ChannelState, LoginState, SessionStatus};

/// Reconnect delay bounds for [`Session::run_stream`].
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(30),
        }
    }
}

pub struct Session {
    api: GatewayClient,
    credentials: Mutex<Option<Credentials>>,
    status: watch::Sender<SessionStatus>,
    view: watch::Sender<Arc<Breaks>>,
    reconnect: ReconnectPolicy,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.api.base_url())
            .field("status", &*self.status.borrow())
            .field("pending", &self.view.borrow().len())
            .finish()
    }
}

impl Session {
    pub fn new(api: GatewayClient, reconnect: ReconnectPolicy) -> Self {
        Self {
            api,
            credentials: Mutex::new(None),
            status: watch::Sender::new(SessionStatus::default()),
            view: watch::Sender::new(Arc::new(Breaks::empty())),
            reconnect,
        }
    }

    /// Verify `credentials` against the server and keep them on success.
    ///
    /// Ignored while a login is in flight or the session is already logged
    /// in. A rejected login leaves the session logged out with the reason in
    /// [`SessionStatus::last_error`].
    pub async fn login(&self, credentials: Credentials) -> Result<(), BreakdeskError> {
        let started = self.status.send_if_modified(|status| {
            if status.login != LoginState::LoggedOut {
                return false;
            }
            status.login = LoginState::Authenticating;
            status.last_error = None;
            true
        });
        if !started {
            debug!(state = %self.status.borrow().login, "login ignored");
            return Ok(());
        }

        let attempt = LoginAttempt {
            status: &self.status,
            settled: false,
        };
        let result = self.api.login(&credentials).await;
        attempt.settle();

        match result {
            Ok(()) => {
                info!(username = %credentials.username, "logged in");
                *self.credentials_slot() = Some(credentials);
                self.status.send_modify(|status| status.login = LoginState::LoggedIn);
                Ok(())
            }
            Err(e) => {
                warn!(username = %credentials.username, error = %e, "login failed");
                self.mark_logged_out(&e);
                Err(e)
            }
        }
    }

    /// Forget the credentials. An open push stream is not interrupted; it
    /// ends the next time the server rejects it.
    pub fn logout(&self) {
        self.credentials_slot().take();
        self.status.send_modify(|status| {
            status.login = LoginState::LoggedOut;
            status.last_error = None;
        });
        info!("logged out");
    }

    /// Open the push stream once and follow it until it ends.
    ///
    /// Each snapshot replaces the local view. Returns `Ok` when the server
    /// closes the stream; a rejection logs the session out.
    pub async fn connect_stream(&self) -> Result<(), BreakdeskError> {
        let mut connected = false;
        self.follow_stream(&mut connected).await
    }

    /// Keep the push stream open until `cancel` fires.
    ///
    /// Dropped connections are retried with exponential backoff; the delay
    /// resets after any connection that was accepted. A rejection (or any
    /// other error that retrying cannot fix) ends the loop.
    pub async fn run_stream(&self, cancel: CancellationToken) -> Result<(), BreakdeskError> {
        let mut backoff = Backoff::new(self.reconnect.initial, self.reconnect.max);
        loop {
            let mut connected = false;
            let result = tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                result = self.follow_stream(&mut connected) => result,
            };

            if connected {
                backoff.reset();
            }
            match result {
                Ok(()) => info!("push stream closed by server"),
                Err(e) if e.is_retryable() => warn!(error = %e, "push stream failed"),
                Err(e) => return Err(e),
            }

            let delay = backoff.next_delay();
            info!(delay_ms = delay.as_millis() as u64, "reconnecting push stream");
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Ask the server to mark a break done. The view changes when the
    /// resulting snapshot arrives.
    pub async fn complete_order(&self, order_number: OrderNumber) -> Result<(), BreakdeskError> {
        let credentials = self.require_credentials()?;
        let result = self.api.complete_order(&credentials, order_number).await;
        self.observe(result, order_number, "completion sent")
    }

    /// Ask the server to patch a break. The view changes when the resulting
    /// snapshot arrives.
    pub async fn update_order(
        &self,
        order_number: OrderNumber,
        patch: &BreakPatch,
    ) -> Result<(), BreakdeskError> {
        let credentials = self.require_credentials()?;
        let result = self.api.update_order(&credentials, order_number, patch).await;
        self.observe(result, order_number, "update sent")
    }

    /// Fetch the queue over plain HTTP and replace the view with it.
    pub async fn refresh(&self) -> Result<Arc<Breaks>, BreakdeskError> {
        let credentials = self.require_credentials()?;
        match self.api.all_orders(&credentials).await {
            Ok(breaks) => {
                let breaks = Arc::new(breaks);
                self.view.send_replace(Arc::clone(&breaks));
                Ok(breaks)
            }
            Err(e) => {
                if matches!(e, BreakdeskError::AuthDenied) {
                    self.reject_credentials(&e);
                }
                Err(e)
            }
        }
    }

    /// Receiver for the local queue view.
    pub fn view(&self) -> watch::Receiver<Arc<Breaks>> {
        self.view.subscribe()
    }

    /// Receiver for login and stream state.
    pub fn status(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// The local queue view right now.
    pub fn current(&self) -> Arc<Breaks> {
        Arc::clone(&self.view.borrow())
    }

    pub fn is_logged_in(&self) -> bool {
        self.status.borrow().login == LoginState::LoggedIn
    }

    async fn follow_stream(&self, connected: &mut bool) -> Result<(), BreakdeskError> {
        let credentials = self.require_credentials()?;
        let _channel = ChannelGuard::enter(&self.status);

        let result = self.stream_snapshots(&credentials, connected).await;
        if let Err(e @ BreakdeskError::AuthDenied) = &result {
            self.reject_credentials(e);
        }
        result
    }

    async fn stream_snapshots(
        &self,
        credentials: &Credentials,
        connected: &mut bool,
    ) -> Result<(), BreakdeskError> {
        let mut events = self.api.open_stream(credentials).await?;
        *connected = true;
        self.status
            .send_modify(|status| status.channel = ChannelState::Connected);
        info!("push stream connected");

        while let Some(event) = events.next().await {
            match event? {
                ServerEvent::BreaksUpdated(breaks) => {
                    debug!(pending = breaks.len(), "snapshot received");
                    self.view.send_replace(Arc::new(breaks));
                }
                ServerEvent::Unknown(key) => debug!(event = %key, "ignoring push event"),
            }
        }
        Ok(())
    }

    fn observe(
        &self,
        result: Result<(), BreakdeskError>,
        order_number: OrderNumber,
        message: &str,
    ) -> Result<(), BreakdeskError> {
        match &result {
            Ok(()) => info!(order_number = %order_number, "{message}"),
            Err(e @ BreakdeskError::AuthDenied) => self.reject_credentials(e),
            Err(e) => warn!(order_number = %order_number, error = %e, "command failed"),
        }
        result
    }

    fn require_credentials(&self) -> Result<Credentials, BreakdeskError> {
        self.credentials_slot()
            .clone()
            .ok_or(BreakdeskError::AuthDenied)
    }

    fn reject_credentials(&self, error: &BreakdeskError) {
        warn!(error = %error, "credentials rejected; logging out");
        self.credentials_slot().take();
        self.mark_logged_out(error);
    }

    fn mark_logged_out(&self, error: &BreakdeskError) {
        self.status.send_modify(|status| {
            status.login = LoginState::LoggedOut;
            status.last_error = Some(error.to_string());
        });
    }

    fn credentials_slot(&self) -> std::sync::MutexGuard<'_, Option<Credentials>> {
        self.credentials.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns the session to `LoggedOut` if a login is abandoned mid-flight.
struct LoginAttempt<'a> {
    status: &'a watch::Sender<SessionStatus>,
    settled: bool,
}

impl LoginAttempt<'_> {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for LoginAttempt<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.status.send_if_modified(|status| {
                let abandoned = status.login == LoginState::Authenticating;
                if abandoned {
                    status.login = LoginState::LoggedOut;
                }
                abandoned
            });
        }
    }
}

/// Marks the channel `Connecting` while alive and `Disconnected` once gone.
struct ChannelGuard<'a> {
    status: &'a watch::Sender<SessionStatus>,
}

impl<'a> ChannelGuard<'a> {
    fn enter(status: &'a watch::Sender<SessionStatus>) -> Self {
        status.send_modify(|status| status.channel = ChannelState::Connecting);
        Self { status }
    }
}

impl Drop for ChannelGuard<'_> {
    fn drop(&mut self) {
        self.status
            .send_modify(|status| status.channel = ChannelState::Disconnected);
    }
}
