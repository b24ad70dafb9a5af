//! Connection construction under the retry discipline
//!
//! Logging in can fail transiently too, typically while the remote host is
//! restarting. The factory retries construction as a unit with its own
//! failure vocabulary (see [`ConstructionClassifier`]).
//!
//! The factory holds no connector lock. Deciding which handle a connector
//! keeps belongs to the connector.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hostlink_common::{
    BackoffSchedule, ErrorClassification, ErrorSeverity, RetryError, RetryExecutor, Sleeper,
};
use hostlink_domain::{ConnectorError, ConnectorResult, Identity};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use super::handle::ConnectionHandle;
use super::ports::Transport;
use crate::classify::ConstructionClassifier;
use crate::guard::ThreadAffinityGuard;

/// Builds authenticated [`ConnectionHandle`]s, retrying transient failures
pub struct ResilientConnectorFactory {
    transport: Arc<dyn Transport>,
    guard: ThreadAffinityGuard,
    retry: RetryExecutor<ConstructionClassifier>,
    generations: AtomicU64,
}

impl ResilientConnectorFactory {
    /// Create a factory with the standard schedule and no thread restriction.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            guard: ThreadAffinityGuard::default(),
            retry: RetryExecutor::new(BackoffSchedule::standard(), ConstructionClassifier),
            generations: AtomicU64::new(0),
        }
    }

    /// Replace the construction retry schedule.
    #[must_use]
    pub fn with_schedule(mut self, schedule: BackoffSchedule) -> Self {
        self.retry = RetryExecutor::new(schedule, ConstructionClassifier);
        self
    }

    /// Replace the guard checked before every login.
    #[must_use]
    pub fn with_guard(mut self, guard: ThreadAffinityGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Replace the sleeper used for backoff waits.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.retry = self.retry.with_sleeper(sleeper);
        self
    }

    /// Guard shared with connectors built on this factory.
    pub const fn guard(&self) -> &ThreadAffinityGuard {
        &self.guard
    }

    /// Schedule of the construction retry loop.
    pub const fn schedule(&self) -> &BackoffSchedule {
        self.retry.schedule()
    }

    /// Generation of the most recently built handle, `0` before the first.
    pub fn last_generation(&self) -> u64 {
        self.generations.load(Ordering::Acquire)
    }

    /// Connect and log in as `identity`.
    ///
    /// # Errors
    /// - `ForbiddenContext` if the guard rejects the calling thread
    /// - `Validation` for an incomplete identity (never retried)
    /// - The last transport error once retries are exhausted, unchanged
    pub async fn new_connection(&self, identity: &Identity) -> ConnectorResult<ConnectionHandle> {
        self.new_connection_with_cancel(identity, &CancellationToken::new()).await
    }

    /// [`new_connection`](Self::new_connection) with cooperative
    /// cancellation.
    ///
    /// # Errors
    /// As `new_connection`, plus `Cancelled` when `cancel` fires before an
    /// attempt or during a backoff wait.
    #[instrument(skip(self, cancel), fields(identity = %identity))]
    pub async fn new_connection_with_cancel(
        &self,
        identity: &Identity,
        cancel: &CancellationToken,
    ) -> ConnectorResult<ConnectionHandle> {
        self.guard.assert_allowed("new_connection")?;
        identity.validate()?;

        let outcome = self
            .retry
            .execute_with_outcome(true, cancel, || self.transport.connect(identity))
            .await;
        let attempts = outcome.attempts;

        match outcome.result {
            Ok(session) => {
                let generation = self.generations.fetch_add(1, Ordering::AcqRel) + 1;
                let handle = ConnectionHandle::new(generation, identity.clone(), session);
                info!(
                    generation,
                    attempts,
                    session_id = %handle.session().session_id(),
                    "connection established"
                );
                Ok(handle)
            }
            Err(RetryError::Failed { source, attempts, classification }) => {
                let severity = source.severity();
                if severity >= ErrorSeverity::Error {
                    error!(attempts, %classification, %severity, error = %source, "connection failed");
                } else {
                    warn!(attempts, %classification, %severity, error = %source, "connection failed");
                }
                Err(source)
            }
            Err(RetryError::Cancelled { phase, last_error, .. }) => {
                Err(ConnectorError::cancelled("new_connection", phase, last_error))
            }
        }
    }
}

impl std::fmt::Debug for ResilientConnectorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientConnectorFactory")
            .field("retry", &self.retry)
            .field("guard", &self.guard)
            .field("last_generation", &self.last_generation())
            .finish_non_exhaustive()
    }
}
