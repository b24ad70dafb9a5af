//! The resilient connector
//!
//! Every remote call made by an entity service goes through
//! [`ResilientConnector::invoke`]. The connector also owns the single
//! connection slot those services share, and the lock that serialises
//! (re)establishing it.
//!
//! Lock discipline: the slot lock is held while checking for, and possibly
//! building, a connection. It is never held across a business call.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hostlink_common::{
    BackoffSchedule, CancelPhase, FailureClassification, RetryError, RetryExecutor, RetryOutcome,
    Sleeper,
};
use hostlink_domain::{ConnectorConfig, ConnectorError, ConnectorResult, Identity};
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::binding::{LazyBoundService, TableBinder};
use crate::classify::CallClassifier;
use crate::connection::{ConnectionHandle, ResilientConnectorFactory, Transport};
use crate::guard::ThreadAffinityGuard;

/// Generation value meaning "no live connection".
const DISCONNECTED: u64 = 0;

/// Shared client for one identity
///
/// Cheap to share behind an `Arc`; any number of tasks may call into it
/// concurrently. Retry attempts of a single `invoke` are strictly
/// sequential; unrelated calls are not serialised.
pub struct ResilientConnector {
    identity: Identity,
    factory: Arc<ResilientConnectorFactory>,
    guard: ThreadAffinityGuard,
    retry: RetryExecutor<CallClassifier>,
    slot: Mutex<Option<Arc<ConnectionHandle>>>,
    generation: AtomicU64,
    shutdown: CancellationToken,
}

impl ResilientConnector {
    /// Create a connector. No connection is made until first use.
    pub fn new(identity: Identity, factory: Arc<ResilientConnectorFactory>) -> Self {
        let guard = factory.guard().clone();
        Self {
            identity,
            factory,
            guard,
            retry: RetryExecutor::new(BackoffSchedule::standard(), CallClassifier),
            slot: Mutex::new(None),
            generation: AtomicU64::new(DISCONNECTED),
            shutdown: CancellationToken::new(),
        }
    }

    /// Build a connector and its factory from loaded configuration.
    ///
    /// # Errors
    /// Returns `Validation` or `Config` errors from
    /// [`ConnectorConfig::validate`].
    pub fn from_config(config: &ConnectorConfig, transport: Arc<dyn Transport>) -> ConnectorResult<Self> {
        config.validate()?;
        let schedule = config.retry.schedule()?;
        let guard = if config.guard.forbid_main_thread {
            ThreadAffinityGuard::forbid_current_thread()
        } else {
            ThreadAffinityGuard::allow_all()
        };
        let factory = ResilientConnectorFactory::new(transport)
            .with_schedule(schedule.clone())
            .with_guard(guard);
        Ok(Self::new(config.identity.clone(), Arc::new(factory)).with_schedule(schedule))
    }

    /// Replace the retry schedule for routed calls.
    #[must_use]
    pub fn with_schedule(mut self, schedule: BackoffSchedule) -> Self {
        self.retry = RetryExecutor::new(schedule, CallClassifier);
        self
    }

    /// Replace the guard checked by every public remote operation.
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

    /// Identity every connection is opened with.
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Guard for this connector's own operations.
    pub const fn guard(&self) -> &ThreadAffinityGuard {
        &self.guard
    }

    /// Schedule of the routed-call retry loop.
    pub const fn schedule(&self) -> &BackoffSchedule {
        self.retry.schedule()
    }

    /// Factory used to (re)connect.
    pub fn factory(&self) -> &Arc<ResilientConnectorFactory> {
        &self.factory
    }

    /// Token cancelled by [`shutdown`](Self::shutdown).
    ///
    /// Per-call tokens passed to the `*_with_cancel` methods should be
    /// children of this one so shutdown reaches them too.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Run `call` under the retry loop.
    ///
    /// `call` performs exactly one attempt of the remote work each time it
    /// is invoked. With `allow_retry == false` it is still invoked once.
    /// `operation` names the call in logs and errors.
    ///
    /// # Errors
    /// - `ForbiddenContext` before any attempt if the guard objects
    /// - The last error observed, unchanged, when the loop gives up
    /// - `Cancelled` after [`shutdown`](Self::shutdown)
    pub async fn invoke<T, F, Fut>(&self, operation: &str, allow_retry: bool, call: F) -> ConnectorResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ConnectorResult<T>>,
    {
        self.invoke_with_cancel(operation, allow_retry, &self.shutdown, call).await
    }

    /// [`invoke`](Self::invoke) observing a caller-supplied token.
    ///
    /// # Errors
    /// As `invoke`, plus `Cancelled` when `cancel` fires before an attempt
    /// or during a backoff wait.
    pub async fn invoke_with_cancel<T, F, Fut>(
        &self,
        operation: &str,
        allow_retry: bool,
        cancel: &CancellationToken,
        call: F,
    ) -> ConnectorResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ConnectorResult<T>>,
    {
        let outcome = self.invoke_with_outcome(operation, allow_retry, cancel, call).await;
        if outcome.attempts > 1 {
            debug!(
                operation,
                attempts = outcome.attempts,
                total_delay_ms = u64::try_from(outcome.total_delay.as_millis()).unwrap_or(u64::MAX),
                average_delay_ms = u64::try_from(outcome.average_delay().as_millis()).unwrap_or(u64::MAX),
                "invoke finished after retries"
            );
        }
        match outcome.result {
            Ok(value) => Ok(value),
            Err(RetryError::Failed { source, .. }) => Err(source),
            Err(RetryError::Cancelled { phase, last_error, .. }) => {
                Err(ConnectorError::cancelled(operation, phase, last_error))
            }
        }
    }

    /// [`invoke_with_cancel`](Self::invoke_with_cancel) returning attempt
    /// statistics alongside the raw loop result.
    #[instrument(skip(self, cancel, call), fields(identity = %self.identity))]
    pub async fn invoke_with_outcome<T, F, Fut>(
        &self,
        operation: &str,
        allow_retry: bool,
        cancel: &CancellationToken,
        call: F,
    ) -> RetryOutcome<T, ConnectorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ConnectorResult<T>>,
    {
        if let Err(source) = self.guard.assert_allowed(operation) {
            return RetryOutcome {
                result: Err(RetryError::Failed {
                    source,
                    attempts: 0,
                    classification: FailureClassification::ImmediatelyFatal,
                }),
                attempts: 0,
                total_delay: Duration::ZERO,
            };
        }
        if self.shutdown.is_cancelled() {
            return RetryOutcome {
                result: Err(RetryError::Cancelled {
                    phase: CancelPhase::BeforeAttempt,
                    attempts: 0,
                    last_error: None,
                }),
                attempts: 0,
                total_delay: Duration::ZERO,
            };
        }

        self.retry.execute_with_outcome(allow_retry, cancel, call).await
    }

    /// The current connection, establishing one if there is none.
    ///
    /// # Errors
    /// `ForbiddenContext`, or any error from
    /// [`ResilientConnectorFactory::new_connection`].
    pub async fn connection(&self) -> ConnectorResult<Arc<ConnectionHandle>> {
        self.guard.assert_allowed("connection")?;
        let mut slot = self.lock_slot().await;
        slot.handle_or_connect(&self.shutdown).await
    }

    /// Generation of the live connection, if any. Lock-free.
    pub fn current_generation(&self) -> Option<u64> {
        match self.generation.load(Ordering::Acquire) {
            DISCONNECTED => None,
            generation => Some(generation),
        }
    }

    /// `true` while a connection is held. Lock-free.
    pub fn is_connected(&self) -> bool {
        self.current_generation().is_some()
    }

    /// Drop the connection if it is still `generation`.
    ///
    /// Returns `false` when a newer connection (or none) is already in
    /// place, so concurrent callers that saw the same failure reconnect
    /// only once. Every binding built on `generation` becomes unbound.
    pub async fn invalidate(&self, generation: u64) -> bool {
        let mut slot = self.slot.lock().await;
        match slot.as_ref() {
            Some(handle) if handle.generation() == generation => {
                *slot = None;
                self.generation.store(DISCONNECTED, Ordering::Release);
                info!(generation, identity = %self.identity, "connection invalidated");
                true
            }
            _ => false,
        }
    }

    /// Close the current session and unbind every service.
    ///
    /// # Errors
    /// `ForbiddenContext` from the guard, with the connection left in
    /// place. Otherwise propagates the session's close error; the connector
    /// is disconnected either way.
    pub async fn disconnect(&self) -> ConnectorResult<()> {
        self.guard.assert_allowed("disconnect")?;
        let handle = {
            let mut slot = self.slot.lock().await;
            self.generation.store(DISCONNECTED, Ordering::Release);
            slot.take()
        };
        let Some(handle) = handle else {
            return Ok(());
        };

        info!(generation = handle.generation(), identity = %self.identity, "disconnecting");
        handle.session().close().await.inspect_err(|err| {
            warn!(generation = handle.generation(), error = %err, "session close failed");
        })
    }

    /// Cancel every in-flight retry loop and disconnect.
    ///
    /// Later calls fail with `Cancelled`.
    ///
    /// # Errors
    /// `ForbiddenContext` from the guard, before anything is cancelled.
    /// Otherwise as [`disconnect`](Self::disconnect).
    pub async fn shutdown(&self) -> ConnectorResult<()> {
        self.guard.assert_allowed("shutdown")?;
        self.shutdown.cancel();
        self.disconnect().await
    }

    /// `true` once [`shutdown`](Self::shutdown) has run.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Create a lazily bound table service owned by this connector.
    pub fn service<K, V, B>(self: &Arc<Self>, resource: impl Into<String>, binder: B) -> LazyBoundService<K, V>
    where
        K: Send + Sync + 'static,
        V: Send + 'static,
        B: TableBinder<K, V> + 'static,
    {
        LazyBoundService::new(Arc::clone(self), resource, binder)
    }

    pub(crate) async fn lock_slot(&self) -> ConnectionSlot<'_> {
        ConnectionSlot { connector: self, slot: self.slot.lock().await }
    }
}

impl std::fmt::Debug for ResilientConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientConnector")
            .field("identity", &self.identity)
            .field("generation", &self.current_generation())
            .field("retry", &self.retry)
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}

/// The connector's connection slot, locked
pub(crate) struct ConnectionSlot<'a> {
    connector: &'a ResilientConnector,
    slot: MutexGuard<'a, Option<Arc<ConnectionHandle>>>,
}

impl ConnectionSlot<'_> {
    /// The handle in the slot, or a freshly built one stored into it.
    pub(crate) async fn handle_or_connect(
        &mut self,
        cancel: &CancellationToken,
    ) -> ConnectorResult<Arc<ConnectionHandle>> {
        if let Some(handle) = self.slot.as_ref() {
            return Ok(Arc::clone(handle));
        }

        let connector = self.connector;
        let handle =
            Arc::new(connector.factory.new_connection_with_cancel(&connector.identity, cancel).await?);
        connector.generation.store(handle.generation(), Ordering::Release);
        *self.slot = Some(Arc::clone(&handle));
        Ok(handle)
    }
}
