//! Schedule-driven retry loop with cooperative cancellation
//!
//! [`RetryExecutor`] runs one logical operation as a strictly sequential
//! series of attempts. After each failure the configured
//! [`FailureClassifier`] decides whether the loop continues; waits between
//! attempts come from a [`BackoffSchedule`] and are raced against a
//! [`CancellationToken`].
//!
//! The loop never rewraps a failure it gives up on: [`RetryError::Failed`]
//! carries the last error exactly as the operation produced it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn, Level};

use super::backoff::BackoffSchedule;
use super::classification::{CancelPhase, FailureClassification, FailureClassifier};
use super::sleeper::{Sleeper, TokioSleeper};
use crate::error::ErrorClassification;

/// Emit an event at a level only known at runtime.
macro_rules! event_at {
    ($level:expr, $($rest:tt)+) => {{
        let level = $level;
        if level == Level::ERROR {
            error!($($rest)+);
        } else if level == Level::WARN {
            warn!($($rest)+);
        } else if level == Level::INFO {
            info!($($rest)+);
        } else {
            debug!($($rest)+);
        }
    }};
}

/// Ways a retry loop can end without a result
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The loop stopped on a failure; `source` is the last error, unchanged
    #[error("operation failed after {attempts} attempt(s): {source}")]
    Failed { source: E, attempts: u32, classification: FailureClassification },

    /// Cancellation was observed before an attempt or during a wait
    #[error("operation cancelled {phase} after {attempts} attempt(s)")]
    Cancelled { phase: CancelPhase, attempts: u32, last_error: Option<E> },
}

impl<E> RetryError<E> {
    /// Number of real invocations made before the loop ended.
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Failed { attempts, .. } | Self::Cancelled { attempts, .. } => *attempts,
        }
    }

    /// `true` if the loop ended because of cancellation.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Outcome of a retry execution including result and summary statistics.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: RetryResult<T, E>,
    pub attempts: u32,
    pub total_delay: Duration,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result.
    pub fn into_result(self) -> RetryResult<T, E> {
        self.result
    }

    /// Get the average delay between attempts (excludes operation execution
    /// time).
    pub fn average_delay(&self) -> Duration {
        if self.attempts <= 1 {
            return Duration::ZERO;
        }
        self.total_delay / (self.attempts - 1)
    }
}

/// The retry loop
///
/// Cheap to clone; the schedule and sleeper are shared.
#[derive(Clone)]
pub struct RetryExecutor<C> {
    schedule: BackoffSchedule,
    classifier: C,
    sleeper: Arc<dyn Sleeper>,
}

impl<C> fmt::Debug for RetryExecutor<C>
where
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("max_attempts", &self.schedule.max_attempts())
            .field("classifier", &self.classifier)
            .field("sleeper", &"<sleeper>")
            .finish()
    }
}

impl<C> RetryExecutor<C> {
    /// Create an executor that waits on the tokio timer.
    pub fn new(schedule: BackoffSchedule, classifier: C) -> Self {
        Self { schedule, classifier, sleeper: Arc::new(TokioSleeper) }
    }

    /// Replace the sleeper (tests use a recording sleeper).
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// The schedule this executor follows.
    pub const fn schedule(&self) -> &BackoffSchedule {
        &self.schedule
    }

    /// The classifier consulted after every failed attempt.
    pub const fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Execute an operation with retry logic
    ///
    /// `operation` performs exactly one attempt of the real work per call.
    /// With `allow_retry == false` it is still invoked once; any failure is
    /// propagated unchanged.
    ///
    /// # Errors
    ///
    /// [`RetryError::Failed`] with the last error when the classifier stops
    /// the loop or attempts run out; [`RetryError::Cancelled`] when `cancel`
    /// fires before an attempt or during a wait.
    pub async fn execute<F, Fut, T, E>(
        &self,
        allow_retry: bool,
        cancel: &CancellationToken,
        operation: F,
    ) -> RetryResult<T, E>
    where
        C: FailureClassifier<E>,
        E: ErrorClassification + fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_outcome(allow_retry, cancel, operation).await.into_result()
    }

    /// Execute an operation with retry logic and return outcome statistics.
    #[instrument(skip_all, fields(max_attempts = self.schedule.max_attempts(), allow_retry = allow_retry))]
    pub async fn execute_with_outcome<F, Fut, T, E>(
        &self,
        allow_retry: bool,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> RetryOutcome<T, E>
    where
        C: FailureClassifier<E>,
        E: ErrorClassification + fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.schedule.max_attempts();
        let mut attempt: u32 = 1;
        let mut total_delay = Duration::ZERO;
        let mut last_error: Option<E> = None;

        loop {
            if cancel.is_cancelled() {
                debug!(attempt, "cancelled before attempt");
                return RetryOutcome {
                    result: Err(RetryError::Cancelled {
                        phase: CancelPhase::BeforeAttempt,
                        attempts: attempt - 1,
                        last_error,
                    }),
                    attempts: attempt - 1,
                    total_delay,
                };
            }

            debug!(attempt, max_attempts, "executing attempt");

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, ?total_delay, "operation succeeded after retries");
                    }
                    return RetryOutcome { result: Ok(value), attempts: attempt, total_delay };
                }
                Err(error) => error,
            };

            let classification = self.classifier.classify(&error, allow_retry);
            let exhausted = attempt >= max_attempts;
            if classification.is_terminal() || !allow_retry || cancel.is_cancelled() || exhausted {
                if classification == FailureClassification::NotFoundTerminal {
                    debug!(attempt, error = %error, "not found, not retrying");
                } else if classification.is_retryable() && exhausted {
                    event_at!(
                        error.severity().level(),
                        attempts = attempt,
                        severity = %error.severity(),
                        error = %error,
                        "all retry attempts exhausted"
                    );
                } else {
                    event_at!(
                        error.severity().level(),
                        attempt,
                        %classification,
                        severity = %error.severity(),
                        error = %error,
                        "not retrying"
                    );
                }
                return RetryOutcome {
                    result: Err(RetryError::Failed { source: error, attempts: attempt, classification }),
                    attempts: attempt,
                    total_delay,
                };
            }

            let delay = self.schedule.delay_for(attempt);
            let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
            event_at!(
                error.severity().level(),
                attempt,
                delay_ms,
                severity = %error.severity(),
                error = %error,
                "attempt failed, retrying"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(attempt, "cancelled during backoff wait");
                    return RetryOutcome {
                        result: Err(RetryError::Cancelled {
                            phase: CancelPhase::DuringWait,
                            attempts: attempt,
                            last_error: Some(error),
                        }),
                        attempts: attempt,
                        total_delay,
                    };
                }
                () = self.sleeper.sleep(delay) => {}
            }

            total_delay += delay;
            last_error = Some(error);
            attempt += 1;
        }
    }
}
