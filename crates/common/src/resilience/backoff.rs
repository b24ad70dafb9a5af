//! Fixed backoff schedule used between retry attempts
//!
//! A schedule is a table of waits, not a formula. Entry `n - 1` is the wait
//! inserted after the `n`-th failed attempt, so a table with `n` entries
//! allows `n + 1` attempts in total.

use std::borrow::Cow;
use std::time::Duration;

use thiserror::Error;

const fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// The built-in ramp: starts at zero to absorb a single dropped packet, then
/// grows roughly by half-steps up to three seconds.
const STANDARD_DELAYS: [Duration; 24] = [
    ms(0),
    ms(1),
    ms(2),
    ms(3),
    ms(4),
    ms(6),
    ms(8),
    ms(12),
    ms(16),
    ms(24),
    ms(32),
    ms(48),
    ms(64),
    ms(96),
    ms(128),
    ms(192),
    ms(256),
    ms(384),
    ms(512),
    ms(768),
    ms(1024),
    ms(1536),
    ms(2048),
    ms(3072),
];

/// Errors raised when building a custom schedule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A wait is shorter than the one before it
    #[error("backoff delay at index {index} ({current:?}) is shorter than the previous delay ({previous:?})")]
    Decreasing { index: usize, previous: Duration, current: Duration },
}

/// Immutable, monotonically non-decreasing table of retry waits
///
/// Cloning is cheap for the standard schedule (it borrows a constant table)
/// and the value is safe to share between any number of concurrent retry
/// loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffSchedule {
    delays: Cow<'static, [Duration]>,
}

impl BackoffSchedule {
    /// The process-wide default schedule (24 waits, 25 attempts).
    #[must_use]
    pub const fn standard() -> Self {
        Self { delays: Cow::Borrowed(&STANDARD_DELAYS) }
    }

    /// Build a schedule from explicit waits.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Decreasing`] if any wait is shorter than the
    /// one before it.
    pub fn new(delays: Vec<Duration>) -> Result<Self, ScheduleError> {
        if let Some(index) = delays.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(ScheduleError::Decreasing {
                index: index + 1,
                previous: delays[index],
                current: delays[index + 1],
            });
        }
        Ok(Self { delays: Cow::Owned(delays) })
    }

    /// Build a schedule from waits expressed in milliseconds.
    ///
    /// # Errors
    ///
    /// Same as [`BackoffSchedule::new`].
    pub fn from_millis(millis: &[u64]) -> Result<Self, ScheduleError> {
        Self::new(millis.iter().copied().map(Duration::from_millis).collect())
    }

    /// A schedule that never waits and never retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self { delays: Cow::Borrowed(&[]) }
    }

    /// Wait to insert after the given (1-based) failed attempt.
    ///
    /// Callers stop before overrunning the table; an out-of-range attempt
    /// reuses the last entry rather than failing.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let index = usize::try_from(attempt.saturating_sub(1)).unwrap_or(usize::MAX);
        self.delays.get(index).or_else(|| self.delays.last()).copied().unwrap_or(Duration::ZERO)
    }

    /// Total number of real invocations a retry loop may make.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        u32::try_from(self.delays.len()).unwrap_or(u32::MAX - 1).saturating_add(1)
    }

    /// Worst-case cumulative wait across a fully exhausted loop.
    #[must_use]
    pub fn total_delay(&self) -> Duration {
        self.delays.iter().sum()
    }

    /// The raw table.
    #[must_use]
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Number of waits in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.delays.len()
    }

    /// `true` if the schedule allows no retries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self::standard()
    }
}
