//! Retry building blocks
//!
//! - **Backoff**: a fixed, non-decreasing table of waits between attempts
//! - **Classification**: the per-failure decision (retry, stop, or "absent")
//! - **Sleeper**: how a wait is actually performed
//! - **Retry**: the sequential attempt loop tying the three together
//!
//! Everything here is generic over the error type. The connector crates plug
//! in their own classifiers; this module never inspects an error beyond what
//! a [`FailureClassifier`] reports.

pub mod backoff;
pub mod classification;
#[cfg(feature = "runtime")]
pub mod retry;
#[cfg(feature = "runtime")]
pub mod sleeper;

pub use backoff::{BackoffSchedule, ScheduleError};
pub use classification::{CancelPhase, FailureClassification, FailureClassifier, NatureClassifier};
#[cfg(feature = "runtime")]
pub use retry::{RetryError, RetryExecutor, RetryOutcome, RetryResult};
#[cfg(feature = "runtime")]
pub use sleeper::{Sleeper, TokioSleeper};
