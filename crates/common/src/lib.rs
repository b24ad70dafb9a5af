//! Generic building blocks shared across the hostlink crates.
//!
//! Nothing in here knows about remote hosts, identities or entity tables.
//! The crate only answers "how long do we wait", "is this failure worth
//! another attempt" and "run this operation until it succeeds or we must
//! stop".
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error classification, backoff schedule, failure
//!   classification
//! - `observability`: tracing levels for error severities
//! - `runtime`: the async retry loop and sleeper abstraction
//! - `test-utils`: tracking sleepers and call counters for tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod resilience;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", all(test, feature = "runtime")))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{ErrorClassification, ErrorSeverity};
#[cfg(feature = "foundation")]
pub use resilience::{
    BackoffSchedule, CancelPhase, FailureClassification, FailureClassifier, NatureClassifier,
    ScheduleError,
};
#[cfg(feature = "runtime")]
pub use resilience::{
    RetryError, RetryExecutor, RetryOutcome, RetryResult, Sleeper, TokioSleeper,
};
