//! Testing utilities and helpers
//!
//! - **[`sleeper`]**: sleepers that record waits instead of performing them
//! - **[`counter`]**: a shareable call counter for mock collaborators
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use hostlink_common::testing::TrackingSleeper;
//! use hostlink_common::{BackoffSchedule, NatureClassifier, RetryExecutor};
//!
//! let sleeper = Arc::new(TrackingSleeper::new());
//! let executor = RetryExecutor::new(BackoffSchedule::standard(), NatureClassifier)
//!     .with_sleeper(sleeper.clone());
//! assert!(sleeper.recorded().is_empty());
//! # let _ = (executor, Duration::ZERO);
//! ```

pub mod counter;
pub mod sleeper;

pub use counter::CallCounter;
pub use sleeper::{InstantSleeper, PendingSleeper, TrackingSleeper};
