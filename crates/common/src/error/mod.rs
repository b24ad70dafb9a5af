//! Error classification shared by every error type in the workspace
//!
//! Error enums in the other crates describe *what* went wrong. This module
//! gives them a common vocabulary for *what kind* of failure it is, so the
//! retry loop and the logging layer can treat them uniformly:
//!
//! - **`ErrorClassification`**: is the failure transient, is it a well-formed
//!   "absent" result, how severe is it.
//! - **`ErrorSeverity`**: a severity level used to pick log levels
//!   (`ErrorSeverity::level` with the `observability` feature).
//!
//! ## Severity levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | Row not found, cancelled call |
//! | **Warning** | Degraded but recoverable | Connection reset, timeout |
//! | **Error** | Failure requiring attention | Bad credentials, invalid argument |
//! | **Critical** | Integrity at risk | Internal invariant violations |
//!
//! ## Example
//!
//! ```rust,ignore
//! use hostlink_common::error::{ErrorClassification, ErrorSeverity};
//!
//! #[derive(Debug, thiserror::Error)]
//! pub enum WidgetError {
//!     #[error("widget not found: {0}")]
//!     NotFound(String),
//!     #[error("link dropped")]
//!     LinkDropped,
//! }
//!
//! impl ErrorClassification for WidgetError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, Self::LinkDropped)
//!     }
//!
//!     fn is_not_found(&self) -> bool {
//!         matches!(self, Self::NotFound(_))
//!     }
//!
//!     fn severity(&self) -> ErrorSeverity {
//!         match self {
//!             Self::NotFound(_) => ErrorSeverity::Info,
//!             Self::LinkDropped => ErrorSeverity::Warning,
//!         }
//!     }
//! }
//! ```

use std::fmt;

/// Standard interface for classifying errors by their characteristics
pub trait ErrorClassification {
    /// Check if this error is transient
    ///
    /// Transient errors may succeed if the same operation is attempted again
    /// after a delay, such as:
    /// - Connection resets
    /// - Timeouts
    /// - Temporarily unavailable servers
    fn is_retryable(&self) -> bool;

    /// Check if this error reports a well-formed "no such element" result
    ///
    /// Such results are answers, not failures, and are never retried.
    fn is_not_found(&self) -> bool {
        false
    }

    /// Get the error severity level
    ///
    /// Used for logging and alerting decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Informational, typically expected
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

#[cfg(feature = "observability")]
impl ErrorSeverity {
    /// Log level for events reporting an error of this severity.
    #[must_use]
    pub const fn level(self) -> tracing::Level {
        match self {
            Self::Info => tracing::Level::INFO,
            Self::Warning => tracing::Level::WARN,
            Self::Error | Self::Critical => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
