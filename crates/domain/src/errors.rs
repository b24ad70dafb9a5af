//! Error types used throughout the connector layer

use std::fmt;

use hostlink_common::error::{ErrorClassification, ErrorSeverity};
use hostlink_common::{CancelPhase, ScheduleError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Low-level shape of a transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportFailure {
    /// The peer dropped the connection mid-call
    ConnectionReset,
    /// The transport gave up waiting for a reply
    Timeout,
    /// The server answered but is temporarily not serving
    Unavailable,
    /// Anything the transport could not put in one of the buckets above
    Other,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionReset => write!(f, "connection reset"),
            Self::Timeout => write!(f, "timeout"),
            Self::Unavailable => write!(f, "server unavailable"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Main error type for the connector layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    /// The wire failed mid-call
    #[error("Transport error ({kind}): {message}")]
    Transport { kind: TransportFailure, message: String },

    /// Nothing answered at the target host
    #[error("Remote host not reachable: {0}")]
    Unreachable(String),

    /// The host dropped the session; a new login is needed
    #[error("Remote session expired: {0}")]
    SessionExpired(String),

    /// Credentials were refused
    #[error("Authentication rejected for {principal}: {message}")]
    Authentication { principal: String, message: String },

    /// Bad input, rejected locally or by the host
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// The host answered that the element does not exist
    #[error("{resource} not found: {key}")]
    NotFound { resource: String, key: String },

    /// The thread guard rejected the call
    #[error("{operation} is not allowed on the current thread")]
    ForbiddenContext { operation: String },

    /// The caller or a shutdown stopped the operation
    #[error("{operation} cancelled {phase}")]
    Cancelled {
        operation: String,
        phase: CancelPhase,
        #[source]
        source: Option<Box<ConnectorError>>,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// A broken invariant inside the connector layer
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for connector operations
pub type ConnectorResult<T> = std::result::Result<T, ConnectorError>;

impl ConnectorError {
    /// Transport failure of the given kind.
    pub fn transport(kind: TransportFailure, message: impl Into<String>) -> Self {
        Self::Transport { kind, message: message.into() }
    }

    /// Missing element `key` of `resource`.
    pub fn not_found(resource: impl Into<String>, key: impl fmt::Display) -> Self {
        Self::NotFound { resource: resource.into(), key: key.to_string() }
    }

    /// Invalid value for `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Login refused for `principal`.
    pub fn authentication(principal: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication { principal: principal.into(), message: message.into() }
    }

    /// `operation` attempted from a forbidden thread.
    pub fn forbidden(operation: impl Into<String>) -> Self {
        Self::ForbiddenContext { operation: operation.into() }
    }

    /// Wrap a cancellation, keeping the last failure seen before it.
    pub fn cancelled(
        operation: impl Into<String>,
        phase: CancelPhase,
        last_error: Option<Self>,
    ) -> Self {
        Self::Cancelled { operation: operation.into(), phase, source: last_error.map(Box::new) }
    }

    /// `true` when the failure means the bound session can no longer be used.
    pub const fn is_connection_loss(&self) -> bool {
        matches!(
            self,
            Self::Transport { kind: TransportFailure::ConnectionReset, .. } | Self::SessionExpired(_)
        )
    }

    /// `true` for cooperative cancellation.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

impl ErrorClassification for ConnectorError {
    /// Transient transport conditions only; `Transport { kind: Other }` is
    /// not retried because nothing is known about it.
    fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { kind, .. } => !matches!(kind, TransportFailure::Other),
            Self::Unreachable(_) | Self::SessionExpired(_) => true,
            Self::Authentication { .. }
            | Self::Validation { .. }
            | Self::NotFound { .. }
            | Self::ForbiddenContext { .. }
            | Self::Cancelled { .. }
            | Self::Config(_)
            | Self::Internal(_) => false,
        }
    }

    fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound { .. } | Self::Cancelled { .. } => ErrorSeverity::Info,
            Self::Transport { .. } | Self::Unreachable(_) | Self::SessionExpired(_) => {
                ErrorSeverity::Warning
            }
            Self::Authentication { .. }
            | Self::Validation { .. }
            | Self::ForbiddenContext { .. }
            | Self::Config(_) => ErrorSeverity::Error,
            Self::Internal(_) => ErrorSeverity::Critical,
        }
    }
}

impl From<ScheduleError> for ConnectorError {
    fn from(err: ScheduleError) -> Self {
        Self::Config(format!("Invalid retry schedule: {err}"))
    }
}
