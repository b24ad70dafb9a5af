//! Configuration structures
//!
//! Plain serde types. Loading (env vars, files, path probing) lives in
//! `hostlink-infra`.

use std::time::Duration;

use hostlink_common::BackoffSchedule;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_LOG_FILTER;
use crate::errors::ConnectorResult;
use crate::types::Identity;

/// Everything needed to build one connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    pub identity: Identity,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub guard: GuardSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConnectorConfig {
    /// Defaults for everything but the identity.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            retry: RetrySettings::default(),
            guard: GuardSettings::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Check the identity and the retry table.
    ///
    /// # Errors
    /// Returns `ConnectorError::Validation` for a bad identity and
    /// `ConnectorError::Config` for a decreasing retry table.
    pub fn validate(&self) -> ConnectorResult<()> {
        self.identity.validate()?;
        self.retry.schedule()?;
        Ok(())
    }
}

/// Retry table override
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Waits in milliseconds; `None` keeps the built-in standard table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delays_ms: Option<Vec<u64>>,
}

impl RetrySettings {
    /// Resolve to a concrete schedule.
    ///
    /// # Errors
    /// Returns `ConnectorError::Config` if the table decreases anywhere.
    pub fn schedule(&self) -> ConnectorResult<BackoffSchedule> {
        match &self.delays_ms {
            Some(millis) => Ok(BackoffSchedule::from_millis(millis)?),
            None => Ok(BackoffSchedule::standard()),
        }
    }

    /// Worst-case time a fully exhausted call spends waiting.
    pub fn worst_case_wait(&self) -> ConnectorResult<Duration> {
        Ok(self.schedule()?.total_delay())
    }
}

/// Thread guard settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardSettings {
    /// Reject remote calls from the thread that built the connector
    #[serde(default)]
    pub forbid_main_thread: bool,
}

/// Log output settings, consumed by the tracing setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// One JSON object per line instead of plain text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter(), json: false }
    }
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
