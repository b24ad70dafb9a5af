//! Who a connection logs in as, and where

use std::fmt;

use serde::{Deserialize, Serialize};

use super::secret::Secret;
use crate::errors::{ConnectorError, ConnectorResult};

/// Login identity of one connection
///
/// Two identities that compare equal may share a connector. The password
/// takes part in equality so a credential change yields a fresh connector.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub locale: String,
    pub connect_as: String,
    pub authenticate_as: String,
    #[serde(default, skip_serializing)]
    pub password: Secret,
    /// Overrides the transport's default target host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl Identity {
    pub fn new(
        locale: impl Into<String>,
        connect_as: impl Into<String>,
        authenticate_as: impl Into<String>,
        password: impl Into<Secret>,
    ) -> Self {
        Self {
            locale: locale.into(),
            connect_as: connect_as.into(),
            authenticate_as: authenticate_as.into(),
            password: password.into(),
            host: None,
        }
    }

    /// Target a specific host instead of the default one.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Host override, or `"default"` when the transport picks.
    pub fn target(&self) -> &str {
        self.host.as_deref().unwrap_or("default")
    }

    /// Check the fields a transport cannot do without.
    ///
    /// # Errors
    /// Returns `ConnectorError::Validation` naming the first empty field.
    pub fn validate(&self) -> ConnectorResult<()> {
        let required = [
            ("locale", &self.locale),
            ("connect_as", &self.connect_as),
            ("authenticate_as", &self.authenticate_as),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConnectorError::validation(field, "must not be empty"));
            }
        }
        if matches!(self.host.as_deref(), Some(host) if host.trim().is_empty()) {
            return Err(ConnectorError::validation("host", "must not be blank when set"));
        }
        Ok(())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("locale", &self.locale)
            .field("connect_as", &self.connect_as)
            .field("authenticate_as", &self.authenticate_as)
            .field("password", &self.password)
            .field("host", &self.host)
            .finish()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.connect_as == self.authenticate_as {
            write!(f, "{}@{}", self.connect_as, self.target())
        } else {
            write!(f, "{} (as {})@{}", self.connect_as, self.authenticate_as, self.target())
        }
    }
}
