//! Failure policy tables
//!
//! Two vocabularies over one source of truth. Whether a failure is
//! transient is answered by `ConnectorError`'s `ErrorClassification`
//! impl; both classifiers defer to it through `NatureClassifier`.
//!
//! A failure in the middle of a business call and a failure while logging
//! in still mean different things: an expired session is worth a reconnect
//! mid-call, but a session that expires during login points at the
//! credentials. That one exception is the only rule added on top.

use hostlink_common::{FailureClassification, FailureClassifier, NatureClassifier};
use hostlink_domain::ConnectorError;

/// Policy for business calls routed through `ResilientConnector::invoke`
#[derive(Debug, Clone, Copy, Default)]
pub struct CallClassifier;

impl FailureClassifier<ConnectorError> for CallClassifier {
    fn classify(&self, error: &ConnectorError, retry_allowed: bool) -> FailureClassification {
        NatureClassifier.classify(error, retry_allowed)
    }
}

/// Policy for connection construction and login
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstructionClassifier;

impl FailureClassifier<ConnectorError> for ConstructionClassifier {
    fn classify(&self, error: &ConnectorError, retry_allowed: bool) -> FailureClassification {
        match error {
            ConnectorError::SessionExpired(_) => FailureClassification::ImmediatelyFatal,
            _ => NatureClassifier.classify(error, retry_allowed),
        }
    }
}
