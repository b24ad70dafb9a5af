//! Failure classification for the retry loop
//!
//! A classifier looks at one failed attempt and decides what the loop does
//! next. The decision is a pure function of the error and of whether the
//! caller allowed retries at all.

use std::fmt;

use crate::error::ErrorClassification;

/// Outcome of classifying one failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClassification {
    /// The same operation may succeed if attempted again after a delay
    Retryable,
    /// Retrying cannot change the outcome
    ImmediatelyFatal,
    /// A well-formed "no such element" answer; propagated unchanged and never
    /// retried
    NotFoundTerminal,
}

impl FailureClassification {
    /// `true` only for [`FailureClassification::Retryable`].
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Retryable)
    }

    /// `true` for outcomes that end the loop on first occurrence.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !self.is_retryable()
    }
}

impl fmt::Display for FailureClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retryable => write!(f, "retryable"),
            Self::ImmediatelyFatal => write!(f, "immediately_fatal"),
            Self::NotFoundTerminal => write!(f, "not_found_terminal"),
        }
    }
}

/// Where a cooperative cancellation was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelPhase {
    /// Before an attempt was started
    BeforeAttempt,
    /// While waiting out a backoff delay
    DuringWait,
}

impl fmt::Display for CancelPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeAttempt => write!(f, "before attempt"),
            Self::DuringWait => write!(f, "during backoff wait"),
        }
    }
}

/// Decides what a retry loop does with a failed attempt
///
/// Implementations must be exhaustive over the failures they know and must
/// answer [`FailureClassification::ImmediatelyFatal`] for anything they do
/// not recognise.
pub trait FailureClassifier<E: ?Sized>: Send + Sync {
    /// Classify `error`; `retry_allowed` is `false` when the caller declared
    /// the operation unsafe to repeat.
    fn classify(&self, error: &E, retry_allowed: bool) -> FailureClassification;
}

/// Classifier driven purely by [`ErrorClassification`]
///
/// Ordering of the rules matters: "not found" wins over everything, then a
/// caller that disallowed retries gets a fatal answer, then the error's own
/// nature decides.
#[derive(Debug, Clone, Copy, Default)]
pub struct NatureClassifier;

impl<E> FailureClassifier<E> for NatureClassifier
where
    E: ErrorClassification + ?Sized,
{
    fn classify(&self, error: &E, retry_allowed: bool) -> FailureClassification {
        if error.is_not_found() {
            FailureClassification::NotFoundTerminal
        } else if !retry_allowed {
            FailureClassification::ImmediatelyFatal
        } else if error.is_retryable() {
            FailureClassification::Retryable
        } else {
            FailureClassification::ImmediatelyFatal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorSeverity;

    #[derive(Debug)]
    enum Sample {
        Reset,
        Missing,
        BadInput,
    }

    impl ErrorClassification for Sample {
        fn is_retryable(&self) -> bool {
            matches!(self, Self::Reset)
        }

        fn is_not_found(&self) -> bool {
            matches!(self, Self::Missing)
        }

        fn severity(&self) -> ErrorSeverity {
            ErrorSeverity::Warning
        }
    }

    /// Validates the three rules of `NatureClassifier` in order.
    ///
    /// Assertions:
    /// - Not-found is terminal with and without retries allowed.
    /// - Transient errors are retryable only when retries are allowed.
    /// - Non-transient errors are always fatal.
    #[test]
    fn test_nature_classifier_rules() {
        let classifier = NatureClassifier;

        assert_eq!(classifier.classify(&Sample::Missing, true), FailureClassification::NotFoundTerminal);
        assert_eq!(classifier.classify(&Sample::Missing, false), FailureClassification::NotFoundTerminal);

        assert_eq!(classifier.classify(&Sample::Reset, true), FailureClassification::Retryable);
        assert_eq!(classifier.classify(&Sample::Reset, false), FailureClassification::ImmediatelyFatal);

        assert_eq!(classifier.classify(&Sample::BadInput, true), FailureClassification::ImmediatelyFatal);
        assert_eq!(classifier.classify(&Sample::BadInput, false), FailureClassification::ImmediatelyFatal);
    }

    #[test]
    fn test_classification_helpers() {
        assert!(FailureClassification::Retryable.is_retryable());
        assert!(FailureClassification::ImmediatelyFatal.is_terminal());
        assert!(FailureClassification::NotFoundTerminal.is_terminal());
        assert_eq!(FailureClassification::NotFoundTerminal.to_string(), "not_found_terminal");
    }

    #[test]
    fn test_cancel_phase_display() {
        assert_eq!(CancelPhase::BeforeAttempt.to_string(), "before attempt");
        assert_eq!(CancelPhase::DuringWait.to_string(), "during backoff wait");
    }
}
