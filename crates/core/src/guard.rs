//! Thread-affinity guard
//!
//! Embedding applications with a thread that must never block (a UI event
//! loop, typically) install a predicate here. Every public remote operation
//! asks the guard first and fails fast with
//! [`ConnectorError::ForbiddenContext`] instead of freezing that thread.
//!
//! Headless use needs nothing: the default guard allows every thread.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use hostlink_domain::{ConnectorError, ConnectorResult};
use tracing::error;

type ForbiddenPredicate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Pluggable "is the current context forbidden?" check
#[derive(Clone, Default)]
pub struct ThreadAffinityGuard {
    predicate: Option<ForbiddenPredicate>,
}

impl ThreadAffinityGuard {
    /// A guard that never objects.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Forbid whenever `is_forbidden` returns `true`.
    pub fn from_predicate<F>(is_forbidden: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self { predicate: Some(Arc::new(is_forbidden)) }
    }

    /// Forbid one specific OS thread.
    pub fn forbid_thread(thread_id: ThreadId) -> Self {
        Self::from_predicate(move || thread::current().id() == thread_id)
    }

    /// Forbid the thread calling this constructor.
    pub fn forbid_current_thread() -> Self {
        Self::forbid_thread(thread::current().id())
    }

    /// `true` if the current context may not issue remote calls.
    pub fn is_forbidden(&self) -> bool {
        self.predicate.as_ref().is_some_and(|is_forbidden| is_forbidden())
    }

    /// Fail if the current context may not issue remote calls.
    ///
    /// Never blocks and never retries.
    ///
    /// # Errors
    /// Returns `ConnectorError::ForbiddenContext` naming `operation`.
    pub fn assert_allowed(&self, operation: &str) -> ConnectorResult<()> {
        if self.is_forbidden() {
            let thread = thread::current();
            error!(
                operation,
                thread = thread.name().unwrap_or("<unnamed>"),
                "remote call attempted from a forbidden thread"
            );
            return Err(ConnectorError::forbidden(operation));
        }
        Ok(())
    }
}

impl fmt::Debug for ThreadAffinityGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadAffinityGuard")
            .field("restricted", &self.predicate.is_some())
            .finish()
    }
}
