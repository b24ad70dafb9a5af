//! Mock transport and session

use std::any::Any;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hostlink_common::testing::CallCounter;
use hostlink_core::{Session, Transport};
use hostlink_domain::{ConnectorError, ConnectorResult, Identity};
use parking_lot::Mutex;

/// Session that records whether it was closed
#[derive(Debug)]
pub struct MockSession {
    pub number: u32,
    closed: AtomicBool,
}

impl MockSession {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Session for MockSession {
    fn session_id(&self) -> String {
        format!("mock-{}", self.number)
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    async fn close(&self) -> ConnectorResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Transport that fails from a script, then hands out numbered sessions
///
/// Every `connect` yields a few times before answering so concurrent
/// callers get a chance to pile up behind the connection lock.
#[derive(Default)]
pub struct MockTransport {
    pub connects: CallCounter,
    failures: Mutex<VecDeque<ConnectorError>>,
    sessions: Mutex<Vec<Arc<MockSession>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue failures returned by the next `connect` calls, in order.
    pub fn failing_with(self, failures: impl IntoIterator<Item = ConnectorError>) -> Self {
        self.failures.lock().extend(failures);
        self
    }

    pub fn push_failure(&self, failure: ConnectorError) {
        self.failures.lock().push_back(failure);
    }

    pub fn sessions(&self) -> Vec<Arc<MockSession>> {
        self.sessions.lock().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, _identity: &Identity) -> ConnectorResult<Arc<dyn Session>> {
        let number = self.connects.hit();
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        let failure = self.failures.lock().pop_front();
        if let Some(err) = failure {
            return Err(err);
        }

        let session = Arc::new(MockSession { number, closed: AtomicBool::new(false) });
        self.sessions.lock().push(Arc::clone(&session));
        Ok(session)
    }
}
