//! Port interfaces for the remote transport
//!
//! These traits define the boundary between the resilient core and the
//! protocol implementation that actually talks to the remote host.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use hostlink_domain::{ConnectorResult, Identity};

/// Opens authenticated sessions to the remote host
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect and log in as `identity`.
    ///
    /// One call is one attempt; the factory owns retrying.
    async fn connect(&self, identity: &Identity) -> ConnectorResult<Arc<dyn Session>>;
}

/// One live, authenticated session
///
/// Sessions are shared by every concurrent caller of a connector and must
/// be safe to use without extra locking.
#[async_trait]
pub trait Session: Send + Sync {
    /// Identifier assigned by the remote host, for logs.
    fn session_id(&self) -> String;

    /// Upcast used by [`ConnectionHandle::session_as`] to recover the
    /// protocol's concrete session type.
    ///
    /// [`ConnectionHandle::session_as`]: super::ConnectionHandle::session_as
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// Log out and release the session.
    async fn close(&self) -> ConnectorResult<()> {
        Ok(())
    }
}
