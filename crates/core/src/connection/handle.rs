//! A bound, authenticated session plus the identity that opened it

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hostlink_domain::Identity;
use uuid::Uuid;

use super::ports::Session;

/// Owns exactly one live session to the remote host
///
/// Handles are immutable once built. A connector swaps whole handles on
/// reconnect; the `generation` tells bindings which handle they were built
/// against.
pub struct ConnectionHandle {
    id: Uuid,
    generation: u64,
    identity: Identity,
    session: Arc<dyn Session>,
    established_at: DateTime<Utc>,
}

impl ConnectionHandle {
    pub(crate) fn new(generation: u64, identity: Identity, session: Arc<dyn Session>) -> Self {
        Self { id: Uuid::now_v7(), generation, identity, session, established_at: Utc::now() }
    }

    /// Unique id, for logs.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Monotonic per factory, starting at 1.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Identity the session logged in with.
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    /// The session as the protocol's concrete type, if it is one.
    pub fn session_as<S>(&self) -> Option<Arc<S>>
    where
        S: Session + Any,
    {
        Arc::clone(&self.session).as_any().downcast::<S>().ok()
    }

    pub const fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .field("identity", &self.identity)
            .field("session_id", &self.session.session_id())
            .field("established_at", &self.established_at)
            .finish()
    }
}
