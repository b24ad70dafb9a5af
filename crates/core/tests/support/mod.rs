//! Shared test helpers for `hostlink-core` integration tests.
//!
//! Lightweight mocks for the transport, sessions and entity tables, with
//! call counters and scripted failures so tests can focus on behaviour.

#![allow(dead_code)]

pub mod table;
pub mod transport;

use std::sync::Arc;

use hostlink_common::testing::TrackingSleeper;
use hostlink_common::BackoffSchedule;
use hostlink_core::{LazyBoundService, ResilientConnector, ResilientConnectorFactory};
use hostlink_domain::Identity;

pub use table::{MemoryTable, MockBinder};
pub use transport::{MockSession, MockTransport};

/// The entity shape every table test uses: numeric key, name row.
pub type Servers = LazyBoundService<u32, String>;

pub fn identity() -> Identity {
    Identity::new("en_US", "reseller", "admin", "hunter2")
}

/// A connector over `transport` whose waits are recorded, not slept.
pub struct Harness {
    pub transport: Arc<MockTransport>,
    pub sleeper: Arc<TrackingSleeper>,
    pub connector: Arc<ResilientConnector>,
}

impl Harness {
    pub fn new(millis: &[u64]) -> Self {
        Self::with_transport(millis, MockTransport::new())
    }

    pub fn with_transport(millis: &[u64], transport: MockTransport) -> Self {
        let transport = Arc::new(transport);
        let sleeper = Arc::new(TrackingSleeper::new());
        let schedule = BackoffSchedule::from_millis(millis).expect("valid schedule");
        let factory = ResilientConnectorFactory::new(transport.clone())
            .with_schedule(schedule.clone())
            .with_sleeper(sleeper.clone());
        let connector = ResilientConnector::new(identity(), Arc::new(factory))
            .with_schedule(schedule)
            .with_sleeper(sleeper.clone());
        Self { transport, sleeper, connector: Arc::new(connector) }
    }
}
