//! One shared connector per identity
//!
//! Applications that talk to the host under several identities keep a
//! registry instead of wiring connectors by hand. Concurrent first requests
//! for the same identity end up with the same connector.

use std::sync::Arc;

use dashmap::DashMap;
use hostlink_common::{BackoffSchedule, Sleeper};
use hostlink_domain::{ConnectorResult, Identity};
use tracing::{debug, warn};

use crate::connection::ResilientConnectorFactory;
use crate::connector::ResilientConnector;

/// Connectors keyed by login identity, all built on one factory
pub struct ConnectorRegistry {
    factory: Arc<ResilientConnectorFactory>,
    schedule: BackoffSchedule,
    sleeper: Option<Arc<dyn Sleeper>>,
    connectors: DashMap<Identity, Arc<ResilientConnector>>,
}

impl ConnectorRegistry {
    /// Create an empty registry whose connectors share `factory`.
    pub fn new(factory: Arc<ResilientConnectorFactory>) -> Self {
        let schedule = factory.schedule().clone();
        Self { factory, schedule, sleeper: None, connectors: DashMap::new() }
    }

    /// Retry schedule for connectors created from now on.
    #[must_use]
    pub fn with_schedule(mut self, schedule: BackoffSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Sleeper for connectors created from now on.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// The connector for `identity`, created on first request.
    ///
    /// Creating a connector is local; no connection is made here.
    ///
    /// # Errors
    /// `ForbiddenContext` from the factory's guard, or `Validation` for an
    /// incomplete identity.
    pub fn connector(&self, identity: &Identity) -> ConnectorResult<Arc<ResilientConnector>> {
        self.factory.guard().assert_allowed("connector")?;
        if let Some(existing) = self.connectors.get(identity) {
            return Ok(Arc::clone(existing.value()));
        }

        identity.validate()?;
        let entry = self.connectors.entry(identity.clone()).or_insert_with(|| {
            debug!(identity = %identity, "creating connector");
            Arc::new(self.build(identity.clone()))
        });
        Ok(Arc::clone(entry.value()))
    }

    /// Forget the connector for `identity` without disconnecting it.
    pub fn remove(&self, identity: &Identity) -> Option<Arc<ResilientConnector>> {
        self.connectors.remove(identity).map(|(_, connector)| connector)
    }

    /// Number of registered connectors.
    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    /// `true` if no connector has been requested yet.
    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    /// Shut down and forget every connector.
    ///
    /// Close failures are logged; every connector is shut down regardless.
    ///
    /// # Errors
    /// `ForbiddenContext` from the factory's guard. Nothing is shut down or
    /// forgotten in that case.
    pub async fn shutdown_all(&self) -> ConnectorResult<()> {
        self.factory.guard().assert_allowed("shutdown_all")?;
        let connectors: Vec<_> =
            self.connectors.iter().map(|entry| Arc::clone(entry.value())).collect();
        self.connectors.clear();

        for connector in connectors {
            if let Err(err) = connector.shutdown().await {
                warn!(identity = %connector.identity(), error = %err, "shutdown failed");
            }
        }
        Ok(())
    }

    fn build(&self, identity: Identity) -> ResilientConnector {
        let connector = ResilientConnector::new(identity, Arc::clone(&self.factory))
            .with_schedule(self.schedule.clone());
        match &self.sleeper {
            Some(sleeper) => connector.with_sleeper(Arc::clone(sleeper)),
            None => connector,
        }
    }
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("connectors", &self.connectors.len())
            .field("max_attempts", &self.schedule.max_attempts())
            .finish_non_exhaustive()
    }
}
