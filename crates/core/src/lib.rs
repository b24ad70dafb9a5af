//! # Hostlink Core
//!
//! The resilient connector layer.
//!
//! This crate contains:
//! - Port interfaces for the transport, sessions and per-entity tables
//! - The thread-affinity guard and the failure policy tables
//! - `ResilientConnectorFactory`, `ResilientConnector` and the generic
//!   `LazyBoundService<K, V>`
//! - A per-identity connector registry
//!
//! ## Architecture Principles
//! - Only depends on `hostlink-common` and `hostlink-domain`
//! - No wire protocol: the transport is a trait
//! - Every remote call goes through one retry loop

pub mod binding;
pub mod classify;
pub mod connection;
pub mod connector;
pub mod guard;
pub mod registry;

// Re-export specific items to avoid ambiguity
pub use binding::{LazyBoundService, RemoteTable, TableBinder};
pub use classify::{CallClassifier, ConstructionClassifier};
pub use connection::{ConnectionHandle, ResilientConnectorFactory, Session, Transport};
pub use connector::ResilientConnector;
pub use guard::ThreadAffinityGuard;
pub use registry::ConnectorRegistry;
