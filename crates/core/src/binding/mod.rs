//! Lazily bound entity services
//!
//! - [`ports`]: `RemoteTable` (the per-entity remote stub) and
//!   `TableBinder` (how a stub is obtained from a connection)
//! - [`service`]: the generic `LazyBoundService<K, V>`

pub mod ports;
pub mod service;

pub use ports::{RemoteTable, TableBinder};
pub use service::LazyBoundService;
