//! The resilient connector and its connection slot

pub mod service;

pub(crate) use service::ConnectionSlot;
pub use service::ResilientConnector;
