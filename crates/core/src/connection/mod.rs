//! Connection establishment
//!
//! - [`ports`]: the `Transport` / `Session` boundary
//! - [`handle`]: one live session and its generation
//! - [`factory`]: construction and login under the retry discipline

pub mod factory;
pub mod handle;
pub mod ports;

pub use factory::ResilientConnectorFactory;
pub use handle::ConnectionHandle;
pub use ports::{Session, Transport};
