//! Domain value types

pub mod identity;
pub mod secret;

pub use identity::Identity;
pub use secret::Secret;
