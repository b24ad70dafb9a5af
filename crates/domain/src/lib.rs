//! # Hostlink Domain
//!
//! Plain data types for the connector layer.
//!
//! This crate contains:
//! - Login identity and secret handling
//! - The connector error taxonomy and Result alias
//! - Configuration structures
//! - Environment variable names and defaults
//!
//! ## Architecture
//! - Depends only on the pure `foundation` tier of `hostlink-common`
//! - No runtime, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use hostlink_common::CancelPhase;
pub use types::*;
