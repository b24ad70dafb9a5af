//! # Hostlink Infrastructure
//!
//! The impure edges of the connector layer.
//!
//! This crate contains:
//! - Configuration loading from environment variables and files
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Depends on `hostlink-domain` for the configuration types
//! - Contains all process-level I/O (environment, filesystem, stderr)

pub mod config;
pub mod observability;

// Re-export commonly used items
pub use config::{load, load_from_env, load_from_file, find_config_file};
pub use observability::init_tracing;
