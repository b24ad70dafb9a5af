//! Configuration loading
//!
//! Builds a [`hostlink_domain::ConnectorConfig`] from environment variables
//! or from a TOML/JSON file.

pub mod loader;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, find_config_file};
