//! Connector constants
//!
//! Environment variable names, file stems and defaults shared by the loader
//! and the runtime crates.

// Environment variables
pub const ENV_LOCALE: &str = "HOSTLINK_LOCALE";
pub const ENV_CONNECT_AS: &str = "HOSTLINK_CONNECT_AS";
pub const ENV_AUTHENTICATE_AS: &str = "HOSTLINK_AUTHENTICATE_AS";
pub const ENV_PASSWORD: &str = "HOSTLINK_PASSWORD";
pub const ENV_HOST: &str = "HOSTLINK_HOST";
pub const ENV_RETRY_DELAYS_MS: &str = "HOSTLINK_RETRY_DELAYS_MS";
pub const ENV_FORBID_MAIN_THREAD: &str = "HOSTLINK_FORBID_MAIN_THREAD";
pub const ENV_LOG_FILTER: &str = "HOSTLINK_LOG";
pub const ENV_LOG_JSON: &str = "HOSTLINK_LOG_JSON";

// Config file discovery
pub const CONFIG_FILE_STEM: &str = "hostlink";

// Logging
pub const DEFAULT_LOG_FILTER: &str = "info";
