//! Configuration loader
//!
//! Loads connector configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the identity is incomplete there, falls back to a file
//! 3. Searches several paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `HOSTLINK_LOCALE`: Session locale (required)
//! - `HOSTLINK_CONNECT_AS`: Account the session acts for (required)
//! - `HOSTLINK_AUTHENTICATE_AS`: Account that logs in (required)
//! - `HOSTLINK_PASSWORD`: Password of the authenticating account (required)
//! - `HOSTLINK_HOST`: Target host override
//! - `HOSTLINK_RETRY_DELAYS_MS`: Comma separated retry waits, e.g. `0,10,50`
//! - `HOSTLINK_FORBID_MAIN_THREAD`: Reject remote calls from the building
//!   thread (true/false)
//! - `HOSTLINK_LOG`: Log filter used when `RUST_LOG` is unset
//! - `HOSTLINK_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./hostlink.{toml,json}` or `./config.{toml,json}` (current directory)
//! 2. The same names one and two directories up
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use hostlink_domain::constants::{
    CONFIG_FILE_STEM, ENV_AUTHENTICATE_AS, ENV_CONNECT_AS, ENV_FORBID_MAIN_THREAD, ENV_HOST,
    ENV_LOCALE, ENV_LOG_FILTER, ENV_LOG_JSON, ENV_PASSWORD, ENV_RETRY_DELAYS_MS,
};
use hostlink_domain::{
    ConnectorConfig, ConnectorError, ConnectorResult, GuardSettings, Identity, LoggingConfig,
    RetrySettings,
};

const FILE_EXTENSIONS: [&str; 2] = ["toml", "json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variable is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `ConnectorError::Config` if configuration cannot be loaded from
/// either source, and `ConnectorError::Validation` if the loaded identity
/// is incomplete.
pub fn load() -> ConnectorResult<ConnectorConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The four identity variables must be present. Everything else falls back
/// to its default.
///
/// # Errors
/// Returns `ConnectorError::Config` if a required variable is missing or a
/// value does not parse.
pub fn load_from_env() -> ConnectorResult<ConnectorConfig> {
    let mut identity = Identity::new(
        env_var(ENV_LOCALE)?,
        env_var(ENV_CONNECT_AS)?,
        env_var(ENV_AUTHENTICATE_AS)?,
        env_var(ENV_PASSWORD)?,
    );
    if let Ok(host) = std::env::var(ENV_HOST) {
        identity = identity.with_host(host);
    }

    let delays_ms = std::env::var(ENV_RETRY_DELAYS_MS).ok().map(|raw| parse_delays(&raw)).transpose()?;

    let config = ConnectorConfig {
        identity,
        retry: RetrySettings { delays_ms },
        guard: GuardSettings { forbid_main_thread: env_bool(ENV_FORBID_MAIN_THREAD, false) },
        logging: LoggingConfig {
            filter: std::env::var(ENV_LOG_FILTER).unwrap_or_else(|_| LoggingConfig::default().filter),
            json: env_bool(ENV_LOG_JSON, false),
        },
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations. Format is detected
/// by file extension.
///
/// # Errors
/// Returns `ConnectorError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
///
/// Returns `ConnectorError::Validation` for an incomplete identity.
pub fn load_from_file(path: Option<PathBuf>) -> ConnectorResult<ConnectorConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConnectorError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            ConnectorError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ConnectorError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content, format chosen by extension.
fn parse_config(contents: &str, path: &Path) -> ConnectorResult<ConnectorConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ConnectorError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ConnectorError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ConnectorError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Search multiple paths for configuration files
///
/// Searches the current directory, its parent and grandparent, then the
/// executable's directory. In each, `hostlink.*` wins over `config.*` and
/// TOML over JSON.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots.iter().flat_map(|root| candidates_in(root)).find(|path| path.exists())
}

fn candidates_in(root: &Path) -> Vec<PathBuf> {
    [CONFIG_FILE_STEM, "config"]
        .iter()
        .flat_map(|stem| FILE_EXTENSIONS.iter().map(move |ext| root.join(format!("{stem}.{ext}"))))
        .collect()
}

/// Parse a comma separated list of millisecond waits.
///
/// Blank entries are skipped, so a trailing comma is harmless. An empty
/// list is valid and means "no retries".
fn parse_delays(raw: &str) -> ConnectorResult<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>().map_err(|e| {
                ConnectorError::Config(format!("Invalid retry delay '{part}' in {ENV_RETRY_DELAYS_MS}: {e}"))
            })
        })
        .collect()
}

/// Get required environment variable
///
/// # Errors
/// Returns `ConnectorError::Config` if the variable is not set.
fn env_var(key: &str) -> ConnectorResult<String> {
    std::env::var(key)
        .map_err(|_| ConnectorError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
