//! Integration tests for configuration loading
//!
//! Environment tests share a lock: the process environment is global.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use hostlink_domain::constants::{
    ENV_AUTHENTICATE_AS, ENV_CONNECT_AS, ENV_FORBID_MAIN_THREAD, ENV_HOST, ENV_LOCALE, ENV_LOG_FILTER,
    ENV_LOG_JSON, ENV_PASSWORD, ENV_RETRY_DELAYS_MS,
};
use hostlink_domain::ConnectorError;
use hostlink_infra::{load_from_env, load_from_file};
use once_cell::sync::Lazy;
use tempfile::TempDir;

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const ALL_VARS: [&str; 9] = [
    ENV_LOCALE,
    ENV_CONNECT_AS,
    ENV_AUTHENTICATE_AS,
    ENV_PASSWORD,
    ENV_HOST,
    ENV_RETRY_DELAYS_MS,
    ENV_FORBID_MAIN_THREAD,
    ENV_LOG_FILTER,
    ENV_LOG_JSON,
];

fn clear_env() {
    for key in ALL_VARS {
        std::env::remove_var(key);
    }
}

fn set_identity_env() {
    std::env::set_var(ENV_LOCALE, "en_US");
    std::env::set_var(ENV_CONNECT_AS, "reseller");
    std::env::set_var(ENV_AUTHENTICATE_AS, "admin");
    std::env::set_var(ENV_PASSWORD, "hunter2");
}

fn write_config(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create config file");
    file.write_all(contents.as_bytes()).expect("write config file");
    path
}

/// Validates a full environment load.
///
/// Assertions:
/// - Identity, host and password are read.
/// - The delay list parses into the schedule.
/// - Boolean and logging settings are honoured.
#[test]
fn test_load_from_env_all_vars_set() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    clear_env();
    set_identity_env();
    std::env::set_var(ENV_HOST, "host-b.example");
    std::env::set_var(ENV_RETRY_DELAYS_MS, "0,10,50");
    std::env::set_var(ENV_FORBID_MAIN_THREAD, "yes");
    std::env::set_var(ENV_LOG_FILTER, "hostlink_core=debug");
    std::env::set_var(ENV_LOG_JSON, "1");

    let config = load_from_env();
    clear_env();
    let config = config.expect("complete environment");

    assert_eq!(config.identity.connect_as, "reseller");
    assert_eq!(config.identity.target(), "host-b.example");
    assert_eq!(config.identity.password.expose(), "hunter2");
    assert_eq!(config.retry.delays_ms, Some(vec![0, 10, 50]));
    assert_eq!(config.retry.worst_case_wait().expect("valid table"), Duration::from_millis(60));
    assert!(config.guard.forbid_main_thread);
    assert_eq!(config.logging.filter, "hostlink_core=debug");
    assert!(config.logging.json);
}

/// Validates defaults when only the identity is in the environment.
#[test]
fn test_load_from_env_defaults() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    clear_env();
    set_identity_env();

    let config = load_from_env();
    clear_env();
    let config = config.expect("identity is enough");

    assert_eq!(config.identity.target(), "default");
    assert_eq!(config.retry.delays_ms, None);
    assert_eq!(config.retry.schedule().expect("standard table").max_attempts(), 25);
    assert!(!config.guard.forbid_main_thread);
    assert_eq!(config.logging.filter, "info");
}

/// Validates environment failures.
///
/// Assertions:
/// - A missing identity variable is a `Config` error naming it.
/// - A decreasing delay list is a `Config` error.
/// - An unparsable delay is a `Config` error.
#[test]
fn test_load_from_env_failures() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    clear_env();

    let missing = load_from_env();

    set_identity_env();
    std::env::set_var(ENV_RETRY_DELAYS_MS, "50,10");
    let decreasing = load_from_env();

    std::env::set_var(ENV_RETRY_DELAYS_MS, "0,soon");
    let unparsable = load_from_env();
    clear_env();

    assert!(matches!(missing, Err(ConnectorError::Config(ref msg)) if msg.contains(ENV_LOCALE)));
    assert!(matches!(decreasing, Err(ConnectorError::Config(_))));
    assert!(matches!(unparsable, Err(ConnectorError::Config(ref msg)) if msg.contains("soon")));
}

/// Validates TOML files with every section present.
#[test]
fn test_load_from_file_toml() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        "hostlink.toml",
        r#"
[identity]
locale = "en_US"
connect_as = "reseller"
authenticate_as = "admin"
password = "hunter2"
host = "host-a.example"

[retry]
delays_ms = [0, 5, 5, 20]

[guard]
forbid_main_thread = true

[logging]
filter = "warn"
json = true
"#,
    );

    let config = load_from_file(Some(path)).expect("valid TOML file");

    assert_eq!(config.identity.target(), "host-a.example");
    assert_eq!(config.retry.schedule().expect("valid table").max_attempts(), 5);
    assert!(config.guard.forbid_main_thread);
    assert_eq!(config.logging.filter, "warn");
    assert!(config.logging.json);
}

/// Validates JSON files with only the identity section.
#[test]
fn test_load_from_file_json_minimal() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        "config.json",
        r#"{
            "identity": {
                "locale": "de_DE",
                "connect_as": "reseller",
                "authenticate_as": "operator",
                "password": "s3cret"
            }
        }"#,
    );

    let config = load_from_file(Some(path)).expect("valid JSON file");

    assert_eq!(config.identity.locale, "de_DE");
    assert_eq!(config.retry.delays_ms, None);
    assert!(!config.logging.json);
}

/// Validates file failures.
///
/// Assertions:
/// - A missing path is a `Config` error.
/// - Malformed content is a `Config` error.
/// - An empty identity field is a `Validation` error.
#[test]
fn test_load_from_file_failures() {
    let dir = TempDir::new().expect("temp dir");

    let missing = load_from_file(Some(dir.path().join("absent.toml")));
    assert!(matches!(missing, Err(ConnectorError::Config(ref msg)) if msg.contains("not found")));

    let malformed = write_config(&dir, "broken.json", r#"{ "identity": "#);
    assert!(matches!(load_from_file(Some(malformed)), Err(ConnectorError::Config(_))));

    let incomplete = write_config(
        &dir,
        "incomplete.toml",
        r#"
[identity]
locale = "en_US"
connect_as = ""
authenticate_as = "admin"
password = "hunter2"
"#,
    );
    assert!(matches!(
        load_from_file(Some(incomplete)),
        Err(ConnectorError::Validation { ref field, .. }) if field == "connect_as"
    ));
}
