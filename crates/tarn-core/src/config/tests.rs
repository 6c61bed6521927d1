//! Tests for configuration loading

use super::DbConfig;
use crate::DbError;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

// from_env tests mutate process-wide environment variables; serialize them.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn write_config(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(json.as_bytes()).expect("write config");
    file
}

#[test]
fn test_config_defaults() {
    let config = DbConfig::new("db.example.com", "app", "secret", "orders");
    assert_eq!(config.host, "db.example.com");
    assert_eq!(config.port, 3306);
    assert_eq!(config.charset, "utf8mb4");
    assert_eq!(config.connect_timeout(), Duration::from_secs(30));
}

#[test]
fn test_config_builders() {
    let config = DbConfig::new("localhost", "root", "", "")
        .with_port(3307)
        .with_charset("latin1")
        .with_connect_timeout_secs(5);
    assert_eq!(config.port, 3307);
    assert_eq!(config.charset, "latin1");
    assert_eq!(config.connect_timeout(), Duration::from_secs(5));
}

#[test]
fn test_debug_masks_password() {
    let config = DbConfig::new("localhost", "root", "hunter2", "app");
    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("******"));
}

#[test]
fn test_from_file() {
    let file = write_config(
        r#"{"host": "10.0.0.5", "user": "app", "password": "pw", "database": "orders", "port": 3307}"#,
    );
    let config = DbConfig::from_file(file.path()).expect("load config");
    assert_eq!(config.host, "10.0.0.5");
    assert_eq!(config.user, "app");
    assert_eq!(config.port, 3307);
    // Unspecified keys fall back to defaults
    assert_eq!(config.charset, "utf8mb4");
    assert_eq!(config.connect_timeout_secs, 30);
}

#[test]
fn test_from_file_missing_required_key() {
    let file = write_config(r#"{"host": "localhost", "user": "root", "password": "pw"}"#);
    let err = DbConfig::from_file(file.path()).unwrap_err();
    match err {
        DbError::Config(msg) => assert!(msg.contains("database"), "unexpected message: {}", msg),
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[test]
fn test_from_file_malformed_json() {
    let file = write_config("{not json");
    let err = DbConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, DbError::Serialization(_)));
}

#[test]
fn test_from_file_nonexistent() {
    let err = DbConfig::from_file("/nonexistent/tarn-config.json").unwrap_err();
    assert!(matches!(err, DbError::Io(_)));
}

#[test]
fn test_from_env_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    for key in [
        "MYSQL_HOST",
        "MYSQL_USER",
        "MYSQL_PASSWORD",
        "MYSQL_DATABASE",
        "MYSQL_PORT",
        "MYSQL_CHARSET",
    ] {
        unsafe { std::env::remove_var(key) };
    }

    let config = DbConfig::from_env().expect("defaults");
    assert_eq!(config.host, "localhost");
    assert_eq!(config.user, "root");
    assert_eq!(config.password, "");
    assert_eq!(config.database, "");
    assert_eq!(config.port, 3306);
    assert_eq!(config.charset, "utf8mb4");
}

#[test]
fn test_from_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        std::env::set_var("MYSQL_HOST", "db.internal");
        std::env::set_var("MYSQL_USER", "svc");
        std::env::set_var("MYSQL_PASSWORD", "pw");
        std::env::set_var("MYSQL_DATABASE", "metrics");
        std::env::set_var("MYSQL_PORT", "3310");
        std::env::set_var("MYSQL_CHARSET", "utf8");
    }

    let config = DbConfig::from_env().expect("load from env");

    unsafe {
        for key in [
            "MYSQL_HOST",
            "MYSQL_USER",
            "MYSQL_PASSWORD",
            "MYSQL_DATABASE",
            "MYSQL_PORT",
            "MYSQL_CHARSET",
        ] {
            std::env::remove_var(key);
        }
    }

    assert_eq!(config.host, "db.internal");
    assert_eq!(config.user, "svc");
    assert_eq!(config.database, "metrics");
    assert_eq!(config.port, 3310);
    assert_eq!(config.charset, "utf8");
}

#[test]
fn test_from_env_bad_port() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe { std::env::set_var("MYSQL_PORT", "not-a-port") };
    let err = DbConfig::from_env().unwrap_err();
    unsafe { std::env::remove_var("MYSQL_PORT") };
    assert!(matches!(err, DbError::Config(_)));
}
