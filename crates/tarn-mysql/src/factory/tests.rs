//! Tests for connection option building

use tarn_core::DbConfig;

use super::MySqlSessionFactory;

#[test]
fn test_build_opts_carries_connection_parameters() {
    let config = DbConfig::new("db.internal", "app", "secret", "orders").with_port(3307);
    let factory = MySqlSessionFactory::new(config);

    let opts = factory.build_opts();
    assert_eq!(opts.ip_or_hostname(), "db.internal");
    assert_eq!(opts.tcp_port(), 3307);
    assert_eq!(opts.user(), Some("app"));
    assert_eq!(opts.pass(), Some("secret"));
    assert_eq!(opts.db_name(), Some("orders"));
}

#[test]
fn test_build_opts_sets_charset_and_disables_autocommit() {
    let config = DbConfig::new("localhost", "root", "", "test").with_charset("latin1");
    let factory = MySqlSessionFactory::new(config);

    let opts = factory.build_opts();
    let init: Vec<&str> = opts.init().iter().map(String::as_str).collect();
    assert_eq!(init, vec!["SET NAMES latin1", "SET autocommit=0"]);
}

#[test]
fn test_build_opts_empty_database_selects_none() {
    let config = DbConfig::new("localhost", "root", "", "");
    let factory = MySqlSessionFactory::new(config);

    let opts = factory.build_opts();
    assert_eq!(opts.db_name(), None);
}

#[test]
fn test_factory_exposes_config() {
    let config = DbConfig::new("localhost", "root", "pw", "test");
    let factory = MySqlSessionFactory::new(config);
    assert_eq!(factory.config().host, "localhost");
    // Debug output must not leak the password
    let rendered = format!("{:?}", factory.config());
    assert!(!rendered.contains("pw"));
    assert!(rendered.contains("******"));
}
