//! 配置文件加载测试

use rat_quickpool::{BackendKind, ManagerConfig, PoolConfig, PoolError};
use std::io::Write;

#[test]
fn test_load_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[embedded]
min_size = 1
max_size = 1
cache_ttl_seconds = 5

[networked]
min_size = 2
max_size = 10
acquire_timeout_ms = 1500
health_check_on_acquire = true
"#
    )
    .unwrap();

    let config = ManagerConfig::from_file(file.path()).unwrap();
    let embedded = config.pool_config(BackendKind::Embedded).unwrap();
    assert_eq!(embedded.cache_ttl_seconds, 5);
    assert_eq!(embedded.max_idle_seconds, 300);

    let networked = config.pool_config(BackendKind::Networked).unwrap();
    assert_eq!(networked.max_size, 10);
    assert_eq!(networked.acquire_timeout_ms, 1500);
    assert!(networked.health_check_on_acquire);
}

#[test]
fn test_load_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"networked": {{"min_size": 3, "max_size": 6}}}}"#).unwrap();

    let config = ManagerConfig::from_file(file.path()).unwrap();
    assert!(config.embedded.is_none());
    assert_eq!(config.backends(), vec![BackendKind::Networked]);
    assert_eq!(config.networked.unwrap().min_size, 3);
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pools.toml");

    let config = ManagerConfig::builder()
        .with_defaults(BackendKind::Embedded)
        .networked(PoolConfig::builder().min_size(2).max_size(8).build().unwrap())
        .build()
        .unwrap();
    config.save_to_file(&path).unwrap();

    let reloaded = ManagerConfig::from_file(&path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_invalid_file_contents() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[networked]\nmin_size = 8\nmax_size = 2").unwrap();

    let result = ManagerConfig::from_file(file.path());
    assert!(matches!(result, Err(PoolError::ConfigError { .. })));

    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    writeln!(file, "not json").unwrap();
    assert!(matches!(
        ManagerConfig::from_file(file.path()),
        Err(PoolError::ConfigError { .. })
    ));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = ManagerConfig::from_file(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(PoolError::IoError(_))));
}
