use std::time::Duration;

use zendulge_config::{model::API_URL_ENV, Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_is_valid() {
    let cfg = Config::default();

    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
    assert!(cfg.page_size > 0);
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    let mut cfg = Config::default();
    cfg.api_base_url = "https://staging.example.com/api/".to_string();
    cfg.page_size = 24;

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded.api_base_url, "https://staging.example.com/api/");
    assert_eq!(loaded.normalized_base_url(), "https://staging.example.com/api");
    assert_eq!(loaded.page_size, 24);
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let loaded = manager.load().expect("load defaults");
    assert_eq!(loaded, Config::default());
    assert!(manager.config_path().ends_with("config/config.json"));
}

#[test]
fn partial_file_fills_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"page_size": 6}"#).expect("write");

    let loaded = ConfigManager::new(path).load().expect("load");
    assert_eq!(loaded.page_size, 6);
    assert_eq!(loaded.api_base_url, Config::default_api_base_url());
}

#[test]
fn rejects_non_http_base_url() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));
    let mut cfg = Config::default();
    cfg.api_base_url = "ftp://example.com".into();

    let err = manager.save(&cfg).expect_err("invalid url");
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn env_lookup_overrides_base_url() {
    let mut cfg = Config::default();
    cfg.apply_overrides_from(|name| {
        (name == API_URL_ENV).then(|| "https://api.example.com".to_string())
    });
    assert_eq!(cfg.api_base_url, "https://api.example.com");

    cfg.apply_overrides_from(|_| Some("   ".to_string()));
    assert_eq!(cfg.api_base_url, "https://api.example.com");
}

#[test]
fn explicit_storage_dir_wins() {
    let mut cfg = Config::default();
    cfg.storage_dir = Some("/tmp/zendulge-test".into());
    assert_eq!(
        cfg.resolve_storage_dir(),
        std::path::PathBuf::from("/tmp/zendulge-test")
    );
}
