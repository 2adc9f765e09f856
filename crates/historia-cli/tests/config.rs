use historia_cli::config::{load_config, migrate, save_config, HistoriaConfig, CURRENT_VERSION};
use historia_completion::retry::RetryPolicy;
use serde_json::json;

#[test]
fn save_then_load_stamps_current_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let mut config = HistoriaConfig::new(dir.path().join("data"));
    config.config_version = 0;
    config.proxy_endpoint = "http://localhost:9000/api/completion-proxy".to_string();
    config.summary_fallback = true;
    save_config(&config, &path).unwrap();

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.config_version, CURRENT_VERSION);
    assert_eq!(loaded.proxy_endpoint, config.proxy_endpoint);
    assert_eq!(loaded.data_dir, dir.path().join("data"));
    assert_eq!(loaded.retry, RetryPolicy::default());
    assert!(loaded.intake().summary_fallback);
    assert!(!path.with_extension("json.tmp").exists());
}

#[cfg(unix)]
#[test]
fn saved_config_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    save_config(&HistoriaConfig::new(dir.path()), &path).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn unversioned_config_gains_single_attempt_retry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let v0 = json!({
        "proxy_endpoint": "https://historia.example.org/api/completion-proxy",
        "data_dir": "/var/lib/historia",
        "request_timeout_secs": 30,
        "completion_display_delay_ms": 2000,
        "summary_fallback": false,
        "tesseract_binary": "/usr/bin/tesseract",
        "created_at": "2026-01-05T10:00:00Z"
    });
    std::fs::write(&path, v0.to_string()).unwrap();

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.config_version, 1);
    assert_eq!(loaded.retry, RetryPolicy::disabled());
    assert_eq!(loaded.request_timeout().as_secs(), 30);
    assert_eq!(
        loaded.intake().completion_display_delay.as_millis(),
        2000
    );
}

#[test]
fn migration_keeps_an_existing_retry_policy() {
    let migrated = migrate(
        json!({ "retry": { "max_attempts": 5, "initial_delay_ms": 100, "multiplier": 3.0, "max_delay_ms": 1000 } }),
        0,
    )
    .unwrap();
    assert_eq!(migrated["retry"]["max_attempts"], 5);
    assert_eq!(migrated["config_version"], 1);
}

#[test]
fn newer_config_is_rejected() {
    let err = migrate(json!({ "config_version": CURRENT_VERSION + 1 }), CURRENT_VERSION + 1)
        .unwrap_err();
    assert!(err.to_string().contains("newer than this build supports"));
}

#[test]
fn non_object_config_is_rejected() {
    assert!(migrate(json!([1, 2, 3]), 0).is_err());
}
