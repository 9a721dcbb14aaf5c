use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.tasks_path.to_string_lossy(), "./config/tasks.yaml");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.max_attempts, 3);
    assert_eq!(cfg.retry_backoff, PacingWindow::new(5000, 15000));
    assert_eq!(cfg.device_jitter, PacingWindow::new(5000, 12000));
}

#[test]
fn request_timeout_secs_override() {
    let mut map = HashMap::new();
    map.insert("PICKWATCH_REQUEST_TIMEOUT_SECS", "10");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.request_timeout_secs, 10);
}

#[test]
fn request_timeout_secs_invalid() {
    let mut map = HashMap::new();
    map.insert("PICKWATCH_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PICKWATCH_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(PICKWATCH_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn max_attempts_override() {
    let mut map = HashMap::new();
    map.insert("PICKWATCH_MAX_ATTEMPTS", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_attempts, 5);
}

#[test]
fn max_attempts_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("PICKWATCH_MAX_ATTEMPTS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PICKWATCH_MAX_ATTEMPTS"),
        "expected InvalidEnvVar(PICKWATCH_MAX_ATTEMPTS), got: {result:?}"
    );
}

#[test]
fn retry_backoff_window_override() {
    let mut map = HashMap::new();
    map.insert("PICKWATCH_RETRY_BACKOFF_MIN_MS", "0");
    map.insert("PICKWATCH_RETRY_BACKOFF_MAX_MS", "10");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.retry_backoff, PacingWindow::new(0, 10));
}

#[test]
fn device_jitter_window_with_min_above_max_is_rejected() {
    let mut map = HashMap::new();
    map.insert("PICKWATCH_DEVICE_JITTER_MIN_MS", "9000");
    map.insert("PICKWATCH_DEVICE_JITTER_MAX_MS", "1000");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PICKWATCH_DEVICE_JITTER_MIN_MS"),
        "expected InvalidEnvVar(PICKWATCH_DEVICE_JITTER_MIN_MS), got: {result:?}"
    );
}

#[test]
fn tasks_path_and_log_level_override() {
    let mut map = HashMap::new();
    map.insert("PICKWATCH_TASKS_PATH", "/etc/pickwatch/tasks.yaml");
    map.insert("PICKWATCH_LOG_LEVEL", "debug");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.tasks_path.to_string_lossy(), "/etc/pickwatch/tasks.yaml");
    assert_eq!(cfg.log_level, "debug");
}
