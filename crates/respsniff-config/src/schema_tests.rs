use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.browser.endpoint, "http://localhost:9222");
    assert_eq!(config.browser.request_timeout_secs, 30);
    assert_eq!(config.capture.quiet_period_ms, 2000);
    assert_eq!(config.capture.timeout_secs, 10);
    assert_eq!(config.capture.body_attempts, 5);
    assert_eq!(config.capture.body_retry_interval_ms, 1000);
    assert!(config.capture.patterns.is_empty());
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.json);
}

#[test]
fn test_default_capture_matches_engine_defaults() {
    let config = CaptureConfig::default();
    assert_eq!(config.interceptor_config(), InterceptorConfig::default());
}

#[test]
fn test_interceptor_config_conversion() {
    let capture = CaptureConfig {
        quiet_period_ms: 500,
        timeout_secs: 3,
        body_attempts: 2,
        body_retry_interval_ms: 250,
        patterns: vec!["*/api/*".to_string()],
    };
    let config = capture.interceptor_config();
    assert_eq!(config.quiet_period, Duration::from_millis(500));
    assert_eq!(config.timeout, Duration::from_secs(3));
    assert_eq!(config.body_attempts, 2);
    assert_eq!(config.body_retry_interval, Duration::from_millis(250));
}

#[test]
fn test_partial_toml_uses_defaults() {
    let toml = r#"
        [capture]
        quiet_period_ms = 750
    "#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.capture.quiet_period_ms, 750);
    assert_eq!(config.capture.timeout_secs, 10);
    assert_eq!(config.browser.endpoint, "http://localhost:9222");
}

#[test]
fn test_full_toml() {
    let toml = r#"
        [browser]
        endpoint = "http://127.0.0.1:9333"
        request_timeout_secs = 5

        [capture]
        quiet_period_ms = 1000
        timeout_secs = 20
        body_attempts = 3
        body_retry_interval_ms = 200
        patterns = ["*/graphql", "*.json"]

        [logging]
        level = "respsniff=debug"
        dir = "/var/log/respsniff"
        json = true
    "#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.browser.request_timeout(), Duration::from_secs(5));
    assert_eq!(config.capture.patterns, vec!["*/graphql", "*.json"]);
    assert_eq!(config.capture.body_retry_interval(), Duration::from_millis(200));
    assert_eq!(config.logging.dir_path(), PathBuf::from("/var/log/respsniff"));
    assert!(config.logging.json);
}

#[test]
fn test_log_dir_expands_tilde() {
    let logging = LoggingConfig::default();
    assert!(!logging.dir_path().to_string_lossy().starts_with('~'));
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("localhost:9222"));
    assert!(json.contains("quiet_period_ms"));
}
