use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.scheduler.timezone, "America/New_York");
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert_eq!(config.cache.backend, CacheBackend::Memory);
    assert_eq!(config.cache.key_prefix, "scrapingJob:");
    assert!(config.logging.file);
}

#[test]
fn test_poll_interval_default() {
    let interval = PollInterval::default();
    assert_eq!(interval, PollInterval::Seconds(900));
    assert_eq!(
        interval.as_duration(),
        Some(std::time::Duration::from_secs(900))
    );
}

#[test]
fn test_poll_interval_disabled() {
    let config: SchedulerConfig = toml::from_str("poll_interval = \"disabled\"").unwrap();
    assert!(config.poll_interval.is_disabled());
    assert_eq!(config.poll_interval.as_duration(), None);
}

#[test]
fn test_poll_interval_keyword_case_insensitive() {
    let config: SchedulerConfig = toml::from_str("poll_interval = \"Disabled\"").unwrap();
    assert!(config.poll_interval.is_disabled());
}

#[test]
fn test_poll_interval_serialize() {
    let config = SchedulerConfig {
        timezone: "UTC".to_string(),
        poll_interval: PollInterval::Disabled,
    };
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["poll_interval"], "disabled");

    let config = SchedulerConfig {
        timezone: "UTC".to_string(),
        poll_interval: PollInterval::Seconds(60),
    };
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["poll_interval"], 60);
}

#[test]
fn test_poll_interval_display() {
    assert_eq!(PollInterval::Seconds(30).to_string(), "30s");
    assert_eq!(PollInterval::Disabled.to_string(), "disabled");
}

#[test]
fn test_store_backend_parse() {
    let config: StoreConfig = toml::from_str("backend = \"file\"\npath = \"/tmp/hub\"").unwrap();
    assert_eq!(config.backend, StoreBackend::File);
    assert_eq!(config.data_dir(), std::path::PathBuf::from("/tmp/hub"));
    assert_eq!(config.timeout_secs, 30);
}

#[test]
fn test_unknown_store_backend_rejected() {
    let result: Result<StoreConfig, _> = toml::from_str("backend = \"postgres\"");
    assert!(result.is_err());
}

#[test]
fn test_logging_dir_default() {
    let logging = LoggingConfig::default();
    assert!(logging.log_dir().ends_with(".scrapehub/logs"));
}
