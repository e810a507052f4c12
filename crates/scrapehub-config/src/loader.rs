//! Configuration loader.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

static ENV_VAR_PATTERN: OnceLock<Regex> = OnceLock::new();

fn env_var_pattern() -> &'static Regex {
    ENV_VAR_PATTERN
        .get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex"))
}

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in env_var_pattern().captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.scrapehub`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CacheBackend, PollInterval, StoreBackend};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.scheduler.timezone, "America/New_York");
        assert_eq!(config.scheduler.poll_interval, PollInterval::Seconds(900));
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
            [server]
            host = "0.0.0.0"
            port = 8000

            [scheduler]
            timezone = "Europe/Berlin"
            poll_interval = "disabled"

            [store]
            backend = "graphql"
            endpoint = "https://hub.example.com/graphql"
            token = "secret"

            [cache]
            backend = "upstash"
            url = "https://cache.example.com"
            token = "cache-token"
            ttl_secs = 3600

            [executor]
            url = "https://scraper.example.com/scrape"
            timeout_secs = 120
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.scheduler.timezone, "Europe/Berlin");
        assert!(config.scheduler.poll_interval.is_disabled());
        assert_eq!(config.store.backend, StoreBackend::Graphql);
        assert_eq!(config.cache.backend, CacheBackend::Upstash);
        assert_eq!(config.cache.ttl_secs, Some(3600));
        assert_eq!(config.executor.timeout_secs, Some(120));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[scheduler]").unwrap();
        writeln!(file, "poll_interval = 60").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.scheduler.poll_interval, PollInterval::Seconds(60));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/scrapehub.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_nonexistent_file() {
        let config =
            ConfigLoader::load_or_default(Path::new("/nonexistent/path/scrapehub.toml")).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_load_invalid_poll_interval() {
        let content = r#"
            [scheduler]
            poll_interval = "sometimes"
        "#;
        assert!(ConfigLoader::load_str(content).is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: test-only variable name, not read anywhere else.
        unsafe {
            std::env::set_var("SCRAPEHUB_TEST_TOKEN", "tok-123");
        }
        let content = "[executor]\ntoken = \"${SCRAPEHUB_TEST_TOKEN}\"";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.executor.token.as_deref(), Some("tok-123"));
        unsafe {
            std::env::remove_var("SCRAPEHUB_TEST_TOKEN");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_SCRAPEHUB_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let content = "value = \"no variables here\"";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/scrapehub");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/scrapehub"));
    }
}
