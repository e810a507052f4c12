//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = ConfigError::NotFound("scrapehub.toml".to_string());
        assert!(err.to_string().contains("scrapehub.toml"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_missing_field_error() {
        let err = ConfigError::MissingField("executor.url".to_string());
        assert!(err.to_string().contains("executor.url"));
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn test_invalid_value_error() {
        let err = ConfigError::InvalidValue {
            field: "scheduler.timezone".to_string(),
            message: "unknown zone 'Mars/Base'".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("scheduler.timezone"));
        assert!(display.contains("Mars/Base"));
    }

    #[test]
    fn test_env_var_not_set_error() {
        let err = ConfigError::EnvVarNotSet("SCRAPER_API_TOKEN".to_string());
        assert!(err.to_string().contains("SCRAPER_API_TOKEN"));
        assert!(err.to_string().contains("not set"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::from(io_err);
        assert!(err.to_string().contains("file not found"));
    }
}
