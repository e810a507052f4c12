//! Configuration validation.

use chrono_tz::Tz;

use crate::error::ConfigError;
use crate::schema::{CacheBackend, Config, PollInterval, StoreBackend};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_scheduler(config, &mut result);
        Self::validate_store(config, &mut result);
        Self::validate_cache(config, &mut result);
        Self::validate_executor(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_scheduler(config: &Config, result: &mut ValidationResult) {
        if config.scheduler.timezone.parse::<Tz>().is_err() {
            result.add_error(ValidationError::new(
                "scheduler.timezone",
                format!("Unknown time zone '{}'", config.scheduler.timezone),
            ));
        }

        if config.scheduler.poll_interval == PollInterval::Seconds(0) {
            result.add_error(ValidationError::new(
                "scheduler.poll_interval",
                "poll_interval must be greater than 0, use \"disabled\" to turn polling off",
            ));
        }
    }

    fn validate_store(config: &Config, result: &mut ValidationResult) {
        match config.store.backend {
            StoreBackend::Graphql => {
                match config.store.endpoint.as_deref() {
                    None | Some("") => result.add_error(ValidationError::new(
                        "store.endpoint",
                        "endpoint is required for the graphql backend",
                    )),
                    Some(url) => Self::check_http_url("store.endpoint", url, result),
                }
                if config.store.token.is_none() {
                    result.add_warning(ValidationWarning::new(
                        "store.token",
                        "No token set, requests will be sent unauthenticated",
                    ));
                }
            }
            StoreBackend::File => {
                if config.store.path.is_none() {
                    result.add_warning(ValidationWarning::new(
                        "store.path",
                        "File store path not set, will use default location",
                    ));
                }
            }
            StoreBackend::Memory => {
                result.add_warning(ValidationWarning::new(
                    "store.backend",
                    "Memory store keeps jobs and history only until restart",
                ));
            }
        }

        if config.store.timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "store.timeout_secs",
                "timeout_secs must be greater than 0",
            ));
        }
    }

    fn validate_cache(config: &Config, result: &mut ValidationResult) {
        if config.cache.backend == CacheBackend::Upstash {
            match config.cache.url.as_deref() {
                None | Some("") => result.add_error(ValidationError::new(
                    "cache.url",
                    "url is required for the upstash backend",
                )),
                Some(url) => Self::check_http_url("cache.url", url, result),
            }
            if config.cache.token.is_none() {
                result.add_error(ValidationError::new(
                    "cache.token",
                    "token is required for the upstash backend",
                ));
            }
        }

        if let (Some(ttl), Some(poll)) = (
            config.cache.ttl_secs,
            config.scheduler.poll_interval.as_duration(),
        ) {
            if ttl < poll.as_secs() {
                result.add_warning(ValidationWarning::new(
                    "cache.ttl_secs",
                    format!(
                        "ttl_secs ({}) is shorter than poll_interval ({}), cached results may expire between runs",
                        ttl, config.scheduler.poll_interval
                    ),
                ));
            }
        }
    }

    fn validate_executor(config: &Config, result: &mut ValidationResult) {
        match config.executor.url.as_deref() {
            None | Some("") => result.add_error(ValidationError::new(
                "executor.url",
                "Scrape executor url is required",
            )),
            Some(url) => Self::check_http_url("executor.url", url, result),
        }

        if config.executor.timeout_secs == Some(0) {
            result.add_error(ValidationError::new(
                "executor.timeout_secs",
                "timeout_secs must be greater than 0 when set",
            ));
        }
    }

    fn check_http_url(path: &str, url: &str, result: &mut ValidationResult) {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            result.add_error(ValidationError::new(
                path,
                format!("{} must start with http:// or https://", path),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
