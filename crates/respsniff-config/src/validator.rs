//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

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

    /// Convert the first error, if any, into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
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
        Self::validate_browser(config, &mut result);
        Self::validate_capture(config, &mut result);
        Self::validate_logging(config, &mut result);
        result
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        let endpoint = &config.browser.endpoint;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            result.add_error(ValidationError::new(
                "browser.endpoint",
                "endpoint must start with http:// or https://",
            ));
        }

        if config.browser.request_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "browser.request_timeout_secs",
                "request_timeout_secs must be greater than 0",
            ));
        }
    }

    fn validate_capture(config: &Config, result: &mut ValidationResult) {
        let capture = &config.capture;

        if capture.quiet_period_ms == 0 {
            result.add_error(ValidationError::new(
                "capture.quiet_period_ms",
                "quiet_period_ms must be greater than 0",
            ));
        }

        if capture.timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "capture.timeout_secs",
                "timeout_secs must be greater than 0",
            ));
        }

        if capture.body_retry_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "capture.body_retry_interval_ms",
                "body_retry_interval_ms must be greater than 0",
            ));
        }

        if capture.body_attempts == 0 {
            result.add_warning(ValidationWarning::new(
                "capture.body_attempts",
                "body_attempts is 0, response bodies will never be fetched",
            ));
        }

        if capture.quiet_period() > capture.timeout() {
            result.add_warning(ValidationWarning::new(
                "capture.quiet_period_ms",
                format!(
                    "quiet period ({:?}) exceeds the drain timeout ({:?}), a capture may time out before responses settle",
                    capture.quiet_period(),
                    capture.timeout()
                ),
            ));
        }

        for pattern in &capture.patterns {
            if pattern.trim().is_empty() {
                result.add_warning(ValidationWarning::new(
                    "capture.patterns",
                    "empty pattern only matches empty URLs",
                ));
            }
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if config.logging.level.trim().is_empty() {
            result.add_error(ValidationError::new(
                "logging.level",
                "level cannot be empty",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
