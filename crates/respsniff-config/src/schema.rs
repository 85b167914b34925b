//! Configuration schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use respsniff_core::InterceptorConfig;
use serde::{Deserialize, Serialize};

use crate::loader::ConfigLoader;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection to a running browser's DevTools endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// DevTools HTTP endpoint, e.g. `http://localhost:9222`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-command timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl BrowserConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:9222".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// Capture tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Inactivity before buffered responses become drainable.
    #[serde(default = "default_quiet_period")]
    pub quiet_period_ms: u64,

    /// Per-item drain deadline.
    #[serde(default = "default_capture_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_body_attempts")]
    pub body_attempts: u32,

    #[serde(default = "default_body_retry_interval")]
    pub body_retry_interval_ms: u64,

    /// Patterns used when none are given on the command line.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl CaptureConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn body_retry_interval(&self) -> Duration {
        Duration::from_millis(self.body_retry_interval_ms)
    }

    /// Interceptor settings for the capture engine.
    pub fn interceptor_config(&self) -> InterceptorConfig {
        InterceptorConfig::default()
            .with_quiet_period(self.quiet_period())
            .with_timeout(self.timeout())
            .with_body_attempts(self.body_attempts)
            .with_body_retry_interval(self.body_retry_interval())
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: default_quiet_period(),
            timeout_secs: default_capture_timeout(),
            body_attempts: default_body_attempts(),
            body_retry_interval_ms: default_body_retry_interval(),
            patterns: Vec::new(),
        }
    }
}

fn default_quiet_period() -> u64 {
    2000
}

fn default_capture_timeout() -> u64 {
    10
}

fn default_body_attempts() -> u32 {
    5
}

fn default_body_retry_interval() -> u64 {
    1000
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for daily-rolling log files.
    #[serde(default = "default_log_dir")]
    pub dir: String,

    /// Write the log file as JSON lines.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Log directory with `~` expanded.
    pub fn dir_path(&self) -> PathBuf {
        PathBuf::from(ConfigLoader::expand_path(&self.dir))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: default_log_dir(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "~/.respsniff/logs".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
