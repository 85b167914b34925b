//! Runtime tunables for an interceptor and for individual drains.

use std::time::Duration;

/// Interceptor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptorConfig {
    /// Inactivity required before buffered responses become drainable.
    pub quiet_period: Duration,
    /// Default per-item wait for drains.
    pub timeout: Duration,
    /// Default number of body fetch attempts.
    pub body_attempts: u32,
    /// Pause between body fetch attempts.
    pub body_retry_interval: Duration,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_secs(2),
            timeout: Duration::from_secs(10),
            body_attempts: 5,
            body_retry_interval: Duration::from_secs(1),
        }
    }
}

impl InterceptorConfig {
    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_body_attempts(mut self, attempts: u32) -> Self {
        self.body_attempts = attempts;
        self
    }

    pub fn with_body_retry_interval(mut self, interval: Duration) -> Self {
        self.body_retry_interval = interval;
        self
    }

    /// Drain options seeded from this configuration.
    pub fn take_options(&self) -> TakeOptions {
        TakeOptions {
            include_body: true,
            timeout: self.timeout,
            body_attempts: self.body_attempts,
        }
    }
}

/// Per-drain options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TakeOptions {
    /// Fetch each response body from the transport.
    pub include_body: bool,
    /// Deadline for each item to become ready.
    pub timeout: Duration,
    /// Body fetch attempts before giving up on a body.
    pub body_attempts: u32,
}

impl Default for TakeOptions {
    fn default() -> Self {
        InterceptorConfig::default().take_options()
    }
}

impl TakeOptions {
    pub fn include_body(mut self, include: bool) -> Self {
        self.include_body = include;
        self
    }

    pub fn without_body(self) -> Self {
        self.include_body(false)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn body_attempts(mut self, attempts: u32) -> Self {
        self.body_attempts = attempts;
        self
    }
}
