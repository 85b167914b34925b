//! Subscription configuration, the acceptance filter and the live interceptor.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::buffer::EventBuffer;
use crate::config::{InterceptorConfig, TakeOptions};
use crate::drain::Take;
use crate::error::CaptureError;
use crate::pattern::PatternSet;
use crate::transport::{ResponseListener, Transport};
use crate::types::{CapturedResponse, RawEvent};

/// User-supplied acceptance predicate. All predicates must hold.
///
/// Predicates run on the transport's dispatch path and are not guarded:
/// a panicking predicate unwinds into the transport's dispatcher.
pub type Predicate = Arc<dyn Fn(&RawEvent) -> bool + Send + Sync>;

/// Acceptance stage: any pattern AND every predicate.
pub(crate) struct ResponseFilter {
    patterns: RwLock<PatternSet>,
    predicates: RwLock<Vec<Predicate>>,
    buffer: EventBuffer,
    accepted: AtomicU64,
    discarded: AtomicU64,
}

impl ResponseFilter {
    fn new(patterns: PatternSet, predicates: Vec<Predicate>, buffer: EventBuffer) -> Self {
        Self {
            patterns: RwLock::new(patterns),
            predicates: RwLock::new(predicates),
            buffer,
            accepted: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    pub(crate) fn matches(&self, url: &str) -> bool {
        self.patterns.read().matches(url)
    }

    pub(crate) fn accepts(&self, event: &RawEvent) -> bool {
        if !self.matches(&event.url) {
            return false;
        }
        // Snapshot so a predicate may register further filters without deadlocking.
        let predicates = self.predicates.read().clone();
        predicates.iter().all(|predicate| predicate(event))
    }
}

impl ResponseListener for ResponseFilter {
    fn on_response(&self, event: RawEvent) {
        if self.accepts(&event) {
            self.accepted.fetch_add(1, Ordering::Relaxed);
            self.buffer.on_accepted(event);
        } else {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            trace!("Discarding response {} ({})", event.request_id, event.url);
        }
    }
}

/// Collects patterns, predicates and configuration before activation.
///
/// ```rust,ignore
/// let interceptor = InterceptorBuilder::new(transport)
///     .sniff("*/api/*")
///     .filter(|event| event.status == 200)
///     .start()?;
/// let response = interceptor.get(TakeOptions::default()).await?;
/// ```
pub struct InterceptorBuilder {
    transport: Arc<dyn Transport>,
    patterns: PatternSet,
    predicates: Vec<Predicate>,
    config: InterceptorConfig,
}

impl InterceptorBuilder {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            patterns: PatternSet::new(),
            predicates: Vec::new(),
            config: InterceptorConfig::default(),
        }
    }

    /// Add a URL glob pattern.
    pub fn sniff(mut self, pattern: impl AsRef<str>) -> Self {
        self.patterns.add(pattern.as_ref());
        self
    }

    /// Add several URL glob patterns.
    pub fn sniff_all<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.patterns.extend(patterns);
        self
    }

    /// Add an acceptance predicate.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&RawEvent) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
        self
    }

    pub fn config(mut self, config: InterceptorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn quiet_period(mut self, quiet_period: Duration) -> Self {
        self.config.quiet_period = quiet_period;
        self
    }

    /// Attach the single response handler to the transport.
    ///
    /// Fails with [`CaptureError::Runtime`] outside a Tokio runtime.
    pub fn start(self) -> Result<ResponseInterceptor, CaptureError> {
        let buffer = EventBuffer::new(self.config.quiet_period)?;
        let pattern_count = self.patterns.len();
        let filter = Arc::new(ResponseFilter::new(self.patterns, self.predicates, buffer));

        self.transport
            .add_response_listener(filter.clone() as Arc<dyn ResponseListener>)?;

        debug!(
            "Response interceptor started ({} patterns, quiet period {:?})",
            pattern_count, self.config.quiet_period
        );

        Ok(ResponseInterceptor {
            transport: self.transport,
            filter,
            config: self.config,
        })
    }
}

/// A started capture session.
///
/// Further patterns and predicates may be added while running; they extend the
/// existing subscription and never attach another handler.
pub struct ResponseInterceptor {
    transport: Arc<dyn Transport>,
    filter: Arc<ResponseFilter>,
    config: InterceptorConfig,
}

impl ResponseInterceptor {
    /// Add a URL glob pattern to the running subscription.
    pub fn sniff(&self, pattern: impl AsRef<str>) -> &Self {
        self.filter.patterns.write().add(pattern.as_ref());
        self
    }

    /// Add an acceptance predicate to the running subscription.
    pub fn filter<F>(&self, predicate: F) -> &Self
    where
        F: Fn(&RawEvent) -> bool + Send + Sync + 'static,
    {
        self.filter.predicates.write().push(Arc::new(predicate));
        self
    }

    /// Whether `url` matches any registered pattern.
    pub fn matches(&self, url: &str) -> bool {
        self.filter.matches(url)
    }

    pub fn patterns(&self) -> Vec<String> {
        self.filter
            .patterns
            .read()
            .iter()
            .map(str::to_string)
            .collect()
    }

    pub fn config(&self) -> &InterceptorConfig {
        &self.config
    }

    /// Drain options seeded from the interceptor configuration.
    pub fn take_options(&self) -> TakeOptions {
        self.config.take_options()
    }

    /// Lazily drain up to `total` responses.
    pub fn take(&self, total: usize, options: TakeOptions) -> Take<'_> {
        Take::new(
            &self.filter.buffer,
            self.transport.as_ref(),
            options,
            self.config.body_retry_interval,
            total,
        )
    }

    /// Drain a single response.
    pub async fn get(&self, options: TakeOptions) -> Result<Option<CapturedResponse>, CaptureError> {
        self.take(1, options).next().await.transpose()
    }

    pub fn is_empty(&self) -> bool {
        self.filter.buffer.is_empty()
    }

    pub fn has_pending(&self) -> bool {
        self.filter.buffer.has_pending()
    }

    pub fn pending_count(&self) -> usize {
        self.filter.buffer.pending_count()
    }

    /// Whether pending responses have settled.
    pub fn is_ready(&self) -> bool {
        self.filter.buffer.is_ready()
    }

    /// Notifications accepted into the buffer so far.
    pub fn accepted_count(&self) -> u64 {
        self.filter.accepted.load(Ordering::Relaxed)
    }

    /// Notifications rejected by patterns or predicates so far.
    pub fn discarded_count(&self) -> u64 {
        self.filter.discarded.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
