//! The seam between the capture engine and the event-driven transport.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::{BodyPayload, RawEvent};

/// Callback invoked once per response-received notification.
pub trait ResponseListener: Send + Sync {
    fn on_response(&self, event: RawEvent);
}

impl<F> ResponseListener for F
where
    F: Fn(RawEvent) + Send + Sync,
{
    fn on_response(&self, event: RawEvent) {
        self(event)
    }
}

/// An event source that pushes response notifications and serves bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Register a listener for response-received notifications.
    ///
    /// Every registered listener sees every notification, so callers must
    /// register at most once per logical subscription.
    fn add_response_listener(&self, listener: Arc<dyn ResponseListener>)
        -> Result<(), TransportError>;

    /// Fetch the body of a response by request id.
    ///
    /// `Ok(None)` and blank bodies are legitimate while the data is still
    /// arriving; callers retry. Repeated calls for the same id are idempotent.
    async fn fetch_body(&self, request_id: &str) -> Result<Option<BodyPayload>, TransportError>;
}
