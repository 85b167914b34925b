//! [`Transport`] implementation over a CDP page session.

use std::sync::Arc;

use async_trait::async_trait;
use respsniff_core::{BodyPayload, RawEvent, ResponseListener, Transport, TransportError};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::CdpError;
use crate::protocol::{GetResponseBody, RESPONSE_RECEIVED, ResponseReceived};
use crate::session::PageSession;

/// Feeds `Network.responseReceived` events of one page into a capture.
pub struct CdpTransport {
    session: Arc<PageSession>,
}

impl CdpTransport {
    pub fn new(session: Arc<PageSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<PageSession> {
        &self.session
    }
}

fn response_event(params: &Value) -> Result<RawEvent, serde_json::Error> {
    ResponseReceived::deserialize(params).map(ResponseReceived::into_raw_event)
}

/// Map a `Network.getResponseBody` reply.
///
/// Protocol errors mean the body is not available (yet, or any more); the
/// caller's retry loop handles that. Everything else is a transport failure.
fn body_payload(reply: Result<Value, CdpError>) -> Result<Option<BodyPayload>, TransportError> {
    match reply {
        Ok(value) => {
            let result: GetResponseBody = serde_json::from_value(value)
                .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;
            Ok(Some(result.into()))
        }
        Err(e) if e.is_protocol() => {
            debug!("Body not available: {}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl Transport for CdpTransport {
    fn add_response_listener(
        &self,
        listener: Arc<dyn ResponseListener>,
    ) -> Result<(), TransportError> {
        self.session
            .add_event_handler(RESPONSE_RECEIVED, move |params| match response_event(params) {
                Ok(event) => listener.on_response(event),
                Err(e) => warn!("Malformed {} event: {}", RESPONSE_RECEIVED, e),
            });
        Ok(())
    }

    async fn fetch_body(&self, request_id: &str) -> Result<Option<BodyPayload>, TransportError> {
        let reply = self
            .session
            .call(
                "Network.getResponseBody",
                Some(json!({"requestId": request_id})),
            )
            .await;
        body_payload(reply)
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
