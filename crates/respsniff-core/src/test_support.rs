//! In-memory transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::TransportError;
use crate::transport::{ResponseListener, Transport};
use crate::types::{BodyPayload, RawEvent};

#[derive(Default)]
pub(crate) struct FakeTransport {
    pub(crate) listeners: Mutex<Vec<Arc<dyn ResponseListener>>>,
    /// Scripted replies per request id; the last reply repeats.
    pub(crate) bodies: Mutex<HashMap<String, VecDeque<Option<BodyPayload>>>>,
    pub(crate) fetches: Mutex<HashMap<String, usize>>,
    pub(crate) fail_attach: bool,
    pub(crate) fail_fetch: bool,
}

impl FakeTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn emit(&self, event: RawEvent) {
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener.on_response(event.clone());
        }
    }

    pub(crate) fn set_body(&self, request_id: &str, payload: BodyPayload) {
        self.script_bodies(request_id, vec![Some(payload)]);
    }

    pub(crate) fn script_bodies(&self, request_id: &str, replies: Vec<Option<BodyPayload>>) {
        self.bodies
            .lock()
            .insert(request_id.to_string(), replies.into_iter().collect());
    }

    pub(crate) fn fetch_count(&self, request_id: &str) -> usize {
        self.fetches.lock().get(request_id).copied().unwrap_or(0)
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    fn add_response_listener(
        &self,
        listener: Arc<dyn ResponseListener>,
    ) -> Result<(), TransportError> {
        if self.fail_attach {
            return Err(TransportError::ConnectionClosed);
        }
        self.listeners.lock().push(listener);
        Ok(())
    }

    async fn fetch_body(&self, request_id: &str) -> Result<Option<BodyPayload>, TransportError> {
        *self.fetches.lock().entry(request_id.to_string()).or_insert(0) += 1;
        if self.fail_fetch {
            return Err(TransportError::ConnectionClosed);
        }
        let mut bodies = self.bodies.lock();
        let Some(replies) = bodies.get_mut(request_id) else {
            return Ok(None);
        };
        let reply = if replies.len() > 1 {
            replies.pop_front().flatten()
        } else {
            replies.front().cloned().flatten()
        };
        Ok(reply)
    }
}
