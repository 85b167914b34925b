//! CDP page session and event dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::client::Connection;
use crate::error::CdpError;
use crate::protocol::CdpResponse;

/// Callback for a session event, invoked with the event's `params`.
pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Event handlers keyed by CDP method name.
#[derive(Default)]
pub(crate) struct EventRouter {
    handlers: RwLock<HashMap<String, Vec<EventHandler>>>,
}

impl EventRouter {
    pub(crate) fn add(&self, method: &str, handler: EventHandler) {
        self.handlers
            .write()
            .entry(method.to_string())
            .or_default()
            .push(handler);
    }

    pub(crate) fn handler_count(&self, method: &str) -> usize {
        self.handlers.read().get(method).map_or(0, Vec::len)
    }

    /// Invoke every handler registered for the event's method, in registration order.
    ///
    /// Returns the number of handlers invoked.
    pub(crate) fn dispatch(&self, event: CdpResponse) -> usize {
        let Some(method) = event.method else {
            return 0;
        };
        // Snapshot so a handler may register further handlers.
        let handlers = match self.handlers.read().get(&method) {
            Some(handlers) => handlers.clone(),
            None => return 0,
        };
        let params = event.params.unwrap_or(Value::Null);
        trace!("Dispatching {} to {} handler(s)", method, handlers.len());
        for handler in &handlers {
            handler(&params);
        }
        handlers.len()
    }
}

async fn pump_events(
    mut event_rx: mpsc::UnboundedReceiver<CdpResponse>,
    router: Arc<EventRouter>,
    session_id: String,
) {
    while let Some(event) = event_rx.recv().await {
        router.dispatch(event);
    }
    debug!("Event stream for session {} ended", session_id);
}

/// A session attached to a single page/target.
pub struct PageSession {
    target_id: String,
    session_id: String,
    conn: Arc<Connection>,
    router: Arc<EventRouter>,
    pump: JoinHandle<()>,
}

impl PageSession {
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        conn: Arc<Connection>,
        event_rx: mpsc::UnboundedReceiver<CdpResponse>,
    ) -> Self {
        let router = Arc::new(EventRouter::default());
        let pump = tokio::spawn(pump_events(event_rx, router.clone(), session_id.clone()));
        Self {
            target_id,
            session_id,
            conn,
            router,
            pump,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.conn.call(method, params, Some(&self.session_id)).await
    }

    /// Register a handler for events named `method` (e.g. `Network.responseReceived`).
    ///
    /// Handlers run on the session's event task and must not block.
    pub fn add_event_handler<F>(&self, method: &str, handler: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.router.add(method, Arc::new(handler));
    }

    pub fn handler_count(&self, method: &str) -> usize {
        self.router.handler_count(method)
    }

    /// Enable the domains whose events and commands the capture relies on.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        self.call("Network.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Navigate to URL and wait until the document is interactive.
    pub async fn navigate(&self, url: &str) -> Result<String, CdpError> {
        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText") {
            return Err(CdpError::NavigationFailed(
                error.as_str().unwrap_or("Unknown error").to_string(),
            ));
        }

        let frame_id = result["frameId"].as_str().unwrap_or("main").to_string();

        self.wait_for_load().await?;

        debug!("Navigated to {}", url);
        Ok(frame_id)
    }

    /// Poll `document.readyState` until interactive or complete.
    pub async fn wait_for_load(&self) -> Result<(), CdpError> {
        let deadline = Instant::now() + self.conn.request_timeout();

        loop {
            let state = self.evaluate("document.readyState").await?;
            if matches!(state.as_str(), Some("complete" | "interactive")) {
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(CdpError::Timeout("Page load timeout".to_string()));
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Evaluate a JavaScript expression and return its value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["text"].as_str().unwrap_or("Unknown error");
            return Err(CdpError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
