//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::error::CdpError;
use crate::protocol::{BrowserVersion, CdpRequest, CdpResponse, PageInfo};
use crate::session::PageSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Per-command timeout used by [`CdpClient::connect`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pending request waiting for response.
pub(crate) struct PendingRequest {
    pub tx: oneshot::Sender<Result<Value, CdpError>>,
}

pub(crate) type PendingMap = Mutex<HashMap<u64, PendingRequest>>;
pub(crate) type SessionChannels = RwLock<HashMap<String, mpsc::UnboundedSender<CdpResponse>>>;

/// Command side of the browser WebSocket, shared by the client and its sessions.
pub(crate) struct Connection {
    ws_tx: tokio::sync::Mutex<WsSink>,
    pending: Arc<PendingMap>,
    request_id: AtomicU64,
    request_timeout: Duration,
}

impl Connection {
    pub(crate) fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Send a command and wait for its reply.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, PendingRequest { tx });

        let sent = {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into())).await
        };
        if let Err(e) = sent {
            self.pending.lock().remove(&id);
            return Err(e.into());
        }

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }
}

/// Route one incoming text frame to a pending command or a session's event channel.
pub(crate) fn route_message(text: &str, pending: &PendingMap, sessions: &SessionChannels) {
    let resp = match serde_json::from_str::<CdpResponse>(text) {
        Ok(resp) => resp,
        Err(e) => {
            warn!("Failed to parse CDP message: {}", e);
            return;
        }
    };

    if let Some(id) = resp.id {
        let Some(req) = pending.lock().remove(&id) else {
            trace!("Reply for unknown request {}", id);
            return;
        };
        let result = match resp.error {
            Some(error) => Err(CdpError::Protocol {
                code: error.code,
                message: error.message,
            }),
            None => Ok(resp.result.unwrap_or(Value::Null)),
        };
        let _ = req.tx.send(result);
    } else if resp.method.is_some() {
        let session_id = resp.session_id.clone().unwrap_or_default();
        if let Some(tx) = sessions.read().get(&session_id) {
            let _ = tx.send(resp);
        }
    }
}

/// CDP client for a browser started with remote debugging.
pub struct CdpClient {
    /// HTTP endpoint for page discovery.
    http_endpoint: String,
    browser_ws_url: String,
    conn: Arc<Connection>,
    sessions: Arc<SessionChannels>,
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to the browser at `endpoint` (e.g. `http://localhost:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        Self::connect_with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT).await
    }

    /// Connect with a custom per-command timeout.
    pub async fn connect_with_timeout(
        endpoint: &str,
        request_timeout: Duration,
    ) -> Result<Self, CdpError> {
        let base = Url::parse(endpoint)?;
        let http_endpoint = base.as_str().trim_end_matches('/').to_string();

        let version_url = format!("{}/json/version", http_endpoint);
        debug!("Fetching browser version from {}", version_url);

        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;

        debug!(
            "Connected to browser: {} (protocol {})",
            version.browser, version.protocol_version
        );

        let browser_ws_url = version.web_socket_debugger_url;
        let (ws_stream, _) = tokio_tungstenite::connect_async(browser_ws_url.as_str())
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: Arc<PendingMap> = Arc::new(Mutex::new(HashMap::new()));
        let sessions: Arc<SessionChannels> = Arc::new(RwLock::new(HashMap::new()));

        let recv_task = {
            let pending = pending.clone();
            let sessions = sessions.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending, sessions).await;
            })
        };

        debug!("CDP client connected to {}", browser_ws_url);

        Ok(Self {
            http_endpoint,
            browser_ws_url,
            conn: Arc::new(Connection {
                ws_tx: tokio::sync::Mutex::new(ws_sink),
                pending,
                request_id: AtomicU64::new(1),
                request_timeout,
            }),
            sessions,
            recv_task,
        })
    }

    async fn receive_loop(
        mut ws_source: WsSource,
        pending: Arc<PendingMap>,
        sessions: Arc<SessionChannels>,
    ) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    route_message(&text, &pending, &sessions);
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        // Fail in-flight commands and end every session's event stream.
        pending.lock().clear();
        sessions.write().clear();
    }

    /// Send a browser-level command.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.conn.call(method, params, None).await
    }

    pub fn browser_ws_url(&self) -> &str {
        &self.browser_ws_url
    }

    // ========================================================================
    // Target Management
    // ========================================================================

    /// List all targets exposed by the HTTP endpoint.
    pub async fn list_pages(&self) -> Result<Vec<PageInfo>, CdpError> {
        let url = format!("{}/json/list", self.http_endpoint);
        let pages: Vec<PageInfo> = reqwest::get(&url).await?.json().await?;
        Ok(pages)
    }

    /// Open a new tab and attach to it.
    ///
    /// The tab starts blank; navigate through the returned session so the
    /// interceptor is attached before the first response.
    pub async fn new_page(&self) -> Result<PageSession, CdpError> {
        // Chrome requires PUT for /json/new
        let create_url = format!("{}/json/new", self.http_endpoint);

        let client = reqwest::Client::new();
        let page_info: PageInfo = client.put(&create_url).send().await?.json().await?;
        debug!("Created new page: {} - {}", page_info.id, page_info.url);

        self.attach_page(&page_info.id).await
    }

    /// Attach to an existing page.
    pub async fn attach_page(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.sessions.write().insert(session_id.clone(), event_tx);

        let session = PageSession::new(
            target_id.to_string(),
            session_id,
            self.conn.clone(),
            event_rx,
        );
        session.enable_domains().await?;

        Ok(session)
    }

    /// Close a page and stop routing events to sessions attached to it.
    pub async fn close_page(&self, session: &PageSession) -> Result<(), CdpError> {
        self.sessions.write().remove(session.session_id());
        self.call(
            "Target.closeTarget",
            Some(json!({"targetId": session.target_id()})),
        )
        .await?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
