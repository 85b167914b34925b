//! CDP error types.

use respsniff_core::TransportError;
use thiserror::Error;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to the browser.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Browser not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Error object returned for a command.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (for endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CdpError {
    /// Whether the browser answered the command with an error object.
    ///
    /// The connection is still healthy in that case.
    pub fn is_protocol(&self) -> bool {
        matches!(self, CdpError::Protocol { .. })
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for TransportError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::Protocol { code, message } => TransportError::Protocol { code, message },
            CdpError::SessionClosed | CdpError::WebSocket(_) => TransportError::ConnectionClosed,
            CdpError::Serialization(e) => TransportError::InvalidResponse(e.to_string()),
            CdpError::InvalidResponse(message) => TransportError::InvalidResponse(message),
            other => TransportError::Other(other.to_string()),
        }
    }
}
