//! Capture error types.

use std::time::Duration;

use thiserror::Error;

/// Failures reported by a [`Transport`](crate::Transport) implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying connection went away.
    #[error("Transport connection closed")]
    ConnectionClosed,

    /// The remote end rejected a command.
    #[error("Protocol error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// The remote end answered with something we could not interpret.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Any other transport-level failure.
    #[error("Transport error: {0}")]
    Other(String),
}

/// Errors surfaced by the capture engine.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No settled response became available within the requested window.
    ///
    /// Nothing is lost: queued events stay queued for a later call.
    #[error("Timed out after {0:?} waiting for a settled response")]
    Timeout(Duration),

    /// No Tokio runtime was available to drive the quiet-period timers.
    #[error("Tokio runtime unavailable: {0}")]
    Runtime(String),

    /// The transport failed while attaching the handler or fetching a body.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CaptureError {
    /// Whether this is the timeout outcome rather than a transport failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CaptureError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = CaptureError::Timeout(Duration::from_millis(100));
        assert!(err.to_string().contains("100ms"));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_transport_is_distinguishable() {
        let err = CaptureError::from(TransportError::ConnectionClosed);
        assert!(!err.is_timeout());
        assert!(matches!(err, CaptureError::Transport(TransportError::ConnectionClosed)));
    }

    #[test]
    fn test_protocol_display() {
        let err = TransportError::Protocol {
            code: -32000,
            message: "No resource with given identifier found".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("-32000"));
        assert!(display.contains("No resource"));
    }
}
