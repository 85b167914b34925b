//! Event and response value types.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::TransportError;

/// HTTP status that never carries a body.
pub const NO_CONTENT: u16 = 204;

/// A response-received notification as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Opaque identifier, unique per in-flight request.
    pub request_id: String,
    pub url: String,
    pub status: u16,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Transport-specific resource classification (e.g. "XHR", "Fetch").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

impl RawEvent {
    pub fn new(request_id: impl Into<String>, url: impl Into<String>, status: u16) -> Self {
        Self {
            request_id: request_id.into(),
            url: url.into(),
            status,
            headers: HashMap::new(),
            mime_type: None,
            resource_type: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Body payload returned by [`Transport::fetch_body`](crate::Transport::fetch_body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyPayload {
    pub body: String,
    pub base64_encoded: bool,
}

impl BodyPayload {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            base64_encoded: false,
        }
    }

    pub fn base64(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            base64_encoded: true,
        }
    }

    /// Blank bodies mean the data is not there yet.
    pub fn is_blank(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Decode the payload into a [`ResponseBody`].
    pub fn decode(self) -> Result<ResponseBody, TransportError> {
        if !self.base64_encoded {
            return Ok(ResponseBody::Text(self.body));
        }
        STANDARD
            .decode(self.body.trim())
            .map(ResponseBody::Binary)
            .map_err(|e| TransportError::InvalidResponse(format!("Malformed base64 body: {}", e)))
    }
}

/// A retrieved response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Text(String),
    /// Bytes decoded from a base64 payload.
    Binary(Vec<u8>),
}

impl ResponseBody {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ResponseBody::Text(text) => text.as_bytes(),
            ResponseBody::Binary(bytes) => bytes,
        }
    }

    /// Text view of the body; binary bodies are returned only if valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Binary(bytes) => std::str::from_utf8(bytes).ok(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, ResponseBody::Binary(_))
    }
}

impl Serialize for ResponseBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            ResponseBody::Text(text) => {
                map.serialize_entry("encoding", "text")?;
                map.serialize_entry("data", text)?;
            }
            ResponseBody::Binary(bytes) => {
                map.serialize_entry("encoding", "base64")?;
                map.serialize_entry("data", &STANDARD.encode(bytes))?;
            }
        }
        map.end()
    }
}

/// The value handed to the consumer when draining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturedResponse {
    pub request_id: String,
    pub url: String,
    pub status: u16,
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub body: Option<ResponseBody>,
}

impl CapturedResponse {
    /// Build the identity fields from a popped event; the body starts absent.
    pub fn from_event(event: RawEvent) -> Self {
        Self {
            request_id: event.request_id,
            url: event.url,
            status: event.status,
            headers: event.headers,
            mime_type: event.mime_type,
            body: None,
        }
    }

    pub fn with_body(mut self, body: ResponseBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Parse a text body as JSON.
    pub fn json(&self) -> Option<serde_json::Result<serde_json::Value>> {
        self.body
            .as_ref()
            .and_then(|b| b.as_text())
            .map(serde_json::from_str)
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
