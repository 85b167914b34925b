//! CDP protocol types and message definitions.

use std::collections::HashMap;

use respsniff_core::{BodyPayload, RawEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// CDP request message.
#[derive(Debug, Serialize)]
pub struct CdpRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// CDP message: either a command reply (`id`) or an event (`method`).
#[derive(Debug, Deserialize)]
pub struct CdpResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpErrorResponse>,
    pub method: Option<String>,
    pub params: Option<Value>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// CDP error in response.
#[derive(Debug, Deserialize)]
pub struct CdpErrorResponse {
    pub code: i64,
    pub message: String,
    pub data: Option<String>,
}

/// Page info from /json endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub page_type: String,
    pub title: String,
    pub url: String,
    pub web_socket_debugger_url: Option<String>,
}

/// Browser version info.
///
/// Chrome returns PascalCase field names for this endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "Protocol-Version")]
    pub protocol_version: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

// ============================================================================
// Network Types
// ============================================================================

/// Event name for response notifications.
pub const RESPONSE_RECEIVED: &str = "Network.responseReceived";

/// Parameters of `Network.responseReceived`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseReceived {
    pub request_id: String,
    pub loader_id: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub response: NetworkResponse,
}

/// `Network.Response` object.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkResponse {
    pub url: String,
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    /// Header values are strings in practice; anything else is stringified.
    #[serde(default)]
    pub headers: HashMap<String, Value>,
    pub mime_type: Option<String>,
}

impl ResponseReceived {
    pub fn into_raw_event(self) -> RawEvent {
        let headers = self
            .response
            .headers
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (name, value)
            })
            .collect();

        RawEvent {
            request_id: self.request_id,
            url: self.response.url,
            status: self.response.status,
            headers,
            mime_type: self.response.mime_type,
            resource_type: self.resource_type,
        }
    }
}

/// Result of `Network.getResponseBody`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResponseBody {
    pub body: String,
    pub base64_encoded: bool,
}

impl From<GetResponseBody> for BodyPayload {
    fn from(result: GetResponseBody) -> Self {
        BodyPayload {
            body: result.body,
            base64_encoded: result.base64_encoded,
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
