//! Transport contract: request/response shapes, the backend seam and the
//! credential provider consulted when a request is built.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// HTTP verbs used by the employee API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl core::fmt::Display for Method {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as handed to the backend, after interceptors ran.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/employees/e9`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Whether a bearer credential is attached.
    pub fn is_authenticated(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
}

pub const AUTHORIZATION: &str = "Authorization";
pub const REQUEST_ID: &str = "X-Request-Id";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("API error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },

    /// The response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// The request body could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),
}

impl TransportError {
    /// Build a status error from an error body, picking up `{ "message": .. }`.
    pub fn from_status(status: u16, body: &Value) -> Self {
        TransportError::Status {
            status,
            message: server_message(body),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The human-readable message supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            TransportError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Extract a non-empty `message` string from an error body.
pub fn server_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Raw request issuer (reqwest in production, scripted in tests).
///
/// Implementations must map every non-2xx response to
/// `TransportError::Status`.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Source of the bearer credential attached to outgoing requests.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Holder for the credential that the session installs and clears.
///
/// This replaces a mutable default-header map on the transport: the
/// transport only reads it when building a request.
#[derive(Debug, Default)]
pub struct CredentialSlot {
    token: Mutex<Option<String>>,
}

impl CredentialSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, token: impl Into<String>) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear(&self) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_installed(&self) -> bool {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

impl CredentialProvider for CredentialSlot {
    fn bearer_token(&self) -> Option<String> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_error_picks_up_server_message() {
        let err = TransportError::from_status(409, &json!({ "message": "Email already in use" }));
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.server_message(), Some("Email already in use"));
        assert_eq!(err.to_string(), "API error (409): Email already in use");
    }

    #[test]
    fn blank_or_missing_messages_are_ignored() {
        assert_eq!(server_message(&json!({ "message": "   " })), None);
        assert_eq!(server_message(&json!({ "error": "x" })), None);
        assert_eq!(server_message(&json!("plain text")), None);
    }

    #[test]
    fn credential_slot_install_and_clear() {
        let slot = CredentialSlot::new();
        assert_eq!(slot.bearer_token(), None);
        slot.install("tok");
        assert_eq!(slot.bearer_token().as_deref(), Some("tok"));
        slot.clear();
        assert!(!slot.is_installed());
    }
}
