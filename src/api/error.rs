//
//  graph-login
//  api/error.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Error types for Graph API operations
//!
//! Every adapter call either fully succeeds with a normalized response or
//! fails with one [`GraphError`]. Nothing is retried locally.
//!
//! Remote error payloads come in several historical shapes:
//!
//! ```json
//! {"error": "invalid_request", "error_description": "OAuth 2.0 draft 10"}
//! {"error": {"message": "Invalid OAuth access token.", "type": "OAuthException", "code": 190}}
//! {"error_code": 100, "error_msg": "REST server style"}
//! ```
//!
//! [`ApiError::from_payload`] runs an ordered list of extractors over the
//! payload; the first non-empty message wins, and the raw payload is the
//! final fallback.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Errors returned by the Graph API adapter and facade.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Network failure, TLS failure or timeout.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote endpoint returned a structured error payload.
    #[error("{0}")]
    Api(ApiError),

    /// The response was neither JSON, an image, nor a token query string.
    #[error("Unsupported response content type: {0}")]
    UnsupportedContentType(String),

    /// A write operation was attempted without an access token.
    #[error("Write operations require an access token")]
    AuthRequired,

    /// The response declared JSON but the body did not parse.
    #[error("Invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Pagination followed more pages than the configured limit.
    #[error("Pagination exceeded the limit of {0} pages")]
    PageLimit(usize),
}

impl GraphError {
    /// Returns the structured API error, if this is one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for GraphError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

/// A normalized remote error.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status, when the error came from a non-2xx response
    pub status: Option<u16>,
    /// Error type or code name (`error_code` or `error.type`); empty when unknown
    pub kind: String,
    /// Numeric `error.code`, when present
    pub code: Option<i64>,
    /// Best-effort human readable message
    pub message: String,
    /// The untouched payload
    pub payload: Value,
}

type MessageExtractor = fn(&Value) -> Option<String>;

// OAuth 2.0 draft 10, OAuth 2.0 draft 00, REST server style.
const MESSAGE_EXTRACTORS: &[MessageExtractor] = &[error_description, nested_message, error_msg];

const KIND_EXTRACTORS: &[MessageExtractor] = &[error_code, nested_type];

fn error_description(payload: &Value) -> Option<String> {
    non_empty(payload.get("error_description"))
}

fn nested_message(payload: &Value) -> Option<String> {
    non_empty(payload.get("error").and_then(|e| e.get("message")))
}

fn error_msg(payload: &Value) -> Option<String> {
    non_empty(payload.get("error_msg"))
}

fn error_code(payload: &Value) -> Option<String> {
    non_empty(payload.get("error_code"))
}

fn nested_type(payload: &Value) -> Option<String> {
    non_empty(payload.get("error").and_then(|e| e.get("type")))
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl ApiError {
    /// Builds an error from a payload, running the extractors in order.
    pub fn from_payload(payload: Value) -> Self {
        let message = MESSAGE_EXTRACTORS
            .iter()
            .find_map(|extract| extract(&payload))
            .unwrap_or_else(|| match &payload {
                Value::String(raw) => raw.clone(),
                other => other.to_string(),
            });

        let kind = KIND_EXTRACTORS
            .iter()
            .find_map(|extract| extract(&payload))
            .unwrap_or_default();

        let code = payload
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(Value::as_i64);

        Self {
            status: None,
            kind,
            code,
            message,
            payload,
        }
    }

    /// Builds an error from a raw response body, keeping non-JSON bodies as strings.
    pub fn from_body(body: &str) -> Self {
        let payload = serde_json::from_str::<Value>(body)
            .unwrap_or_else(|_| Value::String(body.to_string()));
        Self::from_payload(payload)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.status, self.kind.is_empty()) {
            (Some(status), false) => write!(f, "API error {} ({}): {}", status, self.kind, self.message),
            (Some(status), true) => write!(f, "API error {}: {}", status, self.message),
            (None, false) => write!(f, "API error ({}): {}", self.kind, self.message),
            (None, true) => write!(f, "API error: {}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_description_wins() {
        let err = ApiError::from_payload(json!({
            "error_description": "draft 10",
            "error": {"message": "draft 00"},
            "error_msg": "rest",
        }));
        assert_eq!(err.message, "draft 10");
    }

    #[test]
    fn test_nested_error_message() {
        let err = ApiError::from_payload(json!({
            "error": {"message": "Invalid OAuth access token.", "type": "OAuthException", "code": 190}
        }));
        assert_eq!(err.message, "Invalid OAuth access token.");
        assert_eq!(err.kind, "OAuthException");
        assert_eq!(err.code, Some(190));
    }

    #[test]
    fn test_rest_style_message_and_code() {
        let err = ApiError::from_payload(json!({"error_code": 100, "error_msg": "bad param"}));
        assert_eq!(err.message, "bad param");
        assert_eq!(err.kind, "100");
        assert_eq!(err.code, None);
    }

    #[test]
    fn test_empty_fields_fall_through() {
        let err = ApiError::from_payload(json!({"error_description": "", "error_msg": "rest"}));
        assert_eq!(err.message, "rest");
    }

    #[test]
    fn test_raw_payload_fallback() {
        let err = ApiError::from_body("something broke");
        assert_eq!(err.message, "something broke");
        assert_eq!(err.kind, "");

        let err = ApiError::from_payload(json!({"unexpected": true}));
        assert_eq!(err.message, r#"{"unexpected":true}"#);
    }

    #[test]
    fn test_display_includes_status() {
        let err = ApiError::from_payload(json!({"error": {"message": "nope", "type": "OAuthException"}}))
            .with_status(400);
        assert_eq!(err.to_string(), "API error 400 (OAuthException): nope");
        assert_eq!(GraphError::from(err).to_string(), "API error 400 (OAuthException): nope");
    }
}
