//
//  graph-login
//  api/request.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Graph Request Descriptor
//!
//! A [`GraphRequest`] captures everything needed to perform exactly one call
//! against the Graph API: the target path, query parameters, optional body
//! parameters, optional file parts, an optional verb, and a timeout.
//!
//! The descriptor is plain data. [`GraphClient`](super::GraphClient) turns it
//! into an HTTP request, injecting the access token and normalizing the path.
//!
//! ## Verb Resolution
//!
//! | Explicit verb | Body present | Resolved verb |
//! |---------------|--------------|---------------|
//! | `Some(m)`     | any          | `m`           |
//! | `None`        | yes          | `POST`        |
//! | `None`        | no           | `GET`         |
//!
//! ## Example
//!
//! ```rust
//! use graph_login::api::GraphRequest;
//! use reqwest::Method;
//!
//! let request = GraphRequest::new("me/feed")
//!     .body_param("message", "Hello, world");
//!
//! assert_eq!(request.resolved_method(), Method::POST);
//! ```

use std::time::Duration;

use reqwest::Method;

/// Default per-call timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// A named file payload sent as one part of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    /// Form field name (e.g. `source` for photo uploads)
    pub field: String,
    /// File name reported to the server
    pub file_name: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
    /// Declared media type, if known
    pub mime_type: Option<String>,
}

impl FilePart {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            bytes,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Description of a single Graph API call.
///
/// Parameters are kept as ordered `(key, value)` pairs so that the wire
/// representation is deterministic.
///
/// # Invariants
///
/// - When `body` is `Some` and `method` is `None`, the call is a write (`POST`).
/// - `timeout` defaults to [`DEFAULT_TIMEOUT_SECS`].
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRequest {
    /// Relative path (`me/feed`) or absolute URL (`https://...`)
    pub path: String,
    /// Query string parameters
    pub params: Vec<(String, String)>,
    /// Body parameters; presence marks the call as a write
    pub body: Option<Vec<(String, String)>>,
    /// Files sent as multipart parts
    pub files: Vec<FilePart>,
    /// Explicit HTTP verb
    pub method: Option<Method>,
    /// Transport timeout for this call
    pub timeout: Duration,
}

impl GraphRequest {
    /// Creates a read request for `path` with no parameters.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
            body: None,
            files: Vec::new(),
            method: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Appends a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Appends every pair in `params` to the query string.
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Appends a body parameter, turning the request into a write.
    pub fn body_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.body
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Sets the body parameters. An empty list still marks the call as a write.
    pub fn body<I, K, V>(mut self, body: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Some(
            body.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Attaches a file part.
    pub fn file(mut self, file: FilePart) -> Self {
        self.files.push(file);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns true when the request carries body parameters.
    pub fn is_write(&self) -> bool {
        self.body.is_some()
    }

    /// Resolves the HTTP verb: explicit verb, then `POST` for writes, else `GET`.
    pub fn resolved_method(&self) -> Method {
        match &self.method {
            Some(method) => method.clone(),
            None if self.is_write() => Method::POST,
            None => Method::GET,
        }
    }

    /// Adds the access token to the body for writes, or to the query otherwise.
    pub(crate) fn inject_token(&mut self, token: &str) {
        let pair = ("access_token".to_string(), token.to_string());
        match self.body.as_mut() {
            Some(body) => body.push(pair),
            None => self.params.push(pair),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_get() {
        let request = GraphRequest::new("me");
        assert_eq!(request.resolved_method(), Method::GET);
        assert_eq!(request.timeout, Duration::from_secs(60));
        assert!(!request.is_write());
    }

    #[test]
    fn test_body_implies_post() {
        let request = GraphRequest::new("me/likes").body(Vec::<(String, String)>::new());
        assert!(request.is_write());
        assert_eq!(request.resolved_method(), Method::POST);
    }

    #[test]
    fn test_explicit_method_wins() {
        let request = GraphRequest::new("123")
            .body_param("message", "hi")
            .method(Method::DELETE);
        assert_eq!(request.resolved_method(), Method::DELETE);
    }

    #[test]
    fn test_token_goes_to_query_for_reads() {
        let mut request = GraphRequest::new("me");
        request.inject_token("tok");
        assert_eq!(
            request.params,
            vec![("access_token".to_string(), "tok".to_string())]
        );
        assert!(request.body.is_none());
    }

    #[test]
    fn test_token_goes_to_body_for_writes() {
        let mut request = GraphRequest::new("me/feed").body_param("message", "hi");
        request.inject_token("tok");
        assert!(request.params.is_empty());
        assert_eq!(
            request.body.unwrap(),
            vec![
                ("message".to_string(), "hi".to_string()),
                ("access_token".to_string(), "tok".to_string()),
            ]
        );
    }
}
