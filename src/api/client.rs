//
//  graph-login
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Client Wrapper for the Graph API
//!
//! This module provides the request/response adapter every other part of the
//! crate builds on. One call to [`GraphClient::request`] performs exactly one
//! HTTP round trip and returns a normalized [`GraphResponse`].
//!
//! ## Features
//!
//! - Path normalization against the API base URL and version
//! - Access token injection (query string for reads, body for writes)
//! - Form-urlencoded and multipart bodies
//! - Content-type based response classification
//! - Audit logging as a separate step after the transport call

use std::sync::Arc;

use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response};

use super::error::{ApiError, GraphError};
use super::request::GraphRequest;
use super::response::GraphResponse;
use crate::audit::{redact_url, AuditEntry, AuditLog, TracingAuditLog};
use crate::config::ApiConfig;

/// The public Graph API host.
pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/";

/// The adapter between [`GraphRequest`] descriptors and the Graph API.
///
/// The client itself holds no credentials; the access token is passed per
/// call so that authenticated and unauthenticated calls can share one client.
///
/// # Example
///
/// ```rust,no_run
/// use graph_login::api::{GraphClient, GraphRequest};
///
/// # async fn example() -> Result<(), graph_login::api::GraphError> {
/// let client = GraphClient::new()?.with_version("v2.5");
/// let me = client.request(Some("token"), GraphRequest::new("me")).await?;
/// println!("{:?}", me.as_json());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GraphClient {
    /// The underlying HTTP client
    http: Client,
    /// Base URL relative paths are joined onto
    base_url: String,
    /// Optional API version segment (e.g. `v2.5`)
    version: Option<String>,
    /// Sink for per-call audit entries
    audit: Arc<dyn AuditLog>,
    /// Optional pagination cap; `None` follows links until exhausted
    max_pages: Option<usize>,
}

impl GraphClient {
    /// Creates a client for the public Graph API host with tracing-only auditing.
    pub fn new() -> Result<Self, GraphError> {
        Ok(Self {
            http: Client::builder()
                .user_agent(format!("graph/{}", crate::VERSION))
                .build()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            version: None,
            audit: Arc::new(TracingAuditLog),
            max_pages: None,
        })
    }

    /// Creates a client from the `[api]` configuration section.
    ///
    /// Empty version strings and a `max_pages` of zero are treated as unset.
    pub fn from_config(config: &ApiConfig) -> Result<Self, GraphError> {
        let mut client = Self::new()?
            .with_base_url(&config.base_url)
            .with_version(&config.version);
        if config.max_pages > 0 {
            client = client.with_max_pages(config.max_pages);
        }
        Ok(client)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        let version = version.trim_matches('/');
        self.version = (!version.is_empty()).then(|| version.to_string());
        self
    }

    pub fn with_audit_log(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn max_pages(&self) -> Option<usize> {
        self.max_pages
    }

    /// Resolves a path into a full URL.
    ///
    /// Absolute `http://` and `https://` URLs are returned unchanged. Relative
    /// paths become `{base}/{version}/{path}`, ignoring a leading `/`.
    ///
    /// ```rust,no_run
    /// use graph_login::api::GraphClient;
    ///
    /// let client = GraphClient::new()?.with_version("v2.5");
    /// assert_eq!(client.url("/me"), "https://graph.facebook.com/v2.5/me");
    /// assert_eq!(client.url("https://example.com/next"), "https://example.com/next");
    /// # Ok::<(), graph_login::api::GraphError>(())
    /// ```
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("https://") || path.starts_with("http://") {
            return path.to_string();
        }

        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        match &self.version {
            Some(version) => format!("{}/{}/{}", base, version, path),
            None => format!("{}/{}", base, path),
        }
    }

    /// Performs exactly one HTTP call and normalizes the response.
    ///
    /// # Parameters
    ///
    /// * `token` - Access token to inject, or `None` for app-level calls
    /// * `request` - The call to perform
    ///
    /// # Errors
    ///
    /// - [`GraphError::Transport`] on network failure or timeout
    /// - [`GraphError::Api`] on a non-2xx status, or a token body without a token
    /// - [`GraphError::Decode`] / [`GraphError::UnsupportedContentType`] on
    ///   unreadable responses
    pub async fn request(
        &self,
        token: Option<&str>,
        mut request: GraphRequest,
    ) -> Result<GraphResponse, GraphError> {
        if let Some(token) = token {
            request.inject_token(token);
        }

        let method = request.resolved_method();
        let url = self.url(&request.path);
        tracing::debug!("{} {}", method, redact_url(&url));

        let sent = self.transport(&method, &url, &request).await;
        self.audit(
            &method,
            &url,
            &request,
            sent.as_ref().ok().map(|r| r.status().as_u16()),
        )
        .await;

        normalize(sent?).await
    }

    async fn transport(
        &self,
        method: &Method,
        url: &str,
        request: &GraphRequest,
    ) -> reqwest::Result<Response> {
        let mut builder = self
            .http
            .request(method.clone(), url)
            .timeout(request.timeout)
            .query(&request.params);

        if !request.files.is_empty() {
            let mut form = Form::new();
            for (key, value) in request.body.iter().flatten() {
                form = form.text(key.clone(), value.clone());
            }
            for file in &request.files {
                let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                if let Some(mime) = &file.mime_type {
                    part = part.mime_str(mime)?;
                }
                form = form.part(file.field.clone(), part);
            }
            builder = builder.multipart(form);
        } else if let Some(body) = &request.body {
            builder = builder.form(body);
        }

        builder.send().await
    }

    async fn audit(&self, method: &Method, url: &str, request: &GraphRequest, status: Option<u16>) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            method: method.to_string(),
            url: url.to_string(),
            timeout_secs: request.timeout.as_secs(),
            params: request.params.clone(),
            body: request.body.clone(),
            files: request.files.iter().map(|f| f.file_name.clone()).collect(),
            status,
        }
        .redacted();

        if let Err(err) = self.audit.record(&entry).await {
            tracing::warn!("Failed to record audit entry for {}: {:#}", entry.url, err);
        }
    }
}

/// Turns a raw HTTP response into a [`GraphResponse`] or an API error.
async fn normalize(response: Response) -> Result<GraphResponse, GraphError> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let url = response.url().to_string();
    let body = response.bytes().await?;

    if !status.is_success() {
        let text = String::from_utf8_lossy(&body);
        return Err(ApiError::from_body(&text)
            .with_status(status.as_u16())
            .into());
    }

    GraphResponse::classify(&content_type, &url, &body)
}
