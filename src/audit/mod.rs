//
//  graph-login
//  audit/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Request Audit Log
//!
//! Every outbound Graph API call is recorded to an append-only audit log.
//! The log is a separate collaborator from the HTTP transport:
//! [`GraphClient`](crate::api::GraphClient) performs the call first and then
//! hands an [`AuditEntry`] to the configured [`AuditLog`]. A failing audit
//! write is reported through `tracing` and never changes the call's result.
//!
//! ## Implementations
//!
//! | Type | Destination |
//! |------|-------------|
//! | [`JsonlAuditLog`] | One JSON object per line in a local file |
//! | [`TracingAuditLog`] | `tracing::debug!` events only |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use url::Url;

const REDACTED: &str = "[redacted]";

/// One outbound call as seen by the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub url: String,
    pub timeout_secs: u64,
    pub params: Vec<(String, String)>,
    pub body: Option<Vec<(String, String)>>,
    /// File names only; contents are never logged
    pub files: Vec<String>,
    /// HTTP status, or `None` when the transport failed
    pub status: Option<u16>,
}

impl AuditEntry {
    /// Replaces secret parameter values with a placeholder.
    pub fn redacted(mut self) -> Self {
        self.url = redact_url(&self.url);
        redact(&mut self.params);
        if let Some(body) = self.body.as_mut() {
            redact(body);
        }
        self
    }
}

fn is_secret(key: &str) -> bool {
    matches!(
        key,
        "access_token" | "client_secret" | "fb_exchange_token" | "input_token" | "code"
    )
}

fn redact(pairs: &mut [(String, String)]) {
    for (key, value) in pairs.iter_mut() {
        if is_secret(key) {
            *value = REDACTED.to_string();
        }
    }
}

/// Masks secret query parameters embedded in a URL.
///
/// Paging links returned by the API carry the access token in their query
/// string. Unparseable input is returned unchanged.
pub fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };
    if !url.query_pairs().any(|(key, _)| is_secret(&key)) {
        return raw.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if is_secret(&key) {
                REDACTED.to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}

/// Append-only sink for [`AuditEntry`] records.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> Result<()>;
}

/// Audit log that only emits `tracing` events.
#[derive(Debug, Default, Clone)]
pub struct TracingAuditLog;

#[async_trait]
impl AuditLog for TracingAuditLog {
    async fn record(&self, entry: &AuditEntry) -> Result<()> {
        tracing::debug!(
            method = %entry.method,
            url = %entry.url,
            status = ?entry.status,
            "graph request"
        );
        Ok(())
    }
}

/// Audit log appending JSON lines to a file.
#[derive(Debug, Clone)]
pub struct JsonlAuditLog {
    path: PathBuf,
}

impl JsonlAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditLog for JsonlAuditLog {
    async fn record(&self, entry: &AuditEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open audit log {}", self.path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> AuditEntry {
        AuditEntry {
            timestamp: Utc::now(),
            method: "POST".to_string(),
            url: "https://graph.facebook.com/me/feed".to_string(),
            timeout_secs: 60,
            params: vec![("fields".into(), "id".into())],
            body: Some(vec![
                ("message".into(), "hi".into()),
                ("access_token".into(), "secret".into()),
            ]),
            files: vec![],
            status: Some(200),
        }
    }

    #[test]
    fn test_redaction() {
        let redacted = entry().redacted();
        let body = redacted.body.unwrap();
        assert_eq!(body[0].1, "hi");
        assert_eq!(body[1].1, REDACTED);
        assert_eq!(redacted.params[0].1, "id");
    }

    #[test]
    fn test_redaction_covers_url_query() {
        let mut raw = entry();
        raw.url = "https://graph.facebook.com/v2.5/me/photos?access_token=SECRET&after=x".to_string();
        let redacted = raw.redacted();
        assert!(!redacted.url.contains("SECRET"));
        assert!(redacted.url.contains("after=x"));
        assert!(redacted.url.starts_with("https://graph.facebook.com/v2.5/me/photos?"));
    }

    #[test]
    fn test_redact_url_leaves_plain_urls_alone() {
        let url = "https://graph.facebook.com/me?fields=id";
        assert_eq!(redact_url(url), url);
        assert_eq!(redact_url("not a url"), "not a url");
    }

    #[tokio::test]
    async fn test_jsonl_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonlAuditLog::new(dir.path().join("nested").join("requests.jsonl"));

        log.record(&entry()).await.unwrap();
        log.record(&entry()).await.unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: AuditEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.method, "POST");
    }
}
