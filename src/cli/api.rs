//
//  graph-login
//  cli/api.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Direct API access command
//!
//! Sends one request through the same adapter every other command uses, so
//! URL normalization, token injection and response classification behave
//! identically. Useful for endpoints without a dedicated command and for
//! debugging.
//!
//! ## Examples
//!
//! ```bash
//! # Read the current user
//! graph api me -q fields=id,name
//!
//! # Fields imply POST
//! graph api me/feed -F message="Hello, world"
//!
//! # Follow paging.next and print every item
//! graph api me/photos --paginate
//!
//! # Save a binary response
//! graph api 4/picture -o avatar.jpg
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use reqwest::Method;

use crate::api::{GraphRequest, GraphResponse, DEFAULT_TIMEOUT_SECS};
use crate::output::write_json;

use super::{parse_pairs, GlobalOptions, Runtime};

/// Make raw Graph API requests
#[derive(Args, Debug)]
pub struct ApiCommand {
    /// Path relative to the API version (e.g. `me/photos`) or an absolute URL
    pub endpoint: String,

    /// HTTP method; defaults to POST when fields are given, GET otherwise
    #[arg(long, short = 'X')]
    pub method: Option<String>,

    /// Body field (key=value, repeatable); sent as query parameters with -X GET
    #[arg(long, short = 'F', action = clap::ArgAction::Append)]
    pub field: Vec<String>,

    /// Query parameter (key=value, repeatable)
    #[arg(long, short = 'q', action = clap::ArgAction::Append)]
    pub query: Vec<String>,

    /// Follow `paging.next` and print every item
    #[arg(long)]
    pub paginate: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Write a binary response to this file
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

impl ApiCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let runtime = Runtime::load(global)?;
        let token = runtime.optional_token(global)?;
        let request = self.build_request()?;

        if self.paginate {
            let items = runtime.client.get_all(token.as_deref(), request).await?;
            return write_json(&serde_json::json!({ "data": items }));
        }

        let response = runtime.client.request(token.as_deref(), request).await?;
        self.print_response(response)
    }

    fn parse_method(&self) -> Result<Option<Method>> {
        self.method
            .as_deref()
            .map(|method| {
                Method::from_bytes(method.to_uppercase().as_bytes())
                    .with_context(|| format!("Unsupported HTTP method: {}", method))
            })
            .transpose()
    }

    fn build_request(&self) -> Result<GraphRequest> {
        let method = self.parse_method()?;
        let fields = parse_pairs(&self.field)?;

        let mut request = GraphRequest::new(self.endpoint.as_str())
            .params(parse_pairs(&self.query)?)
            .timeout(Duration::from_secs(self.timeout));

        match method {
            Some(Method::GET) => {
                request = request.params(fields).method(Method::GET);
            }
            Some(method) => {
                if !fields.is_empty() {
                    request = request.body(fields);
                }
                request = request.method(method);
            }
            None if !fields.is_empty() => request = request.body(fields),
            None => {}
        }

        Ok(request)
    }

    fn print_response(&self, response: GraphResponse) -> Result<()> {
        match (&self.output, response) {
            (Some(path), GraphResponse::Binary { data, mime_type, .. }) => {
                std::fs::write(path, &data)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!(
                    "{} Saved {} bytes of {} to {}",
                    style("✓").green(),
                    data.len(),
                    mime_type,
                    path.display()
                );
                Ok(())
            }
            (None, GraphResponse::Binary { data, mime_type, url }) => write_json(&serde_json::json!({
                "mime-type": mime_type,
                "url": url,
                "size": data.len(),
            })),
            (_, other) => write_json(&other.to_value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        api: ApiCommand,
    }

    fn parse(args: &[&str]) -> ApiCommand {
        Wrapper::try_parse_from(std::iter::once("api").chain(args.iter().copied()))
            .unwrap()
            .api
    }

    #[test]
    fn test_fields_imply_post() {
        let request = parse(&["me/feed", "-F", "message=hi"]).build_request().unwrap();
        assert_eq!(request.resolved_method(), Method::POST);
        assert!(request.is_write());
    }

    #[test]
    fn test_get_fields_become_query() {
        let request = parse(&["me", "-X", "get", "-F", "fields=id"])
            .build_request()
            .unwrap();
        assert_eq!(request.resolved_method(), Method::GET);
        assert!(!request.is_write());
        assert_eq!(request.params, vec![("fields".to_string(), "id".to_string())]);
    }

    #[test]
    fn test_explicit_delete_and_timeout() {
        let request = parse(&["123", "-X", "DELETE", "--timeout", "5"])
            .build_request()
            .unwrap();
        assert_eq!(request.resolved_method(), Method::DELETE);
        assert_eq!(request.timeout, Duration::from_secs(5));
    }
}
