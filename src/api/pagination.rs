//
//  graph-login
//  api/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Cursor pagination over Graph API collections
//!
//! Collection endpoints return one page at a time:
//!
//! ```json
//! {
//!     "data": [{"id": "1"}, {"id": "2"}],
//!     "paging": {"next": "https://graph.facebook.com/v2.5/me/photos?after=..."}
//! }
//! ```
//!
//! [`GraphClient::get_all`] performs the initial call, then follows
//! `paging.next` until a page has none, concatenating every page's `data`
//! list in order. The whole result is materialized before returning.
//!
//! # Notes
//!
//! - Follow-up links already carry their own query string, so the initial
//!   request's parameters are not re-sent. The access token is re-added only
//!   when the link does not carry one.
//! - There is no page cap unless one was configured with
//!   [`GraphClient::with_max_pages`]; exceeding it is an error, never a
//!   silent truncation.

use serde_json::Value;

use crate::audit::redact_url;

use super::client::GraphClient;
use super::error::GraphError;
use super::request::GraphRequest;

impl GraphClient {
    /// Fetches every page of a collection and returns the concatenated `data`.
    ///
    /// # Errors
    ///
    /// Any error from an individual page call, or [`GraphError::PageLimit`]
    /// when a configured page cap is exceeded.
    pub async fn get_all(
        &self,
        token: Option<&str>,
        request: GraphRequest,
    ) -> Result<Vec<Value>, GraphError> {
        let timeout = request.timeout;
        let mut response = self.request(token, request).await?;
        let mut items: Vec<Value> = response.data().to_vec();
        let mut pages = 1usize;

        while let Some(next) = response.next_page().map(str::to_owned) {
            if let Some(limit) = self.max_pages() {
                if pages >= limit {
                    return Err(GraphError::PageLimit(limit));
                }
            }

            tracing::debug!("Fetching page {} from {}", pages + 1, redact_url(&next));
            let link_token = token.filter(|_| !next.contains("access_token="));
            response = self
                .request(link_token, GraphRequest::new(next).timeout(timeout))
                .await?;
            items.extend_from_slice(response.data());
            pages += 1;
        }

        tracing::debug!("Collected {} items over {} pages", items.len(), pages);
        Ok(items)
    }
}
