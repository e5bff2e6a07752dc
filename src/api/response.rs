//
//  graph-login
//  api/response.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Normalized Graph Responses
//!
//! The Graph API answers with one of three shapes, told apart solely by the
//! declared `content-type`:
//!
//! | Content type          | Shape                                   |
//! |-----------------------|-----------------------------------------|
//! | contains `json`       | [`GraphResponse::Json`]                 |
//! | contains `image/`     | [`GraphResponse::Binary`]               |
//! | anything else         | URL-encoded pairs → [`GraphResponse::Token`] |
//!
//! JSON responses carry cursor links under `paging.next` and
//! `paging.previous`; see [`GraphResponse::next_page`].

use serde_json::{json, Map, Value};

use super::error::{ApiError, GraphError};

/// A response from the Graph API, normalized into one of three shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphResponse {
    /// A parsed JSON document
    Json(Value),

    /// Raw binary content, typically an image
    Binary {
        /// Raw response bytes
        data: Vec<u8>,
        /// Declared media type, e.g. `image/jpeg`
        mime_type: String,
        /// Final URL the content was served from
        url: String,
    },

    /// A token pair decoded from a query-string body
    Token {
        access_token: String,
        expires: Option<String>,
    },
}

impl GraphResponse {
    /// Classifies a successful raw response by its declared content type.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Decode`] when a JSON content type carries an invalid body
    /// - [`GraphError::Api`] when a query-string body lacks `access_token`
    /// - [`GraphError::UnsupportedContentType`] when nothing matches
    pub fn classify(content_type: &str, url: &str, body: &[u8]) -> Result<Self, GraphError> {
        let lowered = content_type.to_ascii_lowercase();

        if lowered.contains("json") {
            return Ok(Self::Json(serde_json::from_slice(body)?));
        }

        // Substring match, so parameterised or vendor-prefixed image types count.
        if lowered.contains("image/") {
            return Ok(Self::Binary {
                data: body.to_vec(),
                mime_type: content_type.to_string(),
                url: url.to_string(),
            });
        }

        let text = String::from_utf8_lossy(body);
        // Blank values are dropped, so `access_token=` is not a token.
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(text.trim().as_bytes())
            .into_owned()
            .filter(|(_, v)| !v.is_empty())
            .collect();

        if let Some((_, token)) = pairs.iter().find(|(k, _)| k == "access_token") {
            let expires = pairs
                .iter()
                .find(|(k, _)| k == "expires")
                .map(|(_, v)| v.clone());
            return Ok(Self::Token {
                access_token: token.clone(),
                expires,
            });
        }

        if !pairs.is_empty() {
            return Err(ApiError::from_body(&text).into());
        }

        Err(GraphError::UnsupportedContentType(content_type.to_string()))
    }

    /// Returns the JSON document, if this is a JSON response.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Link to the next page (`paging.next`), if any.
    pub fn next_page(&self) -> Option<&str> {
        self.paging_link("next")
    }

    /// Link to the previous page (`paging.previous`), if any.
    pub fn previous_page(&self) -> Option<&str> {
        self.paging_link("previous")
    }

    fn paging_link(&self, key: &str) -> Option<&str> {
        self.as_json()?.get("paging")?.get(key)?.as_str()
    }

    /// The `data` list of a JSON page, empty when absent.
    pub fn data(&self) -> &[Value] {
        self.as_json()
            .and_then(|v| v.get("data"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Renders any shape as a JSON mapping.
    ///
    /// Binary content becomes `{"data": [bytes], "mime-type": .., "url": ..}`
    /// and tokens become `{"access_token": .., "expires": ..}` (the latter only
    /// when known).
    pub fn to_value(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Binary {
                data,
                mime_type,
                url,
            } => json!({
                "data": data,
                "mime-type": mime_type,
                "url": url,
            }),
            Self::Token {
                access_token,
                expires,
            } => {
                let mut map = Map::new();
                map.insert("access_token".into(), Value::String(access_token.clone()));
                if let Some(expires) = expires {
                    map.insert("expires".into(), Value::String(expires.clone()));
                }
                Value::Object(map)
            }
        }
    }
}
