//
//  graph-login
//  api/graph.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Graph API Operations
//!
//! [`GraphApi`] binds a [`GraphClient`] to an optional user access token and
//! exposes named operations over the graph: reading objects and
//! connections, publishing, liking, commenting, deleting, and uploading
//! photos.
//!
//! Operations that do not need a user token (token exchange, token
//! validation, login URLs) live as free functions in
//! [`crate::auth`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use graph_login::api::{GraphApi, GraphClient};
//!
//! # async fn example() -> Result<(), graph_login::api::GraphError> {
//! let api = GraphApi::new(GraphClient::new()?, "user-token");
//!
//! let feed = api.get_connections("me", "feed", &[]).await?;
//! let post_id = feed.data()[0]["id"].as_str().unwrap_or_default().to_string();
//! api.put_comment(&post_id, "First!").await?;
//! # Ok(())
//! # }
//! ```

use reqwest::Method;
use serde_json::Value;

use super::client::GraphClient;
use super::error::GraphError;
use super::request::{FilePart, GraphRequest};
use super::response::GraphResponse;

/// Field selection used by the bulk fetch helpers.
pub const BULK_FIELDS: &str = "likes.summary(true){pic_small,name,id,can_post},picture,name";

/// Page size used by the bulk fetch helpers.
pub const BULK_LIMIT: &str = "500";

/// Default album path for photo uploads.
pub const DEFAULT_ALBUM_PATH: &str = "me/photos";

/// Structured attachment for wall posts.
///
/// Every populated field is sent alongside the message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attachment {
    pub name: Option<String>,
    pub link: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub picture: Option<String>,
}

impl Attachment {
    fn into_pairs(self) -> Vec<(String, String)> {
        [
            ("name", self.name),
            ("link", self.link),
            ("caption", self.caption),
            ("description", self.description),
            ("picture", self.picture),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect()
    }
}

/// Named Graph API operations bound to an optional access token.
#[derive(Clone)]
pub struct GraphApi {
    client: GraphClient,
    access_token: Option<String>,
}

impl GraphApi {
    /// Creates an API handle authenticated with `access_token`.
    pub fn new(client: GraphClient, access_token: impl Into<String>) -> Self {
        Self {
            client,
            access_token: Some(access_token.into()),
        }
    }

    /// Creates an unauthenticated handle; write operations will fail with
    /// [`GraphError::AuthRequired`].
    pub fn anonymous(client: GraphClient) -> Self {
        Self {
            client,
            access_token: None,
        }
    }

    pub fn client(&self) -> &GraphClient {
        &self.client
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    fn require_token(&self) -> Result<&str, GraphError> {
        self.access_token().ok_or(GraphError::AuthRequired)
    }

    /// Performs a raw call with this handle's token.
    pub async fn request(&self, request: GraphRequest) -> Result<GraphResponse, GraphError> {
        self.client.request(self.access_token(), request).await
    }

    /// Fetches a single object, optionally restricted to `fields`.
    pub async fn get_object(&self, id: &str, fields: &[&str]) -> Result<GraphResponse, GraphError> {
        let mut request = GraphRequest::new(id);
        if !fields.is_empty() {
            request = request.param("fields", fields.join(","));
        }
        self.request(request).await
    }

    /// Fetches one page of the `connection` of object `id`.
    pub async fn get_connections(
        &self,
        id: &str,
        connection: &str,
        args: &[(&str, &str)],
    ) -> Result<GraphResponse, GraphError> {
        let request =
            GraphRequest::new(format!("{}/{}", id, connection)).params(args.iter().copied());
        self.request(request).await
    }

    /// Fetches every page of the `connection` of object `id`.
    pub async fn get_all_connections(
        &self,
        id: &str,
        connection: &str,
        args: &[(&str, &str)],
    ) -> Result<Vec<Value>, GraphError> {
        let request =
            GraphRequest::new(format!("{}/{}", id, connection)).params(args.iter().copied());
        self.client.get_all(self.access_token(), request).await
    }

    /// Writes an object under `parent`'s `connection`.
    ///
    /// For example, `put_object("me", "feed", vec![("message".into(), "Hello".into())])`
    /// posts to the active user's wall.
    ///
    /// # Errors
    ///
    /// [`GraphError::AuthRequired`] without a token; no request is sent.
    pub async fn put_object(
        &self,
        parent: &str,
        connection: &str,
        data: Vec<(String, String)>,
    ) -> Result<GraphResponse, GraphError> {
        let token = self.require_token()?;
        let request = GraphRequest::new(format!("{}/{}", parent, connection))
            .body(data)
            .method(Method::POST);
        self.client.request(Some(token), request).await
    }

    /// Writes a wall post to `profile_id` (usually `"me"`).
    pub async fn put_wall_post(
        &self,
        message: &str,
        attachment: Attachment,
        profile_id: &str,
    ) -> Result<GraphResponse, GraphError> {
        let mut data = vec![("message".to_string(), message.to_string())];
        data.extend(attachment.into_pairs());
        self.put_object(profile_id, "feed", data).await
    }

    pub async fn put_comment(&self, object_id: &str, message: &str) -> Result<GraphResponse, GraphError> {
        self.put_object(
            object_id,
            "comments",
            vec![("message".to_string(), message.to_string())],
        )
        .await
    }

    pub async fn put_like(&self, object_id: &str) -> Result<GraphResponse, GraphError> {
        self.put_object(object_id, "likes", Vec::new()).await
    }

    /// Deletes the object with the given id.
    pub async fn delete_object(&self, id: &str) -> Result<GraphResponse, GraphError> {
        self.request(GraphRequest::new(id).method(Method::DELETE))
            .await
    }

    /// Deletes the app request `request_id` sent to `user_id`.
    pub async fn delete_request(
        &self,
        user_id: &str,
        request_id: &str,
    ) -> Result<GraphResponse, GraphError> {
        self.delete_object(&format!("{}_{}", request_id, user_id))
            .await
    }

    /// Uploads an image as `multipart/form-data` to `album_path`.
    ///
    /// The file part is sent as `source`; `args` (e.g. `message`) become text
    /// parts.
    pub async fn put_photo(
        &self,
        image: FilePart,
        album_path: &str,
        args: Vec<(String, String)>,
    ) -> Result<GraphResponse, GraphError> {
        let token = self.require_token()?;
        let image = FilePart {
            field: "source".to_string(),
            ..image
        };
        let request = GraphRequest::new(album_path)
            .body(args)
            .file(image)
            .method(Method::POST);
        self.client.request(Some(token), request).await
    }

    async fn get_user_media(&self, connection: &str) -> Result<Vec<Value>, GraphError> {
        self.get_all_connections(
            "me",
            connection,
            &[("fields", BULK_FIELDS), ("limit", BULK_LIMIT)],
        )
        .await
    }

    /// All of the user's photos, with like summaries.
    pub async fn get_user_photos(&self) -> Result<Vec<Value>, GraphError> {
        self.get_user_media("photos").await
    }

    /// All of the user's videos, with like summaries.
    pub async fn get_user_videos(&self) -> Result<Vec<Value>, GraphError> {
        self.get_user_media("videos").await
    }

    /// All of the user's posts, with like summaries.
    pub async fn get_user_posts(&self) -> Result<Vec<Value>, GraphError> {
        self.get_user_media("posts").await
    }
}
