//
//  graph-login
//  auth/tasks.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Background work triggered by new user registration.
//!
//! The login flow calls [`TaskDispatcher::fetch_all`] once per newly created
//! user and does not wait for the result.

use std::sync::Mutex;

use serde_json::Value;
use tokio::task::JoinHandle;

use crate::api::{GraphApi, GraphClient};

/// Fire-and-forget dispatcher for per-user background tasks.
pub trait TaskDispatcher: Send + Sync {
    /// Schedules a full fetch of the user's photos, videos and posts.
    fn fetch_all(&self, user_id: &str, access_token: &str);
}

/// Everything a fetch-all task collected.
#[derive(Debug, Clone, Default)]
pub struct FetchAllResult {
    pub user_id: String,
    pub photos: Vec<Value>,
    pub videos: Vec<Value>,
    pub posts: Vec<Value>,
}

/// Runs fetch-all tasks on the tokio runtime.
///
/// Handles are kept so a short-lived process can [`drain`](Self::drain)
/// outstanding work before exiting.
pub struct SpawningDispatcher {
    client: GraphClient,
    handles: Mutex<Vec<JoinHandle<Option<FetchAllResult>>>>,
}

impl SpawningDispatcher {
    pub fn new(client: GraphClient) -> Self {
        Self {
            client,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Waits for every spawned task and returns the successful results.
    pub async fn drain(&self) -> Vec<FetchAllResult> {
        let handles: Vec<_> = match self.handles.lock() {
            Ok(mut handles) => handles.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        };

        let mut results = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(e) => tracing::warn!("Fetch task panicked: {}", e),
            }
        }
        results
    }
}

impl TaskDispatcher for SpawningDispatcher {
    fn fetch_all(&self, user_id: &str, access_token: &str) {
        let api = GraphApi::new(self.client.clone(), access_token);
        let user_id = user_id.to_string();

        let handle = tokio::spawn(async move {
            tracing::debug!("Fetching all media for user {}", user_id);
            let fetched = async {
                Ok::<_, crate::api::GraphError>(FetchAllResult {
                    photos: api.get_user_photos().await?,
                    videos: api.get_user_videos().await?,
                    posts: api.get_user_posts().await?,
                    user_id: user_id.clone(),
                })
            }
            .await;

            match fetched {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!("Fetch-all for user {} failed: {}", user_id, e);
                    None
                }
            }
        });

        match self.handles.lock() {
            Ok(mut handles) => handles.push(handle),
            Err(poisoned) => poisoned.into_inner().push(handle),
        }
    }
}
