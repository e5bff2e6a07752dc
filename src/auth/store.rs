//
//  graph-login
//  auth/store.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! User record storage
//!
//! User records are keyed by the platform-assigned id and are created on the
//! first successful login. The login flow only ever looks records up and
//! creates them; it never updates or deletes.
//!
//! [`FileUserStore`] keeps records in a JSON file and is what the CLI uses.
//! Applications with a real database implement [`UserStore`] themselves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

/// A persisted user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Platform-assigned user id
    pub id: String,
    pub access_token: Option<String>,
    /// Token lifetime in seconds at creation time; 0 when unknown
    #[serde(default)]
    pub access_token_expires: i64,
    /// The `/me` payload without its `id`
    #[serde(default)]
    pub profile: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Display name from the profile, when present.
    pub fn name(&self) -> Option<&str> {
        self.profile.get("name").and_then(Value::as_str)
    }
}

/// The data needed to create a [`UserRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub id: String,
    pub access_token: Option<String>,
    pub access_token_expires: i64,
    pub profile: Map<String, Value>,
}

impl NewUser {
    /// Builds a new user from a `/me` payload, removing `id` from the profile.
    ///
    /// Returns `None` when the payload is not an object or has no `id`.
    pub fn from_profile(
        profile: &Value,
        access_token: Option<String>,
        access_token_expires: i64,
    ) -> Option<Self> {
        let mut profile = profile.as_object()?.clone();
        let id = match profile.remove("id")? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(Self {
            id,
            access_token,
            access_token_expires,
            profile,
        })
    }
}

/// Lookup and creation of user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find(&self, id: &str) -> Result<Option<UserRecord>>;

    async fn create(&self, user: NewUser) -> Result<UserRecord>;
}

/// A [`UserStore`] backed by a single JSON file.
pub struct FileUserStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileUserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, UserRecord>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Corrupt user store {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, users: &BTreeMap<String, UserRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(users)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for FileUserStore {
    async fn find(&self, id: &str) -> Result<Option<UserRecord>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(id))
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord> {
        let _guard = self.lock.lock().await;
        let mut users = self.read_all().await?;
        if users.contains_key(&user.id) {
            anyhow::bail!("User {} already exists", user.id);
        }

        let record = UserRecord {
            id: user.id,
            access_token: user.access_token,
            access_token_expires: user.access_token_expires,
            profile: user.profile,
            created_at: Utc::now(),
        };
        users.insert(record.id.clone(), record.clone());
        self.write_all(&users).await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_user_strips_id() {
        let profile = json!({"id": 123123123, "name": "Unit Test", "email": "unit@test.com"});
        let user = NewUser::from_profile(&profile, Some("unittest".into()), 12312).unwrap();
        assert_eq!(user.id, "123123123");
        assert!(!user.profile.contains_key("id"));
        assert_eq!(user.profile["name"], "Unit Test");
        assert_eq!(user.access_token_expires, 12312);
    }

    #[test]
    fn test_new_user_requires_id() {
        assert!(NewUser::from_profile(&json!({"name": "x"}), None, 0).is_none());
        assert!(NewUser::from_profile(&json!("me"), None, 0).is_none());
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUserStore::new(dir.path().join("users.json"));

        assert!(store.find("1").await.unwrap().is_none());

        let user = NewUser::from_profile(&json!({"id": "1", "name": "Ada"}), Some("t".into()), 0)
            .unwrap();
        let created = store.create(user.clone()).await.unwrap();
        assert_eq!(created.name(), Some("Ada"));

        let found = store.find("1").await.unwrap().unwrap();
        assert_eq!(found, created);

        assert!(store.create(user).await.is_err());
    }
}
