//
//  graph-login
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Loads and saves the CLI configuration from a TOML file stored in a
//! platform-specific directory.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/graph/config.toml`
//! - **macOS**: `~/Library/Application Support/graph/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\graph\config.toml`
//!
//! Setting `GRAPH_CONFIG_DIR` moves both the config file and the data files
//! (`users.json`, `requests.jsonl`) into that directory.
//!
//! ## Example Configuration File
//!
//! ```toml
//! [app]
//! app_id = "1649266495305734"
//! app_secret = "..."
//! redirect_uri = "http://localhost:8080/login/"
//! scope = ["user_likes", "user_photos", "user_posts"]
//!
//! [api]
//! version = "v2.5"
//! base_url = "https://graph.facebook.com/"
//! max_pages = 0
//!
//! [audit]
//! enabled = true
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use graph_login::config::Config;
//!
//! let mut config = Config::load()?;
//! config.set("api.version", "v2.5")?;
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

mod file;

pub use file::*;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_BASE_URL;
use crate::audit::{AuditLog, JsonlAuditLog, TracingAuditLog};
use crate::auth::AppCredentials;
use crate::APP_NAME;

/// Every key accepted by [`Config::get`] and [`Config::set`].
pub const KEYS: &[&str] = &[
    "app.app_id",
    "app.app_secret",
    "app.redirect_uri",
    "app.scope",
    "api.version",
    "api.base_url",
    "api.max_pages",
    "audit.enabled",
    "audit.path",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub app: AppCredentials,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub audit: AuditConfig,
}

/// Graph API endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Version segment inserted before relative paths, e.g. `v2.5`; empty for none
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Pagination cap; 0 means unbounded
    #[serde(default)]
    pub max_pages: usize,
}

fn default_version() -> String {
    "v2.5".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            base_url: default_base_url(),
            max_pages: 0,
        }
    }
}

/// Request audit log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,

    /// JSON lines file; defaults to `requests.jsonl` in the data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_audit_enabled() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match read_config_file(path)? {
            Some(content) => toml::from_str(&content)
                .with_context(|| format!("Invalid configuration in {}", path.display())),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        write_config_file(path, &content)
    }

    /// `$GRAPH_CONFIG_DIR/config.toml` when set, else the platform config dir.
    pub fn config_path() -> Result<PathBuf> {
        if let Some(dir) = override_dir() {
            return Ok(dir.join("config.toml"));
        }
        let dirs = ProjectDirs::from("", "", APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Holds the user store and audit log. Shares `GRAPH_CONFIG_DIR` when set.
    pub fn data_dir() -> Result<PathBuf> {
        if let Some(dir) = override_dir() {
            return Ok(dir);
        }
        let dirs = ProjectDirs::from("", "", APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Location of the local user store.
    pub fn users_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("users.json"))
    }

    /// Builds the audit log described by the `[audit]` section.
    pub fn audit_log(&self) -> Result<Arc<dyn AuditLog>> {
        if !self.audit.enabled {
            return Ok(Arc::new(TracingAuditLog));
        }
        let path = match &self.audit.path {
            Some(path) => path.clone(),
            None => Self::data_dir()?.join("requests.jsonl"),
        };
        Ok(Arc::new(JsonlAuditLog::new(path)))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "app.app_id" => Some(self.app.app_id.clone()),
            "app.app_secret" => Some(self.app.app_secret.clone()),
            "app.redirect_uri" => Some(self.app.redirect_uri.clone()),
            "app.scope" => Some(self.app.scope.join(",")),
            "api.version" => Some(self.api.version.clone()).filter(|v| !v.is_empty()),
            "api.base_url" => Some(self.api.base_url.clone()),
            "api.max_pages" => Some(self.api.max_pages.to_string()),
            "audit.enabled" => Some(self.audit.enabled.to_string()),
            "audit.path" => self.audit.path.as_ref().map(|p| p.display().to_string()),
            _ => None,
        }
    }

    /// Sets a dotted key. Returns `Ok(false)` for unknown keys.
    ///
    /// # Errors
    ///
    /// Returns an error when the value does not parse for a numeric or
    /// boolean key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        match key {
            "app.app_id" => self.app.app_id = value.to_string(),
            "app.app_secret" => self.app.app_secret = value.to_string(),
            "app.redirect_uri" => self.app.redirect_uri = value.to_string(),
            "app.scope" => {
                self.app.scope = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            }
            "api.version" => self.api.version = value.to_string(),
            "api.base_url" => self.api.base_url = value.to_string(),
            "api.max_pages" => {
                self.api.max_pages = value
                    .parse()
                    .with_context(|| format!("Invalid page count: {}", value))?
            }
            "audit.enabled" => {
                self.audit.enabled = value
                    .parse()
                    .with_context(|| format!("Expected true or false, got: {}", value))?
            }
            "audit.path" => {
                self.audit.path = (!value.is_empty()).then(|| PathBuf::from(value))
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn override_dir() -> Option<PathBuf> {
    std::env::var_os("GRAPH_CONFIG_DIR")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.version, "v2.5");
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.max_pages, 0);
        assert!(config.audit.enabled);
        assert_eq!(config.app.scope.len(), 6);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[app]\napp_id = \"42\"\n").unwrap();
        assert_eq!(config.app.app_id, "42");
        assert_eq!(config.app.redirect_uri, "http://localhost:8080/login/");
        assert_eq!(config.api.version, "v2.5");
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();
        assert!(config.set("app.scope", "user_likes, user_photos").unwrap());
        assert_eq!(config.get("app.scope").as_deref(), Some("user_likes,user_photos"));

        assert!(config.set("api.max_pages", "10").unwrap());
        assert_eq!(config.api.max_pages, 10);
        assert!(config.set("api.max_pages", "ten").is_err());

        assert!(config.set("api.version", "").unwrap());
        assert_eq!(config.get("api.version"), None);

        assert!(!config.set("nope", "x").unwrap());
        assert_eq!(config.get("nope"), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("app.app_id", "42").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.app.app_id, "42");

        let missing = Config::load_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(missing.app.app_id, "");
    }
}
