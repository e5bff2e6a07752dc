//
//  graph-login
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod api;
mod auth;
mod config;
mod fetch;
mod publish;

pub use api::ApiCommand;
pub use auth::AuthCommand;
pub use config::ConfigCommand;
pub use fetch::FetchCommand;
pub use publish::{
    CommentCommand, DeleteCommand, DeleteRequestCommand, LikeCommand, PhotoCommand, PostCommand,
};

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{GraphApi, GraphClient, GraphError};
use crate::auth::{KeyringStore, SessionGrant};
use crate::config::Config;

/// Graph CLI - Work with the Graph API from the command line
#[derive(Parser, Debug)]
#[command(
    name = "graph",
    version,
    about = "Work with the Graph API from the command line",
    long_about = "graph is a CLI for the Graph API.\n\n\
                  It logs you in through the OAuth dialog, then reads objects and\n\
                  connections, publishes posts, comments, likes and photos, and\n\
                  bulk-fetches your media.",
    propagate_version = true,
    after_help = "Use 'graph <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Access token to use instead of the stored session
    #[arg(long, global = true, env = "GRAPH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Disable interactive prompts
    #[arg(long, global = true, env = "GRAPH_NO_PROMPT")]
    pub no_prompt: bool,

    /// Application id (overrides app.app_id)
    #[arg(long, global = true, env = "GRAPH_APP_ID")]
    pub app_id: Option<String>,

    /// Application secret (overrides app.app_secret)
    #[arg(long, global = true, env = "GRAPH_APP_SECRET", hide_env_values = true)]
    pub app_secret: Option<String>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in through the OAuth dialog and manage the stored session
    Auth(AuthCommand),

    /// Make raw Graph API requests
    Api(ApiCommand),

    /// Write a wall post
    Post(PostCommand),

    /// Comment on an object
    Comment(CommentCommand),

    /// Like an object
    Like(LikeCommand),

    /// Delete an object
    Delete(DeleteCommand),

    /// Delete an app request sent to a user
    #[command(name = "delete-request")]
    DeleteRequest(DeleteRequestCommand),

    /// Upload a photo
    Photo(PhotoCommand),

    /// Fetch all of your photos, videos or posts
    Fetch(FetchCommand),

    /// Manage CLI configuration
    Config(ConfigCommand),

    /// Print version information
    Version,
}

/// Configuration and client resolved for one command invocation.
///
/// Flag and environment overrides from [`GlobalOptions`] are applied on top
/// of the config file.
pub struct Runtime {
    pub config: Config,
    pub client: GraphClient,
}

impl Runtime {
    pub fn load(global: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load()?;
        if let Some(app_id) = &global.app_id {
            config.app.app_id = app_id.clone();
        }
        if let Some(app_secret) = &global.app_secret {
            config.app.app_secret = app_secret.clone();
        }

        let client = GraphClient::from_config(&config.api)?.with_audit_log(config.audit_log()?);
        Ok(Self { config, client })
    }

    /// The `--token` flag, else the access token of the stored session.
    ///
    /// # Errors
    ///
    /// [`GraphError::AuthRequired`] when neither is available.
    pub fn access_token(&self, global: &GlobalOptions) -> Result<String> {
        self.optional_token(global)?.ok_or_else(|| {
            anyhow::Error::new(GraphError::AuthRequired)
                .context("Not logged in. Run 'graph auth login' first")
        })
    }

    /// The token when one is available; reads work without one.
    ///
    /// # Errors
    ///
    /// An unreadable or corrupt keyring entry.
    pub fn optional_token(&self, global: &GlobalOptions) -> Result<Option<String>> {
        resolve_token(global.token.as_deref(), || {
            KeyringStore::new().get(&self.config.app.app_id)
        })
    }

    /// A facade bound to the resolved access token.
    pub fn api(&self, global: &GlobalOptions) -> Result<GraphApi> {
        Ok(GraphApi::new(self.client.clone(), self.access_token(global)?))
    }
}

/// `--token` wins over the stored session; the store is only read without it.
fn resolve_token(
    flag: Option<&str>,
    stored: impl FnOnce() -> Result<Option<SessionGrant>>,
) -> Result<Option<String>> {
    if let Some(token) = flag {
        return Ok(Some(token.to_string()));
    }
    Ok(stored()?.map(|session| session.access_token))
}

/// A steady spinner on stderr; hidden in JSON mode.
pub(crate) fn spinner(global: &GlobalOptions, message: &str) -> ProgressBar {
    if global.json {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Splits `key=value` arguments.
pub(crate) fn parse_pairs(fields: &[String]) -> Result<Vec<(String, String)>> {
    fields
        .iter()
        .map(|field| {
            field
                .split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| anyhow::anyhow!("Invalid field format: {}. Expected key=value", field))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pairs() {
        let pairs = parse_pairs(&["message=a=b".to_string(), "link=".to_string()]).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("message".to_string(), "a=b".to_string()),
                ("link".to_string(), String::new()),
            ]
        );
        assert!(parse_pairs(&["novalue".to_string()]).is_err());
    }

    #[test]
    fn test_global_flags_parse() {
        let cli = Cli::try_parse_from(["graph", "--json", "--token", "t", "like", "123"]).unwrap();
        assert!(cli.global.json);
        assert_eq!(cli.global.token.as_deref(), Some("t"));
        assert!(matches!(cli.command, Commands::Like(_)));
    }

    #[test]
    fn test_resolve_token_order() {
        let flag = resolve_token(Some("flag"), || Err(anyhow::anyhow!("store not read"))).unwrap();
        assert_eq!(flag.as_deref(), Some("flag"));

        let stored = resolve_token(None, || {
            Ok(Some(SessionGrant {
                user_id: "1".to_string(),
                access_token: "stored".to_string(),
                expires: 0,
            }))
        })
        .unwrap();
        assert_eq!(stored.as_deref(), Some("stored"));

        assert_eq!(resolve_token(None, || Ok(None)).unwrap(), None);
    }

    #[test]
    fn test_resolve_token_surfaces_store_errors() {
        let err = resolve_token(None, || Err(anyhow::anyhow!("Stored session is corrupt"))).unwrap_err();
        assert!(err.to_string().contains("corrupt"));
    }
}
