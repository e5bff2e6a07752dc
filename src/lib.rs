//
//  graph-login
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Graph Login Library
//!
//! A thin client for the Graph API plus the web-session login flow built on
//! top of it.
//!
//! ## Overview
//!
//! Every call goes through a single request/response adapter that
//! normalizes URLs, injects the access token, encodes form or multipart
//! bodies and classifies the response into JSON, a binary descriptor or a
//! token pair. Named operations (objects, connections, wall posts, photos,
//! deletes, bulk media fetches) are layered on top, and the login handler
//! uses them to turn an OAuth redirect code into a session and a stored
//! user record.
//!
//! ## Module Structure
//!
//! - [`api`]: Request adapter, pagination and the [`api::GraphApi`] facade
//! - [`auth`]: OAuth helpers, the login flow, user store and task dispatch
//! - [`audit`]: Per-request audit entries
//! - [`config`]: Configuration file management
//! - [`cli`]: Command-line interface definitions using clap
//! - [`output`]: Output formatting (Table, JSON)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use graph_login::api::{GraphApi, GraphClient};
//!
//! # async fn run() -> Result<(), graph_login::api::GraphError> {
//! let client = GraphClient::new()?.with_version("v2.5");
//! let api = GraphApi::new(client, "access-token");
//!
//! let me = api.get_object("me", &["id", "name"]).await?;
//! println!("{}", me.to_value());
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions.
///
/// Contains all CLI commands, arguments, and subcommands defined using the clap derive API.
pub mod cli;

/// Graph API client.
///
/// The adapter handles URL normalization, token injection, body encoding,
/// response classification and pagination; the facade exposes named
/// operations.
pub mod api;

/// OAuth helpers and the login flow.
pub mod auth;

/// Request audit logging.
pub mod audit;

/// Configuration file management.
///
/// Manages the CLI's configuration stored in platform-specific locations:
/// - Linux: `~/.config/graph/config.toml`
/// - macOS: `~/Library/Application Support/graph/config.toml`
/// - Windows: `%APPDATA%\graph\config.toml`
pub mod config;

/// Output formatting for table and JSON modes.
pub mod output;

pub use cli::Cli;

pub use config::Config;

/// Application name constant.
///
/// The name of the CLI binary, used for display purposes and configuration paths.
pub const APP_NAME: &str = "graph";

/// Application version constant, derived from Cargo.toml at compile time.
///
/// # Example
///
/// ```rust
/// use graph_login::VERSION;
///
/// println!("graph version {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// # Example
///
/// ```rust,no_run
/// use graph_login::exit_codes;
/// use std::process;
///
/// process::exit(exit_codes::AUTH_ERROR);
/// ```
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error.
    ///
    /// An unspecified error occurred during execution.
    /// Check stderr for details.
    pub const ERROR: i32 = 1;

    /// Authentication required or failed.
    ///
    /// No stored session, the token is invalid, or the login was rejected.
    /// Run `graph auth login` to authenticate.
    pub const AUTH_ERROR: i32 = 4;
}
