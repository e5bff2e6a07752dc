//
//  graph-login
//  cli/auth.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Authentication commands.
//!
//! `graph auth login` drives the same [`LoginHandler`] a web application
//! would: the keyring plays the part of the session store, the redirect
//! `code` comes from `--code` or a local callback listener (`--web`), and
//! new users are written to `users.json` in the data directory.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::api::GraphError;
use crate::auth::{
    capture_code_via_browser, extend_access_token, login_url, validate_access_token,
    FileUserStore, KeyringStore, LoginHandler, LoginOutcome, Session, SessionGrant,
    SpawningDispatcher, UserRecord,
};
use crate::config::Config;
use crate::output::OutputWriter;

use super::{spinner, GlobalOptions, Runtime};

/// How long `--web` waits for the OAuth redirect.
const BROWSER_TIMEOUT: Duration = Duration::from_secs(300);

/// Log in through the OAuth dialog and manage the stored session.
#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Print the OAuth dialog URL
    #[command(name = "login-url")]
    LoginUrl,

    /// Log in, exchanging a redirect code for a session
    Login(LoginArgs),

    /// Validate the stored session
    Status,

    /// Delete the stored session
    Logout,

    /// Exchange the stored token for a long-lived one
    Extend,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// The `code` query parameter from the OAuth redirect
    #[arg(long, conflicts_with = "web")]
    pub code: Option<String>,

    /// Open the browser and capture the redirect on the local callback URI
    #[arg(long)]
    pub web: bool,
}

impl AuthCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            AuthSubcommand::LoginUrl => login_url_cmd(global),
            AuthSubcommand::Login(args) => login(args, global).await,
            AuthSubcommand::Status => status(global).await,
            AuthSubcommand::Logout => logout(global),
            AuthSubcommand::Extend => extend(global).await,
        }
    }
}

fn login_url_cmd(global: &GlobalOptions) -> Result<()> {
    let runtime = Runtime::load(global)?;
    let url = login_url(&runtime.config.app);

    if global.json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "url": url }))?);
    } else {
        println!("{}", url);
    }
    Ok(())
}

/// Runs the login flow against the stored session.
async fn login(args: &LoginArgs, global: &GlobalOptions) -> Result<()> {
    let runtime = Runtime::load(global)?;
    let app = &runtime.config.app;
    if app.app_id.is_empty() {
        bail!("No app id configured. Set GRAPH_APP_ID or run 'graph config set app.app_id <id>'");
    }

    let keyring = KeyringStore::new();
    let session = keyring
        .get(&app.app_id)?
        .map(Session::from)
        .unwrap_or_default();

    let users = FileUserStore::new(Config::users_path()?);
    let tasks = SpawningDispatcher::new(runtime.client.clone());
    let handler = LoginHandler::new(&runtime.client, app, &users, &tasks);

    let mut outcome = handler.login(&session, args.code.as_deref()).await?;

    if !outcome.is_authenticated() && args.web {
        let dialog_app = app.clone();
        let code = tokio::task::spawn_blocking(move || {
            capture_code_via_browser(&dialog_app, BROWSER_TIMEOUT)
        })
        .await??;
        outcome = handler.login(&Session::default(), Some(&code)).await?;
    }

    match outcome {
        LoginOutcome::SessionValid { user } => {
            report_user(global, &user, "Already logged in as")?;
        }
        LoginOutcome::RedirectExchanged {
            user,
            session,
            created,
        } => {
            keyring.store(&app.app_id, &session)?;
            report_user(global, &user, "Logged in as")?;

            if created {
                let spinner = spinner(global, "Fetching your photos, videos and posts...");
                let results = tasks.drain().await;
                spinner.finish_and_clear();

                for result in results {
                    if !global.json {
                        println!(
                            "{} Fetched {} photos, {} videos and {} posts",
                            style("✓").green(),
                            result.photos.len(),
                            result.videos.len(),
                            result.posts.len()
                        );
                    }
                }
            }
        }
        LoginOutcome::Unauthenticated => {
            if args.code.is_some() {
                tracing::warn!("Login code was rejected");
                return Err(anyhow::Error::new(GraphError::AuthRequired)
                    .context("The login code was rejected. Request a new one and try again"));
            }

            eprintln!("Not logged in. Open this URL, then rerun with --code <code>:");
            eprintln!();
            eprintln!("  {}", login_url(app));
            eprintln!();
            eprintln!("Or run 'graph auth login --web' to capture the code automatically.");
            return Err(anyhow::Error::new(GraphError::AuthRequired).context("Login required"));
        }
    }

    Ok(())
}

fn report_user(global: &GlobalOptions, user: &UserRecord, prefix: &str) -> Result<()> {
    if global.json {
        println!("{}", serde_json::to_string_pretty(user)?);
    } else {
        println!(
            "{} {} {}",
            style("✓").green(),
            prefix,
            style(user.name().unwrap_or(&user.id)).cyan()
        );
    }
    Ok(())
}

/// Validates the stored token against `debug_token`.
async fn status(global: &GlobalOptions) -> Result<()> {
    let runtime = Runtime::load(global)?;
    let stored = KeyringStore::new().get(&runtime.config.app.app_id)?;

    let (token, user_id) = match (&global.token, &stored) {
        (Some(token), _) => (token.clone(), None),
        (None, Some(session)) => (session.access_token.clone(), Some(session.user_id.clone())),
        (None, None) => {
            if global.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ "logged_in": false }))?
                );
            } else {
                println!("Not logged in");
                println!();
                println!("Run 'graph auth login' to authenticate");
            }
            return Err(anyhow::Error::new(GraphError::AuthRequired).context("Not logged in"));
        }
    };

    let valid = validate_access_token(&runtime.client, &token).await;

    let status = if valid { "Active" } else { "Invalid/Expired" };
    OutputWriter::from_flag(global.json).write_value(&serde_json::json!({
        "logged_in": true,
        "user_id": user_id,
        "token": mask_token(&token),
        "valid": valid,
        "status": status,
    }))?;

    if !valid {
        return Err(anyhow::Error::new(GraphError::AuthRequired)
            .context("Stored token is invalid or expired. Run 'graph auth login'"));
    }
    Ok(())
}

fn logout(global: &GlobalOptions) -> Result<()> {
    let runtime = Runtime::load(global)?;
    KeyringStore::new().delete(&runtime.config.app.app_id)?;

    if global.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "success": true }))?
        );
    } else {
        println!("{} Logged out", style("✓").green());
    }
    Ok(())
}

/// Trades the current token for a long-lived one and re-stores it.
async fn extend(global: &GlobalOptions) -> Result<()> {
    let runtime = Runtime::load(global)?;
    let app = &runtime.config.app;
    let keyring = KeyringStore::new();

    let token = runtime.access_token(global)?;
    let grant = extend_access_token(&runtime.client, &token, app).await?;

    let stored = keyring.get(&app.app_id)?;
    let restored = match stored {
        Some(session) if global.token.is_none() => {
            keyring.store(
                &app.app_id,
                &SessionGrant {
                    access_token: grant.access_token.clone(),
                    expires: grant.expires_secs(),
                    ..session
                },
            )?;
            true
        }
        _ => false,
    };

    if global.json {
        println!("{}", serde_json::to_string_pretty(&grant)?);
    } else {
        println!("{} Token extended", style("✓").green());
        if grant.expires_secs() > 0 {
            let days = grant.expires_secs() / 86_400;
            println!("  Expires in {} days", days);
        }
        if !restored {
            println!("  Token: {}", grant.access_token);
        }
    }
    Ok(())
}

/// Masks a token for display (shows first and last 4 characters).
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("short"), "*****");
        assert_eq!(mask_token("EAABwzLixnjYBAKZCZA"), "EAAB...ZCZA");
    }
}
