//
//  graph-login
//  auth/oauth.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # OAuth Token Operations
//!
//! Stateless operations around the Graph API's OAuth endpoints. None of these
//! need a [`GraphApi`](crate::api::GraphApi) instance; each takes the client
//! and the parameters it needs explicitly.
//!
//! ## OAuth Flow Overview
//!
//! 1. **Login URL**: send the user to [`login_url`]
//! 2. **User Consent**: the dialog redirects back to `redirect_uri?code=...`
//! 3. **Code Exchange**: [`get_access_token_from_code`] trades the code for a token
//! 4. **Extension**: [`extend_access_token`] trades a short-lived token for a
//!    long-lived one
//! 5. **Validation**: [`validate_access_token`] asks `debug_token` whether the
//!    token is still valid
//!
//! The token endpoint answers either with a query string
//! (`access_token=...&expires=...`) or, on newer API versions, with JSON
//! (`{"access_token": ..., "expires_in": ...}`). [`TokenGrant::from_response`]
//! accepts both.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::api::{ApiError, GraphClient, GraphError, GraphRequest, GraphResponse};

/// The OAuth dialog users are sent to.
pub const DIALOG_URL: &str = "https://www.facebook.com/dialog/oauth";

/// Token endpoint, relative to the API base.
const TOKEN_PATH: &str = "oauth/access_token";

/// Token introspection endpoint, relative to the API base.
const DEBUG_TOKEN_PATH: &str = "debug_token";

/// Application credentials and login settings.
///
/// # Example
///
/// ```rust
/// use graph_login::auth::AppCredentials;
///
/// let app = AppCredentials {
///     app_id: "1649266495305734".to_string(),
///     app_secret: "secret".to_string(),
///     ..Default::default()
/// };
/// assert!(app.scope.contains(&"user_photos".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppCredentials {
    /// The application id from the developer console
    pub app_id: String,

    /// The application secret; never sent to the browser
    pub app_secret: String,

    /// Where the OAuth dialog redirects with `?code=...`
    pub redirect_uri: String,

    /// Permissions requested in the login dialog
    pub scope: Vec<String>,
}

impl Default for AppCredentials {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            redirect_uri: "http://localhost:8080/login/".to_string(),
            scope: [
                "user_likes",
                "user_photos",
                "user_status",
                "user_videos",
                "user_posts",
                "publish_actions",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// An access token issued by the token endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Lifetime in seconds, as reported by the endpoint
    pub expires: Option<String>,
}

impl TokenGrant {
    /// Extracts a token from either response shape.
    ///
    /// Returns `None` when the response carries no non-empty `access_token`
    /// or when a JSON response contains an `error` member.
    pub fn from_response(response: &GraphResponse) -> Option<Self> {
        match response {
            GraphResponse::Token {
                access_token,
                expires,
            } => Some(Self {
                access_token: access_token.clone(),
                expires: expires.clone(),
            }),
            GraphResponse::Json(value) => {
                if value.get("error").is_some() {
                    return None;
                }
                let access_token = value
                    .get("access_token")?
                    .as_str()
                    .filter(|t| !t.is_empty())?
                    .to_string();
                let expires = value
                    .get("expires")
                    .or_else(|| value.get("expires_in"))
                    .and_then(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    });
                Some(Self {
                    access_token,
                    expires,
                })
            }
            GraphResponse::Binary { .. } => None,
        }
    }

    /// The expiry as seconds, defaulting to 0 when absent or unparsable.
    pub fn expires_secs(&self) -> i64 {
        self.expires
            .as_deref()
            .and_then(|e| e.parse().ok())
            .unwrap_or(0)
    }
}

/// Builds the OAuth dialog URL for `app`.
///
/// ```rust
/// use graph_login::auth::{login_url, AppCredentials};
///
/// let app = AppCredentials {
///     app_id: "42".to_string(),
///     redirect_uri: "http://localhost:8080/login/".to_string(),
///     scope: vec!["user_likes".to_string(), "user_photos".to_string()],
///     ..Default::default()
/// };
/// assert_eq!(
///     login_url(&app),
///     "https://www.facebook.com/dialog/oauth?client_id=42&redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Flogin%2F&scope=user_likes%2Cuser_photos"
/// );
/// ```
pub fn login_url(app: &AppCredentials) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", &app.app_id)
        .append_pair("redirect_uri", &app.redirect_uri)
        .append_pair("scope", &app.scope.join(","))
        .finish();
    format!("{}?{}", DIALOG_URL, query)
}

/// Exchanges an authorization `code` for an access token.
///
/// The raw response is returned so callers can inspect error payloads.
pub async fn get_access_token_from_code(
    client: &GraphClient,
    code: &str,
    app: &AppCredentials,
) -> Result<GraphResponse, GraphError> {
    let request = GraphRequest::new(TOKEN_PATH).params([
        ("code", code),
        ("redirect_uri", app.redirect_uri.as_str()),
        ("client_id", app.app_id.as_str()),
        ("client_secret", app.app_secret.as_str()),
    ]);
    client.request(None, request).await
}

/// Trades a short-lived `access_token` for a long-lived one.
///
/// # Errors
///
/// Any transport or API error, or [`GraphError::Api`] when the response
/// carries no token.
pub async fn extend_access_token(
    client: &GraphClient,
    access_token: &str,
    app: &AppCredentials,
) -> Result<TokenGrant, GraphError> {
    let request = GraphRequest::new(TOKEN_PATH).params([
        ("client_id", app.app_id.as_str()),
        ("client_secret", app.app_secret.as_str()),
        ("grant_type", "fb_exchange_token"),
        ("fb_exchange_token", access_token),
    ]);
    let response = client.request(None, request).await?;
    TokenGrant::from_response(&response)
        .ok_or_else(|| ApiError::from_payload(response.to_value()).into())
}

/// Checks a token against the `debug_token` endpoint.
///
/// Returns `true` only when the response has a truthy `data.is_valid`. Every
/// other outcome, errors included, is `false`.
pub async fn validate_access_token(client: &GraphClient, access_token: &str) -> bool {
    let request = GraphRequest::new(DEBUG_TOKEN_PATH).param("input_token", access_token);
    match client.request(Some(access_token), request).await {
        Ok(response) => is_valid_debug_response(&response),
        Err(err) => {
            tracing::debug!("Token validation failed: {}", err);
            false
        }
    }
}

fn is_valid_debug_response(response: &GraphResponse) -> bool {
    match response
        .as_json()
        .and_then(|v| v.get("data"))
        .and_then(|d| d.get("is_valid"))
    {
        Some(Value::Bool(valid)) => *valid,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        _ => false,
    }
}

/// Opens the login dialog in a browser and waits for the redirect `code`.
///
/// A one-shot HTTP listener is bound to the port of the app's
/// `redirect_uri`, so that URI must point at localhost for this to work.
pub fn capture_code_via_browser(app: &AppCredentials, timeout: Duration) -> Result<String> {
    let redirect = Url::parse(&app.redirect_uri).context("Invalid redirect URI")?;
    let port = redirect.port_or_known_default().unwrap_or(80);

    let (tx, rx) = mpsc::channel::<String>();

    let listener = TcpListener::bind(format!("127.0.0.1:{}", port)).context(format!(
        "Failed to bind to port {}. Is another process using it?",
        port
    ))?;

    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let buf_reader = BufReader::new(&stream);
            if let Some(Ok(request_line)) = buf_reader.lines().next() {
                let (status, title) = match extract_code_from_request(&request_line) {
                    Some(code) => {
                        let _ = tx.send(code);
                        ("200 OK", "Login Successful")
                    }
                    None => ("400 Bad Request", "Login Failed"),
                };
                let response = format!(
                    "HTTP/1.1 {}\r\n\
                     Content-Type: text/html\r\n\
                     Connection: close\r\n\
                     \r\n\
                     <!DOCTYPE html><html><head><title>{title}</title></head>\
                     <body style=\"font-family: system-ui, sans-serif; text-align: center; padding: 50px;\">\
                     <h1>{title}</h1><p>You can close this window and return to the terminal.</p>\
                     </body></html>",
                    status,
                    title = title
                );
                let _ = stream.write_all(response.as_bytes());
            }
        }
    });

    let url = login_url(app);
    println!("Opening browser for login...");
    println!("If the browser doesn't open, visit this URL:");
    println!("{}", url);
    println!();

    if let Err(e) = webbrowser::open(&url) {
        eprintln!("Warning: Could not open browser: {}", e);
    }

    println!("Waiting for authorization...");
    rx.recv_timeout(timeout)
        .context("Authorization timed out. Please try again.")
}

/// Extracts the `code` query parameter from an HTTP request line.
fn extract_code_from_request(request_line: &str) -> Option<String> {
    // GET /login/?code=xxx HTTP/1.1
    let target = request_line.split_whitespace().nth(1)?;
    let (_, query) = target.split_once('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
}
