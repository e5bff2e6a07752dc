//
//  graph-login
//  tests/cli.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use std::path::Path;

use assert_cmd::Command;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use tempfile::TempDir;

/// A `graph` command isolated in its own config directory.
fn graph(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("graph").unwrap();
    cmd.env("GRAPH_CONFIG_DIR", dir)
        .env_remove("GRAPH_TOKEN")
        .env_remove("GRAPH_APP_ID")
        .env_remove("GRAPH_APP_SECRET")
        .env_remove("GRAPH_DEBUG");
    cmd
}

/// Points the CLI at a mock server with no version prefix.
fn write_config(dir: &Path, base_url: &str) {
    let content = format!(
        "[api]\nbase_url = \"{}/\"\nversion = \"\"\n\n[audit]\nenabled = false\n",
        base_url
    );
    std::fs::write(dir.join("config.toml"), content).unwrap();
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    graph(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("graph version"));
}

#[test]
fn test_login_url_uses_app_id_from_env() {
    let dir = TempDir::new().unwrap();
    graph(dir.path())
        .env("GRAPH_APP_ID", "42")
        .args(["auth", "login-url"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "https://www.facebook.com/dialog/oauth?client_id=42&redirect_uri=",
        ))
        .stdout(predicate::str::contains("scope=user_likes%2Cuser_photos"));
}

#[test]
fn test_config_path_honours_override() {
    let dir = TempDir::new().unwrap();
    let expected = dir.path().join("config.toml").display().to_string();
    graph(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));
}

#[test]
fn test_config_set_then_get() {
    let dir = TempDir::new().unwrap();
    graph(dir.path())
        .args(["config", "set", "app.app_id", "99"])
        .assert()
        .success();

    graph(dir.path())
        .args(["config", "get", "app.app_id"])
        .assert()
        .success()
        .stdout("99\n");

    graph(dir.path())
        .args(["auth", "login-url"])
        .assert()
        .success()
        .stdout(predicate::str::contains("client_id=99"));
}

#[test]
fn test_config_set_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    graph(dir.path())
        .args(["config", "set", "core.editor", "vi"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_api_get_with_token() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    write_config(dir.path(), &server.url());

    let _mock = server
        .mock("GET", "/me")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("fields".into(), "id,name".into()),
            Matcher::UrlEncoded("access_token".into(), "tok".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "1", "name": "Ada"}"#)
        .create();

    graph(dir.path())
        .args(["api", "me", "-q", "fields=id,name", "--token", "tok"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "Ada""#));
}

#[test]
fn test_rejected_token_exits_with_auth_code() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    write_config(dir.path(), &server.url());

    let _mock = server
        .mock("POST", "/me/feed")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"error": {"message": "Invalid OAuth access token.", "type": "OAuthException", "code": 190}}"#,
        )
        .create();

    graph(dir.path())
        .args(["post", "Hello", "--token", "bad"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Invalid OAuth access token."));
}

#[test]
fn test_api_error_exits_with_general_code() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    write_config(dir.path(), &server.url());

    let _mock = server
        .mock("GET", "/missing")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "Unsupported get request.", "type": "GraphMethodException", "code": 100}}"#)
        .create();

    graph(dir.path())
        .args(["api", "missing", "--token", "tok"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported get request."));
}

#[test]
fn test_post_reports_created_id() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    write_config(dir.path(), &server.url());

    let _mock = server
        .mock("POST", "/me/feed")
        .match_body(Matcher::UrlEncoded("message".into(), "Hello".into()))
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "1_2"}"#)
        .expect(2)
        .create();

    graph(dir.path())
        .args(["post", "Hello", "--token", "tok"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Posted (1_2)"));

    graph(dir.path())
        .args(["--json", "post", "Hello", "--token", "tok"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""id": "1_2""#));
}
