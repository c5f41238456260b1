//! Integration tests for the `huelink` binary.
//!
//! Argument parsing, schema output, and the discover and pair commands
//! against a mocked bridge.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// `huelink` with env isolation: no `HUELINK_*` leaks in, and config
/// directories point at a nonexistent path.
fn huelink_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("huelink");
    cmd.env("HOME", "/tmp/huelink-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/huelink-cli-test-nonexistent")
        .env_remove("HUELINK_CONFIG")
        .env_remove("HUELINK_ADDRESS")
        .env_remove("HUELINK_CREDENTIAL")
        .env_remove("HUELINK_POLL_INTERVAL_SECS")
        .env_remove("HUELINK_DISCOVERY_URL")
        .env_remove("RUST_LOG");
    cmd
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = huelink_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = String::from_utf8_lossy(&output.stderr);
    assert!(text.contains("Usage"), "expected usage in:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    huelink_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("run")
            .and(predicate::str::contains("discover"))
            .and(predicate::str::contains("pair"))
            .and(predicate::str::contains("schema")),
    );
}

#[test]
fn test_version_flag() {
    huelink_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("huelink"));
}

#[test]
fn test_schema_prints_json() {
    let output = huelink_cmd().arg("schema").output().unwrap();
    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(schema["properties"]["address"]["type"], "string");
    assert_eq!(schema["properties"]["poll_interval_secs"]["default"], 5);
}

#[test]
fn test_zero_poll_interval_is_usage_error() {
    huelink_cmd()
        .args(["--poll-interval", "0", "--address", "127.0.0.1:1", "run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("poll-interval"));
}

// ── Discovery ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_discover_lists_bridges() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "001788fffe4a", "internalipaddress": "192.168.1.20" },
            { "id": "001788fffe4b", "internalipaddress": "192.168.1.21", "port": 8080 }
        ])))
        .mount(&server)
        .await;

    huelink_cmd()
        .args(["--discovery-url", &server.uri(), "discover"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("192.168.1.20\t001788fffe4a")
                .and(predicate::str::contains("192.168.1.21:8080\t001788fffe4b")),
        );
}

#[tokio::test]
async fn test_discover_empty_exits_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    huelink_cmd()
        .args(["--discovery-url", &server.uri(), "discover"])
        .assert()
        .code(4);
}

// ── Pairing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_pair_saves_credential_and_address() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "success": { "username": "abc123" } }])),
        )
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested").join("config.toml");

    huelink_cmd()
        .arg("--config")
        .arg(&config)
        .args(["--address", &server.uri(), "pair"])
        .assert()
        .success();

    let saved = std::fs::read_to_string(&config).unwrap();
    assert!(saved.contains(r#"credential = "abc123""#), "{saved}");
    assert!(saved.contains(&format!(r#"address = "{}""#, server.uri())), "{saved}");
}

#[tokio::test]
async fn test_pair_rejected_exits_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "error": { "type": 101, "address": "", "description": "link button not pressed" }
        }])))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    huelink_cmd()
        .arg("--config")
        .arg(&config)
        .args(["--address", &server.uri(), "pair"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("link button not pressed"));

    assert!(!config.exists());
}
