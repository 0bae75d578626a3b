//! End-to-end CLI tests for the setget binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::MockServer;

mod support;
use support::flickr_mock::{MockItem, mount_item, mount_set, mount_set_failure, mount_sizes, rest_url};

/// Binary with a clean environment: no real settings file, no real endpoint.
fn setget(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("setget").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("SETGET_API_KEY")
        .env_remove("SETGET_SECRET")
        .env_remove("SETGET_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    setget(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Flickr set"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("auth"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    setget(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("setget"));
}

#[test]
fn test_missing_subcommand_is_usage_error() {
    let home = TempDir::new().unwrap();
    setget(&home).assert().failure();
}

#[test]
fn test_sizes_lists_both_vocabularies() {
    let home = TempDir::new().unwrap();
    setget(&home)
        .arg("sizes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Photo sizes"))
        .stdout(predicate::str::contains("Original"))
        .stdout(predicate::str::contains("Video sizes"))
        .stdout(predicate::str::contains("HD MP4"));
}

#[test]
fn test_get_rejects_zero_concurrency() {
    let home = TempDir::new().unwrap();
    setget(&home)
        .args(["get", "1", "u", "-c", "0", "--api-key", "k"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("concurrency").or(predicate::str::contains("0")));
}

#[test]
fn test_get_without_api_key_fails_with_suggestion() {
    let home = TempDir::new().unwrap();
    setget(&home)
        .args(["get", "1", "u"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No API key"));
}

#[test]
fn test_get_auth_without_saved_token_fails() {
    let home = TempDir::new().unwrap();
    setget(&home)
        .args(["get", "1", "u", "--api-key", "k", "--auth"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("setget auth"));
}

#[test]
fn test_malformed_settings_file_is_reported() {
    let home = TempDir::new().unwrap();
    let settings = home.path().join("settings");
    std::fs::write(&settings, "api_key = k\ncolour = blue\n").unwrap();

    setget(&home)
        .arg("--settings")
        .arg(&settings)
        .args(["get", "1", "u"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("line 2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_downloads_set_and_exits_zero() {
    let server = MockServer::start().await;
    mount_set(
        &server,
        "Harbour",
        &[MockItem::photo("1", "Boat"), MockItem::video("2", "Tide")],
    )
    .await;
    mount_item(&server, "1", &[("Large", "photo")], ("Large", "photo"), b"boat").await;
    mount_item(&server, "2", &[("Site MP4", "video")], ("Site MP4", "video"), b"tide").await;
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    setget(&home)
        .env("SETGET_API_URL", rest_url(&server))
        .args(["get", "72157", "1@N00", "--api-key", "k", "-c", "2", "-o"])
        .arg(out.path())
        .assert()
        .code(0);

    assert_eq!(std::fs::read(out.path().join("Boat.jpg")).unwrap(), b"boat");
    assert_eq!(std::fs::read(out.path().join("Tide.mp4")).unwrap(), b"tide");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_with_warnings_exits_two() {
    let server = MockServer::start().await;
    mount_set(&server, "Harbour", &[MockItem::photo("1", "Boat")]).await;
    mount_sizes(&server, "1", &[("Small", "photo")]).await;
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    setget(&home)
        .env("SETGET_API_URL", rest_url(&server))
        .args(["get", "72157", "1@N00", "--api-key", "k", "-s", "Huge", "-o"])
        .arg(out.path())
        .assert()
        .code(2);

    assert!(!out.path().join("Boat.jpg").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_unknown_set_exits_one() {
    let server = MockServer::start().await;
    mount_set_failure(&server, 1, "Photoset not found").await;
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    setget(&home)
        .env("SETGET_API_URL", rest_url(&server))
        .args(["get", "0", "1@N00", "--api-key", "k", "-o"])
        .arg(out.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Photoset not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_auth_saves_token_to_settings_file() {
    use serde_json::json;
    use support::flickr_mock::REST_PATH;
    use wiremock::matchers::{path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(path(REST_PATH))
        .and(query_param("method", "flickr.auth.getFullToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "auth": {
                "token": {"_content": "saved-token"},
                "user": {"nsid": "7@N01", "username": "gull"}
            },
            "stat": "ok"
        })))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let settings = home.path().join("settings");

    setget(&home)
        .env("SETGET_API_URL", rest_url(&server))
        .arg("--settings")
        .arg(&settings)
        .args([
            "auth",
            "--api-key",
            "app-key",
            "--secret",
            "app-secret",
            "--auth-url",
            "https://www.flickr.com/auth-{api_key}",
            "--mini-token",
            "123-456-789",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://www.flickr.com/auth-app-key"))
        .stdout(predicate::str::contains("Authenticated as gull (7@N01)"));

    let saved = std::fs::read_to_string(&settings).unwrap();
    assert!(saved.contains("saved-token"), "{saved}");
    assert!(saved.contains("app-secret"), "{saved}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_auth_uses_env_credentials_without_saving_them() {
    use serde_json::json;
    use support::flickr_mock::REST_PATH;
    use wiremock::matchers::{path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(path(REST_PATH))
        .and(query_param("method", "flickr.auth.getFullToken"))
        .and(query_param("api_key", "env-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "auth": {
                "token": {"_content": "fresh-token"},
                "user": {"nsid": "7@N01", "username": "gull"}
            },
            "stat": "ok"
        })))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let settings = home.path().join("settings");
    std::fs::write(&settings, "api_key = file-key\nsecret = file-secret\n").unwrap();

    setget(&home)
        .env("SETGET_API_URL", rest_url(&server))
        .env("SETGET_API_KEY", "env-key")
        .env("SETGET_SECRET", "env-secret")
        .arg("--settings")
        .arg(&settings)
        .args([
            "auth",
            "--auth-url",
            "https://www.flickr.com/auth-{api_key}",
            "--mini-token",
            "123-456-789",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://www.flickr.com/auth-env-key"));

    let saved = std::fs::read_to_string(&settings).unwrap();
    assert!(saved.contains("fresh-token"), "{saved}");
    assert!(saved.contains("file-key"), "{saved}");
    assert!(saved.contains("file-secret"), "{saved}");
    assert!(!saved.contains("env-key"), "{saved}");
    assert!(!saved.contains("env-secret"), "{saved}");
}

#[test]
fn test_auth_rejects_malformed_mini_token() {
    let home = TempDir::new().unwrap();
    setget(&home)
        .args([
            "auth",
            "--api-key",
            "k",
            "--secret",
            "s",
            "--auth-url",
            "https://www.flickr.com/auth",
            "--mini-token",
            "12-34",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid mini-token"));
}
