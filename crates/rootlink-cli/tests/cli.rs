use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rootlink(base_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("rootlink").unwrap();
    cmd.arg("--base-dir")
        .arg(base_dir)
        .env_remove("ROOTLINK_ROOT_URL")
        .env_remove("ROOTLINK_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn show_json(base_dir: &std::path::Path) -> Value {
    let out = rootlink(base_dir)
        .args(["node", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn test_help() {
    Command::cargo_bin("rootlink")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hub"))
        .stdout(predicate::str::contains("root"));
}

#[test]
fn test_config_path() {
    let dir = tempfile::tempdir().unwrap();
    rootlink(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("node.toml"));
}

#[test]
fn test_node_show_creates_identity_and_masks_token() {
    let dir = tempfile::tempdir().unwrap();
    let view = show_json(dir.path());

    assert_eq!(view["role"], "hub");
    assert_eq!(view["token"], "dev-...oken");
    assert!(dir.path().join("node.toml").exists());

    let again = show_json(dir.path());
    assert_eq!(again["node_id"], view["node_id"]);
}

#[test]
fn test_default_token_flag_seeds_new_document() {
    let dir = tempfile::tempdir().unwrap();
    rootlink(dir.path())
        .args(["--default-token", "lab-shared-token-0001", "node", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lab-...0001"));
}

#[test]
fn test_member_role_needs_hub_url() {
    let dir = tempfile::tempdir().unwrap();
    rootlink(dir.path())
        .args(["node", "role", "member"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hub_url"));

    rootlink(dir.path())
        .args(["node", "role", "member", "--hub-url", "https://hub.lan"])
        .assert()
        .success();

    let view = show_json(dir.path());
    assert_eq!(view["role"], "member");
    assert_eq!(view["hub_url"], "https://hub.lan");
}

#[test]
fn test_invalid_role_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    rootlink(dir.path())
        .args(["node", "role", "leader"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hub' or 'member"));
}

#[test]
fn test_token_requires_login() {
    let dir = tempfile::tempdir().unwrap();
    rootlink(dir.path())
        .args(["root", "token"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("login"));
}

#[test]
fn test_node_register_needs_known_subnet() {
    let dir = tempfile::tempdir().unwrap();
    rootlink(dir.path())
        .args(["node", "register", "--token", "boot-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no subnet is registered"));
    assert!(!dir.path().join("keys").exists());
}

#[test]
fn test_node_register_without_hub_credentials() {
    let dir = tempfile::tempdir().unwrap();
    rootlink(dir.path())
        .args(["node", "role", "hub", "--subnet-id", "sn-1"])
        .assert()
        .success();
    assert_eq!(show_json(dir.path())["subnet_registered"], true);

    rootlink(dir.path())
        .args(["node", "register"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hub credentials are missing"));
    assert!(!dir.path().join("keys").join("node.key").exists());
}

#[test]
fn test_hub_init_requires_token() {
    let dir = tempfile::tempdir().unwrap();
    rootlink(dir.path())
        .args(["hub", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--token"));
}

#[tokio::test]
async fn test_login_and_logout_against_mock_root() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let subnet = show_json(dir.path())["subnet_id"]
        .as_str()
        .unwrap()
        .to_string();

    Mock::given(method("POST"))
        .and(path("/v1/auth/owner/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "abc",
            "user_code": "WXYZ-1234",
            "verification_uri": "https://root.example/device",
            "interval": 1,
            "expires_in": 60
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/owner/poll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "AT1",
            "refresh_token": "RT1",
            "expires_at": "2099-01-01T00:00:00Z",
            "owner_id": subnet
        })))
        .mount(&server)
        .await;

    rootlink(dir.path())
        .args(["--root-url", &server.uri(), "root", "login", "-o", "json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("WXYZ-1234"))
        .stdout(predicate::str::contains("2099-01-01T00:00:00Z"));

    rootlink(dir.path())
        .args(["--root-url", &server.uri(), "root", "token"])
        .assert()
        .success()
        .stdout("AT1\n");

    rootlink(dir.path())
        .args(["root", "logout"])
        .assert()
        .success();

    let view = show_json(dir.path());
    assert!(view.get("root").is_none());
}
