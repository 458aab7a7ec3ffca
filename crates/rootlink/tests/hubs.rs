mod common;

use chrono::{TimeZone, Utc};
use common::Harness;
use rootlink::{NodeRole, RootError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn logged_in_harness(server: &MockServer) -> Harness {
    let mut h = Harness::new(server);
    h.logged_in("AT1", Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap());
    h
}

#[tokio::test]
async fn sync_replaces_cached_hub_ids() {
    let server = MockServer::start().await;
    let mut h = logged_in_harness(&server).await;
    h.cfg
        .profile_mut()
        .unwrap()
        .hub_ids
        .insert("stale-hub".into());

    Mock::given(method("GET"))
        .and(path("/v1/owner/hubs"))
        .and(header("authorization", "Bearer AT1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"hub_id": "hub-b", "name": "garage"},
            {"hub_id": "hub-a"},
            {"name": "no id"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (auth, _store) = h.memory_auth();
    let synced = auth.hubs().sync(&mut h.cfg).await.unwrap();
    assert_eq!(synced.into_iter().collect::<Vec<_>>(), ["hub-a", "hub-b"]);

    let loaded = h.reload();
    let cached: Vec<_> = loaded.profile().unwrap().hub_ids.iter().cloned().collect();
    assert_eq!(cached, ["hub-a", "hub-b"]);
}

#[tokio::test]
async fn add_defaults_to_this_node_and_unions() {
    let server = MockServer::start().await;
    let mut h = logged_in_harness(&server).await;
    h.cfg.profile_mut().unwrap().hub_ids.insert("hub-z".into());
    let node_id = h.cfg.node_id.clone();

    Mock::given(method("POST"))
        .and(path("/v1/owner/hubs"))
        .and(body_json(json!({ "hub_id": node_id })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(2)
        .mount(&server)
        .await;

    let (auth, _store) = h.memory_auth();
    let added = auth.hubs().add_current_hub(&mut h.cfg, None).await.unwrap();
    assert_eq!(added, node_id);
    auth.hubs().add_current_hub(&mut h.cfg, Some("")).await.unwrap();

    let loaded = h.reload();
    let hub_ids = &loaded.profile().unwrap().hub_ids;
    assert_eq!(hub_ids.len(), 2);
    assert!(hub_ids.contains(&node_id));
    assert!(hub_ids.contains("hub-z"));
}

#[tokio::test]
async fn add_failure_leaves_cache_untouched() {
    let server = MockServer::start().await;
    let mut h = logged_in_harness(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/owner/hubs"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"code": "hub_taken"})))
        .mount(&server)
        .await;

    let (auth, _store) = h.memory_auth();
    let err = auth
        .hubs()
        .add_current_hub(&mut h.cfg, Some("hub-x"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), Some("hub_taken"));
    assert!(h.reload().profile().unwrap().hub_ids.is_empty());
}

#[tokio::test]
async fn enroll_returns_raw_response() {
    let server = MockServer::start().await;
    let mut h = logged_in_harness(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/pki/enroll"))
        .and(header("authorization", "Bearer AT1"))
        .and(body_json(json!({"hub_id": "hub-a", "csr_pem": "CSR", "ttl": "24h"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"cert_pem": "CERT", "serial": "01ab"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (auth, _store) = h.memory_auth();
    let out = auth
        .pki()
        .enroll(&mut h.cfg, "hub-a", "CSR", Some("24h"))
        .await
        .unwrap();
    assert_eq!(out, json!({"cert_pem": "CERT", "serial": "01ab"}));
}

#[tokio::test]
async fn scoped_calls_require_hub_role() {
    let server = MockServer::start().await;
    let mut h = logged_in_harness(&server).await;
    h.cfg
        .set_role(NodeRole::Member, Some("https://hub.lan".into()), None)
        .unwrap();

    let (auth, _store) = h.memory_auth();
    assert!(matches!(
        auth.hubs().sync(&mut h.cfg).await.unwrap_err(),
        RootError::AuthState(_)
    ));
    assert!(matches!(
        auth.pki().enroll(&mut h.cfg, "hub-a", "CSR", None).await.unwrap_err(),
        RootError::AuthState(_)
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}
