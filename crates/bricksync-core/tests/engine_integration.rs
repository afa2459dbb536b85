#![allow(unused_crate_dependencies)]
#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::expect_used, reason = "integration test, panics are the assertion mechanism")]

mod common;

use std::sync::Arc;
use std::time::Duration;

use bricksync_core::store::MemoryStore;
use bricksync_core::{RateLimitTracker, StaticCredentials, SyncEngine};
use bricksync_types::{Domain, LocalRecord, PartColor, SetNum, SyncOutcome};
use common::{config_for, page, API_KEY, USER_TOKEN};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine(server: &MockServer, store: MemoryStore, credentials: StaticCredentials) -> SyncEngine {
    SyncEngine::from_config(
        config_for(server),
        Arc::new(store),
        Arc::new(credentials),
        Arc::new(RateLimitTracker::new()),
        CancellationToken::new(),
    )
    .expect("engine")
}

async fn mount_set_list(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v3/users/tok/setlists/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": 7, "name": "Brick_Manager" }]),
            None,
        )))
        .mount(server)
        .await;
}

/// (method, path) of every request the server saw, in order.
async fn request_log(server: &MockServer) -> Vec<(String, String)> {
    server
        .received_requests()
        .await
        .expect("request recording is on")
        .iter()
        .map(|r| (r.method.to_string(), r.url.path().to_string()))
        .collect()
}

#[tokio::test]
async fn test_missing_credentials_skip_without_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    let engine = engine(&server, MemoryStore::with_sets([("10179-1", 1)]), StaticCredentials::none());
    let report = engine.sync(Domain::Sets).await;

    assert!(matches!(report.outcome, SyncOutcome::Skipped { .. }));
    assert_eq!(engine.caller().requests_issued(), 0);
}

#[tokio::test]
async fn test_cancelled_engine_skips() {
    let server = MockServer::start().await;
    let cancel = CancellationToken::new();
    let engine = SyncEngine::from_config(
        config_for(&server),
        Arc::new(MemoryStore::new()),
        Arc::new(StaticCredentials::new(API_KEY, USER_TOKEN)),
        Arc::new(RateLimitTracker::new()),
        cancel.clone(),
    )
    .expect("engine");
    cancel.cancel();

    let report = engine.sync(Domain::Sets).await;

    assert_eq!(report.outcome, SyncOutcome::Skipped { reason: "shutting down".to_string() });
}

#[tokio::test]
async fn test_sets_sync_adds_then_updates_then_removes() {
    let server = MockServer::start().await;
    mount_set_list(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v3/users/tok/setlists/7/sets/"))
        .and(header("Authorization", "key test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([
                { "quantity": 1, "set": { "set_num": "75192-1" } },
                { "quantity": 1, "set": { "set_num": "6000-1" } },
            ]),
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v3/users/tok/setlists/7/sets/"))
        .and(body_json(json!([{ "set_num": "10179-1", "quantity": 1 }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "set_num": "10179-1" }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v3/users/tok/setlists/7/sets/"))
        .and(body_json(json!({ "set_num": "75192-1", "quantity": 2 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "set_num": "75192-1" })))
        .expect(1)
        .mount(&server)
        .await;
    for set_num in ["75192-1", "6000-1"] {
        Mock::given(method("DELETE"))
            .and(path(format!("/api/v3/users/tok/setlists/7/sets/{set_num}/")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }

    // Two copies of 75192-1 are owned; the remote lists one
    let store = MemoryStore::with_sets([("10179-1", 1), ("75192-1", 1), ("75192-1", 1)]);
    let engine = engine(&server, store, StaticCredentials::new(API_KEY, USER_TOKEN));
    let report = engine.sync(Domain::Sets).await;

    assert!(report.is_completed(), "unexpected outcome: {:?}", report.outcome);
    assert_eq!((report.added, report.updated, report.removed), (1, 1, 1));
    assert_eq!(report.rate_limited, 0);
    assert!(report.errors.is_empty(), "errors: {:?}", report.errors);
    assert_eq!(report.total_local, 2);
    assert_eq!(report.total_remote, 2);

    let writes: Vec<(String, String)> =
        request_log(&server).await.into_iter().filter(|(m, _)| m != "GET").collect();
    let sets = "/api/v3/users/tok/setlists/7/sets/";
    assert_eq!(
        writes,
        vec![
            ("POST".to_string(), sets.to_string()),
            ("DELETE".to_string(), format!("{sets}75192-1/")),
            ("POST".to_string(), sets.to_string()),
            ("DELETE".to_string(), format!("{sets}6000-1/")),
        ]
    );
}

#[tokio::test]
async fn test_missing_parts_sync_removes_before_adding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/users/tok/lost_parts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{
                "lost_part_id": 900,
                "lost_quantity": 1,
                "inv_part": { "part": { "part_num": "3005" }, "color": { "id": 1 } },
            }]),
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/lego/sets/10179-1/parts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": 4242, "part": { "part_num": "3001" }, "color": { "id": 4 } }]),
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v3/users/tok/lost_parts/900/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v3/users/tok/lost_parts/"))
        .and(body_json(json!([{ "inv_part_id": 4242, "lost_quantity": 2 }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "lost_part_id": 901 }])))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    store.push_missing(
        LocalRecord::from_set(PartColor::new("3001", 4), 2, SetNum::new("10179-1")),
        false,
    );
    // Minifigure parts carry no origin set and cannot be resolved
    store.push_missing(LocalRecord::new(PartColor::new("973pr1", 72), 1), false);
    store.push_missing(LocalRecord::from_set(PartColor::new("4073", 0), 3, SetNum::new("10179-1")), true);

    let engine = engine(&server, store, StaticCredentials::new(API_KEY, USER_TOKEN));
    let report = engine.sync(Domain::MissingParts).await;

    assert!(report.is_completed(), "unexpected outcome: {:?}", report.outcome);
    assert_eq!((report.added, report.removed), (1, 1));
    assert_eq!(report.unresolved, 1);
    assert_eq!(report.total_local, 2);

    let writes: Vec<String> = request_log(&server)
        .await
        .into_iter()
        .filter(|(m, _)| m != "GET")
        .map(|(m, _)| m)
        .collect();
    assert_eq!(writes, vec!["DELETE".to_string(), "POST".to_string()]);
}

#[tokio::test]
async fn test_overlapping_runs_of_one_domain_are_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/users/tok/setlists/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(json!([{ "id": 7, "name": "Brick_Manager" }]), None))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/users/tok/setlists/7/sets/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "quantity": 1, "set": { "set_num": "10179-1" } }]),
            None,
        )))
        .mount(&server)
        .await;

    let engine = engine(
        &server,
        MemoryStore::with_sets([("10179-1", 1)]),
        StaticCredentials::new(API_KEY, USER_TOKEN),
    );

    let (first, second) = tokio::join!(engine.sync(Domain::Sets), engine.sync(Domain::Sets));

    assert!(first.is_completed(), "unexpected outcome: {:?}", first.outcome);
    assert!(!first.has_changes());
    assert_eq!(
        second.outcome,
        SyncOutcome::Skipped { reason: "a sync for this domain is already running".to_string() }
    );
}

#[tokio::test]
async fn test_unavailable_list_is_a_read_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/users/tok/setlists/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid token" })))
        .mount(&server)
        .await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(201)).expect(0).mount(&server).await;

    let engine = engine(
        &server,
        MemoryStore::with_sets([("10179-1", 1)]),
        StaticCredentials::new(API_KEY, USER_TOKEN),
    );
    let report = engine.sync(Domain::Sets).await;

    assert!(matches!(report.outcome, SyncOutcome::ReadFailed { .. }));
    assert_eq!(report.added, 0);
}
