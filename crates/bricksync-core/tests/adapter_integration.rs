#![allow(unused_crate_dependencies)]
#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::expect_used, reason = "integration test, panics are the assertion mechanism")]

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use bricksync_core::remote::rebrickable::{
    LostPartsAdapter, PartListAdapter, RebrickableApi, SetListAdapter, LOST_PARTS_LIST,
};
use bricksync_core::remote::RemoteListAdapter;
use bricksync_core::sync::{InventoryKeyResolver, KeyResolver};
use bricksync_types::{
    BulkOutcome, ListId, PartColor, RemoteConfig, RemoteRecord, SetNum, WriteItem, WriteOutcome,
};
use common::{api_for, base_url, caller_for, page, API_KEY, USER_TOKEN};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn set_entry(set_num: &str, quantity: u32) -> serde_json::Value {
    json!({ "list_id": 7, "quantity": quantity, "include_spares": true, "set": { "set_num": set_num } })
}

#[tokio::test]
async fn test_read_all_follows_next_links() {
    let server = MockServer::start().await;
    let next = format!("{}/api/v3/users/tok/setlists/7/sets/?page=2", server.uri());
    Mock::given(method("GET"))
        .and(path("/api/v3/users/tok/setlists/7/sets/"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([set_entry("10179-1", 1), set_entry("75192-1", 2)]),
            Some(&next),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/users/tok/setlists/7/sets/"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(json!([set_entry("21309-1", 1)]), None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let adapter = SetListAdapter::new(api_for(&server));
    let snapshot = adapter.read_all(&ListId::new("7")).await;

    assert!(snapshot.complete);
    assert_eq!(snapshot.pages, 2);
    let keys: Vec<&str> = snapshot.records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["10179-1", "75192-1", "21309-1"]);
    assert_eq!(snapshot.records[1].quantity, 2);
}

#[tokio::test]
async fn test_failed_second_page_gives_partial_snapshot() {
    let server = MockServer::start().await;
    let next = format!("{}/api/v3/users/tok/partlists/9/parts/?page=2", server.uri());
    Mock::given(method("GET"))
        .and(path("/api/v3/users/tok/partlists/9/parts/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "part": { "part_num": "3001" }, "color": { "id": 4 }, "quantity": 6 }]),
            Some(&next),
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/users/tok/partlists/9/parts/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = PartListAdapter::new(api_for(&server));
    let snapshot = adapter.read_all(&ListId::new("9")).await;

    assert!(!snapshot.complete);
    assert!(!snapshot.is_failed());
    assert_eq!(snapshot.pages, 1);
    assert_eq!(snapshot.records, vec![RemoteRecord::new(PartColor::new("3001", 4), 6)]);
    assert!(snapshot.failure.is_some());
}

#[tokio::test]
async fn test_failed_first_page_is_a_failed_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/users/tok/lost_parts/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let adapter = LostPartsAdapter::new(api_for(&server));
    let snapshot = adapter.read_all(&ListId::new(LOST_PARTS_LIST)).await;

    assert!(snapshot.is_failed());
    assert!(snapshot.records.is_empty());
}

#[tokio::test]
async fn test_delete_status_mapping() {
    let server = MockServer::start().await;
    let cases = [
        ("10179-1", 204),
        ("75192-1", 404),
        ("21309-1", 429),
        ("6000-1", 500),
    ];
    for (set_num, status) in cases {
        Mock::given(method("DELETE"))
            .and(path(format!("/api/v3/users/tok/setlists/7/sets/{set_num}/")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
    }

    let adapter = SetListAdapter::new(api_for(&server));
    let list = ListId::new("7");
    let delete = |set_num: &str| RemoteRecord::new(SetNum::new(set_num), 1);

    assert_eq!(adapter.delete_one(&list, &delete("10179-1")).await, WriteOutcome::Applied);
    assert_eq!(adapter.delete_one(&list, &delete("75192-1")).await, WriteOutcome::Applied);
    assert_eq!(adapter.delete_one(&list, &delete("21309-1")).await, WriteOutcome::RateLimited);
    assert!(matches!(
        adapter.delete_one(&list, &delete("6000-1")).await,
        WriteOutcome::Failed(_)
    ));
}

#[tokio::test]
async fn test_bulk_add_counts_echoed_entries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/users/tok/setlists/7/sets/"))
        .and(body_json(json!([
            { "set_num": "10179-1", "quantity": 1 },
            { "set_num": "75192-1", "quantity": 2 },
        ])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            set_entry("10179-1", 1),
            set_entry("75192-1", 2),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = SetListAdapter::new(api_for(&server));
    let items = vec![
        WriteItem::new(SetNum::new("10179-1"), 1),
        WriteItem::new(SetNum::new("75192-1"), 2),
    ];
    let outcome = adapter.write_bulk(&ListId::new("7"), &items).await;

    assert_eq!(outcome, BulkOutcome::Accepted { count: 2 });
}

#[tokio::test]
async fn test_lost_parts_write_uses_inventory_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/users/tok/lost_parts/"))
        .and(body_json(json!([{ "inv_part_id": 5_551_212, "lost_quantity": 3 }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "lost_part_id": 1 }])))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = LostPartsAdapter::new(api_for(&server));
    let mut item = WriteItem::new(PartColor::new("3001", 4), 3);
    item.resolved_id = Some("5551212".to_string());

    let outcome = adapter.write_one(&ListId::new(LOST_PARTS_LIST), &item).await;
    assert_eq!(outcome, WriteOutcome::Applied);

    let unresolved = WriteItem::new(PartColor::new("3002", 4), 1);
    let outcome = adapter.write_one(&ListId::new(LOST_PARTS_LIST), &unresolved).await;
    assert!(matches!(outcome, WriteOutcome::Failed(_)));
}

#[tokio::test]
async fn test_ensure_list_finds_existing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/users/tok/setlists/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": 3, "name": "Wishlist" }, { "id": 7, "name": "Brick_Manager" }]),
            None,
        )))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v3/users/tok/setlists/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = SetListAdapter::new(api_for(&server));
    let (list, created) = adapter.ensure_list("Brick_Manager").await.expect("list");

    assert_eq!(list, ListId::new("7"));
    assert!(!created);
}

#[tokio::test]
async fn test_ensure_list_creates_when_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/users/tok/partlists/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(json!([{ "id": 3, "name": "Other" }]), None)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v3/users/tok/partlists/"))
        .and(body_json(json!({ "name": "Missing", "is_buildable": false, "num_parts": 0 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 42, "name": "Missing" })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = PartListAdapter::new(api_for(&server));
    let (list, created) = adapter.ensure_list("Missing").await.expect("list");

    assert_eq!(list, ListId::new("42"));
    assert!(created);
}

#[tokio::test]
async fn test_ensure_list_does_not_create_after_failed_enumeration() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/users/tok/setlists/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v3/users/tok/setlists/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = SetListAdapter::new(api_for(&server));
    let result = adapter.ensure_list("Brick_Manager").await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_inventory_resolver_fetches_each_set_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/lego/sets/10179-1/parts/"))
        .and(query_param("page_size", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([
                { "id": 101, "part": { "part_num": "3001" }, "color": { "id": 4 } },
                { "id": 102, "part": { "part_num": "3002" }, "color": { "id": 4 } },
                { "id": 103, "part": { "part_num": "3003" }, "color": { "id": 1 } },
            ]),
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/lego/sets/75192-1/parts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": 201, "part": { "part_num": "3004" }, "color": { "id": 0 } }]),
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = InventoryKeyResolver::new(api_for(&server));
    let keys = [
        (PartColor::new("3001", 4), "10179-1"),
        (PartColor::new("3002", 4), "10179-1"),
        (PartColor::new("3003", 1), "10179-1"),
        (PartColor::new("3004", 0), "75192-1"),
        (PartColor::new("9999", 0), "75192-1"),
    ];
    let origins: BTreeMap<PartColor, SetNum> =
        keys.iter().map(|(key, set)| (key.clone(), SetNum::new(*set))).collect();
    let items = keys.iter().map(|(key, _)| WriteItem::new(key.clone(), 1)).collect();

    let resolution = resolver.resolve(items, &origins).await;

    assert_eq!(resolution.lookups, 2);
    assert_eq!(resolution.resolved.len(), 4);
    assert_eq!(resolution.unresolved, vec![PartColor::new("9999", 0)]);
    let first = &resolution.resolved[0];
    assert_eq!(first.key, PartColor::new("3001", 4));
    assert_eq!(first.resolved_id.as_deref(), Some("101"));
}

#[tokio::test]
async fn test_inventory_lookup_reads_every_page() {
    let server = MockServer::start().await;
    let next = format!("{}/api/v3/lego/sets/75192-1/parts/?page=2", server.uri());
    Mock::given(method("GET"))
        .and(path("/api/v3/lego/sets/75192-1/parts/"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": 201, "part": { "part_num": "3004" }, "color": { "id": 0 } }]),
            Some(&next),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/lego/sets/75192-1/parts/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": 202, "part": { "part_num": "3005" }, "color": { "id": 0 } }]),
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = InventoryKeyResolver::new(api_for(&server));
    let key = PartColor::new("3005", 0);
    let origins = BTreeMap::from([(key.clone(), SetNum::new("75192-1"))]);

    let resolution = resolver.resolve(vec![WriteItem::new(key.clone(), 2)], &origins).await;

    assert_eq!(resolution.lookups, 1);
    assert!(resolution.unresolved.is_empty());
    assert_eq!(resolution.resolved.len(), 1);
    assert_eq!(resolution.resolved[0].resolved_id.as_deref(), Some("202"));
}

#[tokio::test]
async fn test_inventory_lookup_never_resolves_from_truncated_inventory() {
    let server = MockServer::start().await;
    let next = format!("{}/api/v3/lego/sets/75192-1/parts/?page=2", server.uri());
    Mock::given(method("GET"))
        .and(path("/api/v3/lego/sets/75192-1/parts/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": 201, "part": { "part_num": "3004" }, "color": { "id": 0 } }]),
            Some(&next),
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/lego/sets/75192-1/parts/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let resolver = InventoryKeyResolver::new(api_for(&server));
    let key = PartColor::new("3004", 0);
    let origins = BTreeMap::from([(key.clone(), SetNum::new("75192-1"))]);

    let resolution = resolver.resolve(vec![WriteItem::new(key.clone(), 1)], &origins).await;

    assert!(resolution.resolved.is_empty());
    assert_eq!(resolution.unresolved, vec![key]);
}

#[tokio::test]
async fn test_inventory_lookup_uses_bulk_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/lego/sets/10179-1/parts/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(
                    json!([{ "id": 101, "part": { "part_num": "3001" }, "color": { "id": 4 } }]),
                    None,
                ))
                .set_delay(Duration::from_millis(1500)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let remote = RemoteConfig { timeout_secs: 1, bulk_timeout_secs: 5, ..RemoteConfig::default() };
    let api = Arc::new(RebrickableApi::new(
        caller_for(&base_url(&server), 0),
        API_KEY,
        USER_TOKEN,
        &remote,
    ));
    let resolver = InventoryKeyResolver::new(api);
    let key = PartColor::new("3001", 4);
    let origins = BTreeMap::from([(key.clone(), SetNum::new("10179-1"))]);

    let resolution = resolver.resolve(vec![WriteItem::new(key, 1)], &origins).await;

    assert_eq!(resolution.resolved.len(), 1);
    assert!(resolution.unresolved.is_empty());
}
