use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value};
use toshl_cli::cache::CacheStore;
use toshl_cli::commands::{run, Command};
use toshl_cli::config::ApiConfig;
use toshl_cli::toshl::types::EntryKind;
use toshl_cli::toshl::{CachedToshlClient, ToshlClient};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cached_client(server: &MockServer) -> CachedToshlClient {
  let api = ApiConfig {
    url: server.uri(),
    timeout_secs: 5,
  };
  let inner = ToshlClient::with_token(&api, "secret").expect("client");
  CachedToshlClient::with_transport(inner, Arc::new(CacheStore::new(false)))
}

async fn run_to_string(client: &CachedToshlClient, command: Command, json: bool) -> String {
  let mut out = Vec::new();
  run(command, client, json, &mut out).await.unwrap();
  String::from_utf8(out).unwrap()
}

async fn mount_get(server: &MockServer, route: &str, body: Value) {
  Mock::given(method("GET"))
    .and(path(route))
    .respond_with(ResponseTemplate::new(200).set_body_json(body))
    .mount(server)
    .await;
}

async fn mount_reference_data(server: &MockServer) {
  mount_get(
    server,
    "/categories",
    json!([
      { "id": "c1", "name": "Food", "type": "expense" },
      { "id": "c2", "name": "Salary", "type": "income" },
      { "id": "c3", "name": "Rent", "type": "expense" }
    ]),
  )
  .await;
  mount_get(
    server,
    "/tags",
    json!([
      { "id": "t1", "name": "lunch", "type": "expense", "category": "c1" },
      { "id": "t2", "name": "bonus", "type": "income", "category": "c2" }
    ]),
  )
  .await;
  mount_get(
    server,
    "/accounts",
    json!([
      { "id": "a1", "name": "Wallet", "balance": 150.0, "currency": { "code": "EUR" } },
      { "id": "a2", "name": "Shared", "balance": 0.0 }
    ]),
  )
  .await;
}

fn entry_json(amount: f64, category: &str) -> Value {
  json!({
    "id": "e1",
    "amount": amount,
    "currency": { "code": "EUR" },
    "date": "2026-03-01",
    "desc": "lunch",
    "account": "a1",
    "category": category,
    "tags": [],
    "modified": "2026-03-01 12:00:00.000"
  })
}

#[tokio::test]
async fn categories_filtered_by_kind() {
  let server = MockServer::start().await;
  mount_reference_data(&server).await;
  let client = cached_client(&server);

  let text = run_to_string(
    &client,
    Command::Categories {
      kind: Some(EntryKind::Income),
    },
    false,
  )
  .await;

  assert_eq!(text, "c2  income  Salary\n");
}

#[tokio::test]
async fn tags_resolve_category_by_name() {
  let server = MockServer::start().await;
  mount_reference_data(&server).await;
  let client = cached_client(&server);

  let text = run_to_string(
    &client,
    Command::Tags {
      category: Some("food".into()),
    },
    true,
  )
  .await;

  let tags: Value = serde_json::from_str(&text).unwrap();
  assert_eq!(
    tags,
    json!([{ "id": "t1", "name": "lunch", "kind": "expense", "category": "c1" }])
  );
}

#[tokio::test]
async fn accounts_json_lists_records() {
  let server = MockServer::start().await;
  mount_reference_data(&server).await;
  let client = cached_client(&server);

  let text = run_to_string(&client, Command::Accounts, true).await;

  let accounts: Value = serde_json::from_str(&text).unwrap();
  assert_eq!(accounts[0]["id"], "a1");
  assert_eq!(accounts[0]["currency"], "EUR");
  assert_eq!(accounts[0]["balance"], 150.0);
  assert_eq!(accounts.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn add_resolves_names_and_uses_account_currency() {
  let server = MockServer::start().await;
  mount_reference_data(&server).await;
  Mock::given(method("POST"))
    .and(path("/entries"))
    .and(body_partial_json(json!({
      "amount": -12.5,
      "currency": { "code": "EUR" },
      "date": "2026-03-01",
      "account": "a1",
      "category": "c1",
      "tags": ["t1"]
    })))
    .respond_with(ResponseTemplate::new(201).insert_header("location", "/entries/e42"))
    .expect(1)
    .mount(&server)
    .await;
  let client = cached_client(&server);

  let text = run_to_string(
    &client,
    Command::Add {
      amount: 12.5,
      category: "food".into(),
      account: "wallet".into(),
      tags: vec!["lunch".into()],
      currency: None,
      date: NaiveDate::from_ymd_opt(2026, 3, 1),
      desc: None,
    },
    true,
  )
  .await;

  let created: Value = serde_json::from_str(&text).unwrap();
  assert_eq!(created, json!({ "id": "e42" }));
}

#[tokio::test]
async fn add_falls_back_to_default_currency() {
  let server = MockServer::start().await;
  mount_reference_data(&server).await;
  mount_get(&server, "/me", json!({ "id": "u1", "currency": { "main": "USD" } })).await;
  Mock::given(method("POST"))
    .and(path("/entries"))
    .and(body_partial_json(json!({
      "amount": 300.0,
      "currency": { "code": "USD" },
      "account": "a2",
      "category": "c2"
    })))
    .respond_with(ResponseTemplate::new(201).insert_header("location", "/entries/e7"))
    .expect(1)
    .mount(&server)
    .await;
  let client = cached_client(&server);

  let text = run_to_string(
    &client,
    Command::Add {
      amount: -300.0,
      category: "salary".into(),
      account: "shared".into(),
      tags: vec![],
      currency: None,
      date: NaiveDate::from_ymd_opt(2026, 3, 1),
      desc: None,
    },
    false,
  )
  .await;

  assert_eq!(text, "created entry e7\n");
}

#[tokio::test]
async fn add_rejects_unknown_tag() {
  let server = MockServer::start().await;
  mount_reference_data(&server).await;
  let client = cached_client(&server);

  let mut out = Vec::new();
  let err = run(
    Command::Add {
      amount: 1.0,
      category: "food".into(),
      account: "wallet".into(),
      tags: vec!["groceries".into()],
      currency: None,
      date: None,
      desc: None,
    },
    &client,
    false,
    &mut out,
  )
  .await
  .unwrap_err();

  assert_eq!(err.to_string(), "no tag named 'groceries'");
  assert!(out.is_empty());
}

#[tokio::test]
async fn update_without_changes_is_rejected() {
  let server = MockServer::start().await;
  let client = cached_client(&server);

  let mut out = Vec::new();
  let err = run(
    Command::Update {
      id: "e1".into(),
      amount: None,
      category: None,
      date: None,
      desc: None,
    },
    &client,
    false,
    &mut out,
  )
  .await
  .unwrap_err();

  assert_eq!(err.to_string(), "nothing to update");
  assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_amount_keeps_expense_sign() {
  let server = MockServer::start().await;
  mount_get(&server, "/entries/e1", entry_json(-12.5, "c1")).await;
  Mock::given(method("PUT"))
    .and(path("/entries/e1"))
    .and(body_partial_json(json!({
      "amount": -20.0,
      "category": "c1",
      "modified": "2026-03-01 12:00:00.000"
    })))
    .respond_with(ResponseTemplate::new(200).set_body_json(entry_json(-20.0, "c1")))
    .expect(1)
    .mount(&server)
    .await;
  let client = cached_client(&server);

  let text = run_to_string(
    &client,
    Command::Update {
      id: "e1".into(),
      amount: Some(20.0),
      category: None,
      date: None,
      desc: None,
    },
    false,
  )
  .await;

  assert_eq!(text, "e1  2026-03-01  -20.00 EUR  lunch\n");
}

#[tokio::test]
async fn update_category_resigns_amount() {
  let server = MockServer::start().await;
  mount_reference_data(&server).await;
  mount_get(&server, "/entries/e1", entry_json(-12.5, "c1")).await;
  Mock::given(method("PUT"))
    .and(path("/entries/e1"))
    .and(body_partial_json(json!({ "amount": 12.5, "category": "c2" })))
    .respond_with(ResponseTemplate::new(200).set_body_json(entry_json(12.5, "c2")))
    .expect(1)
    .mount(&server)
    .await;
  let client = cached_client(&server);

  let text = run_to_string(
    &client,
    Command::Update {
      id: "e1".into(),
      amount: None,
      category: Some("salary".into()),
      date: None,
      desc: None,
    },
    true,
  )
  .await;

  let entry: Value = serde_json::from_str(&text).unwrap();
  assert_eq!(entry["amount"], 12.5);
  assert_eq!(entry["category"], "c2");
}

#[tokio::test]
async fn delete_reports_id() {
  let server = MockServer::start().await;
  Mock::given(method("DELETE"))
    .and(path("/entries/e1"))
    .respond_with(ResponseTemplate::new(204))
    .expect(1)
    .mount(&server)
    .await;
  let client = cached_client(&server);

  let text = run_to_string(&client, Command::Delete { id: "e1".into() }, true).await;

  let deleted: Value = serde_json::from_str(&text).unwrap();
  assert_eq!(deleted, json!({ "deleted": "e1" }));
}
