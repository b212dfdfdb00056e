//! HTTP and WebSocket tests against the full application router.

#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;
use tower::ServiceExt;

use spitr_economy::api::build_app;
use spitr_economy::app_state::AppState;
use spitr_economy::config::EconomySettings;
use spitr_economy::domain::{AccountLedger, EventBus, InMemoryTtlCache, LotteryTicket};
use spitr_economy::service::EconomyService;

fn app() -> Router {
    let economy = EconomyService::with_seed(
        Arc::new(AccountLedger::new()),
        EventBus::new(256),
        EconomySettings::default(),
        Arc::new(InMemoryTtlCache::<String, LotteryTicket>::new(64)),
        42,
    );
    build_app(AppState::new(Arc::new(economy)))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    call_with_headers(app, method, uri, body, &[]).await
}

async fn call_with_headers(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    };
    let Ok(request) = request else {
        panic!("invalid request");
    };
    let Ok(response) = app.clone().oneshot(request).await else {
        panic!("router failed");
    };
    let status = response.status();
    let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body read failed");
    };
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn open_account(app: &Router) -> String {
    let (status, body) = call(app, "POST", "/api/v1/accounts", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let Some(id) = body.get("account_id").and_then(Value::as_str) else {
        panic!("account_id missing: {body}");
    };
    id.to_string()
}

fn number(body: &Value, pointer: &str) -> f64 {
    let Some(n) = body.pointer(pointer).and_then(Value::as_f64) else {
        panic!("{pointer} missing in {body}");
    };
    n
}

#[tokio::test]
async fn health_and_catalog() {
    let app = app();
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("status").and_then(Value::as_str), Some("healthy"));

    let (status, body) = call(&app, "GET", "/config/ticket-tiers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn market_is_within_bounds() {
    let app = app();
    let (status, body) = call(&app, "GET", "/api/v1/market", None).await;
    assert_eq!(status, StatusCode::OK);
    let rate = number(&body, "/daily_rate");
    assert!((0.001..=0.02).contains(&rate));
    let price = number(&body, "/stock_price");
    assert!((50.0..=150.0).contains(&price));
    assert!(body.get("rate_rising").and_then(Value::as_bool).is_some());
}

#[tokio::test]
async fn open_account_with_chosen_id_conflicts_on_retry() {
    let app = app();
    let id = uuid::Uuid::new_v4().to_string();
    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/accounts",
        Some(json!({ "account_id": id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(number(&body, "/wallet/spit"), 1_000.0);
    assert_eq!(body.get("level").and_then(Value::as_u64), Some(1));

    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/accounts",
        Some(json!({ "account_id": id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(number(&body, "/error/code"), 2004.0);
}

#[tokio::test]
async fn unknown_account_is_404() {
    let app = app();
    let uri = format!("/api/v1/accounts/{}", uuid::Uuid::new_v4());
    let (status, body) = call(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(number(&body, "/error/code"), 2001.0);
}

#[tokio::test]
async fn bank_round_trip() {
    let app = app();
    let id = open_account(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/v1/accounts/{id}/bank/deposit"),
        Some(json!({ "currency": "spit", "amount": 400.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(number(&body, "/wallet/spit"), 600.0);
    assert_eq!(number(&body, "/deposit/principal"), 400.0);

    let (status, body) = call(&app, "GET", &format!("/api/v1/accounts/{id}/bank"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(number(&body, "/balances/0/total_balance") >= 400.0);
    assert_eq!(body.pointer("/deposits").and_then(Value::as_array).map(Vec::len), Some(1));

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/v1/accounts/{id}/bank/withdraw"),
        Some(json!({ "currency": "spit", "amount": 100.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(number(&body, "/amount"), 100.0);
    assert_eq!(number(&body, "/wallet/spit"), 700.0);
}

#[tokio::test]
async fn overdraft_and_bad_amounts_are_rejected() {
    let app = app();
    let id = open_account(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/v1/accounts/{id}/bank/deposit"),
        Some(json!({ "currency": "gold", "amount": 11.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(number(&body, "/error/code"), 4001.0);

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/v1/accounts/{id}/bank/deposit"),
        Some(json!({ "currency": "spit", "amount": -5.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/v1/accounts/{id}/bank/withdraw"),
        Some(json!({ "currency": "spit", "amount": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(number(&body, "/error/code"), 4002.0);
}

#[tokio::test]
async fn paycheck_once_per_interval() {
    let app = app();
    let id = open_account(&app).await;
    let uri = format!("/api/v1/accounts/{id}/bank/paycheck");

    let (status, body) = call(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(number(&body, "/deposit/principal"), 500.0);

    let (status, body) = call(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(number(&body, "/error/code"), 4004.0);
    assert!(body.pointer("/error/details").is_some());

    let (_, account) = call(&app, "GET", &format!("/api/v1/accounts/{id}"), None).await;
    assert_eq!(number(&account, "/wallet/spit"), 1_000.0);
}

#[tokio::test]
async fn purge_without_dust_is_422() {
    let app = app();
    let id = open_account(&app).await;
    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/v1/accounts/{id}/bank/purge-dust"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(number(&body, "/error/code"), 4005.0);
}

#[tokio::test]
async fn ticket_lifecycle_with_idempotency() {
    let app = app();
    let id = open_account(&app).await;
    let uri = format!("/api/v1/accounts/{id}/tickets");
    let body = json!({ "ticket_type": "quick" });

    let (status, first) = call_with_headers(
        &app,
        "POST",
        &uri,
        Some(body.clone()),
        &[("Idempotency-Key", "retry-1")],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(first.pointer("/ticket/is_winner").is_none());

    let (status, second) = call_with_headers(
        &app,
        "POST",
        &uri,
        Some(body),
        &[("Idempotency-Key", "retry-1")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second.get("replayed").and_then(Value::as_bool), Some(true));
    assert_eq!(
        first.pointer("/ticket/ticket_id"),
        second.pointer("/ticket/ticket_id")
    );

    let (_, account) = call(&app, "GET", &format!("/api/v1/accounts/{id}"), None).await;
    assert_eq!(number(&account, "/wallet/spit"), 990.0);

    let Some(ticket_id) = first.pointer("/ticket/ticket_id").and_then(Value::as_str) else {
        panic!("ticket id missing");
    };
    let scratch = format!("/api/v1/accounts/{id}/tickets/{ticket_id}/scratch");
    let (status, revealed) = call(&app, "POST", &scratch, None).await;
    assert_eq!(status, StatusCode::OK);
    let prize = number(&revealed, "/ticket/prize_amount");
    assert!((number(&revealed, "/wallet/spit") - (990.0 + prize)).abs() < 1e-9);

    let (_, again) = call(&app, "POST", &scratch, None).await;
    assert_eq!(again.pointer("/ticket"), revealed.pointer("/ticket"));
    assert!((number(&again, "/wallet/spit") - (990.0 + prize)).abs() < 1e-9);

    let (status, list) = call(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.pointer("/tickets").and_then(Value::as_array).map(Vec::len), Some(1));
}

#[tokio::test]
async fn unknown_ticket_tier_is_400() {
    let app = app();
    let id = open_account(&app).await;
    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/v1/accounts/{id}/tickets"),
        Some(json!({ "ticket_type": "diamond" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(number(&body, "/error/code"), 1002.0);
}

#[tokio::test]
async fn chests_and_stock() {
    let app = app();
    let id = open_account(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/v1/accounts/{id}/chests/open"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(number(&body, "/error/code"), 4003.0);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/v1/accounts/{id}/chests/buy"),
        Some(json!({ "count": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(number(&body, "/wallet/gold"), 5.0);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/v1/accounts/{id}/chests/open"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let loot = body.get("loot").and_then(Value::as_array).map(Vec::len);
    assert!(matches!(loot, Some(2 | 3)));
    assert_eq!(body.get("chests_remaining").and_then(Value::as_u64), Some(0));

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/v1/accounts/{id}/stock/buy"),
        Some(json!({ "shares": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("shares_held").and_then(Value::as_u64), Some(2));

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/v1/accounts/{id}/stock/sell"),
        Some(json!({ "shares": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(number(&body, "/error/code"), 4006.0);
}

async fn serve() -> std::net::SocketAddr {
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    let app = app();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

#[tokio::test]
async fn live_server_over_reqwest() {
    let addr = serve().await;
    let client = reqwest::Client::new();

    let response = tokio_test::assert_ok!(
        client
            .post(format!("http://{addr}/api/v1/accounts"))
            .json(&json!({}))
            .send()
            .await
    );
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let body: Value = tokio_test::assert_ok!(response.json().await);
    let Some(id) = body.get("account_id").and_then(Value::as_str) else {
        panic!("account_id missing");
    };

    let response = tokio_test::assert_ok!(
        client
            .get(format!("http://{addr}/api/v1/accounts/{id}/bank"))
            .send()
            .await
    );
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn websocket_streams_subscribed_events() {
    let addr = serve().await;
    let client = reqwest::Client::new();

    let Ok((mut ws, _)) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connect failed");
    };
    let subscribe = json!({
        "id": "sub-1",
        "type": "command",
        "payload": { "command": "subscribe", "account_ids": ["*"] }
    });
    tokio_test::assert_ok!(ws.send(Message::text(subscribe.to_string())).await);

    let Ok(Some(Ok(ack))) = tokio::time::timeout(Duration::from_secs(5), ws.next()).await else {
        panic!("no subscribe ack");
    };
    let ack: Value = serde_json::from_str(ack.to_text().unwrap_or_default()).unwrap_or_default();
    assert_eq!(ack.get("type").and_then(Value::as_str), Some("response"));

    let response = tokio_test::assert_ok!(
        client
            .post(format!("http://{addr}/api/v1/accounts"))
            .json(&json!({}))
            .send()
            .await
    );
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let Ok(Some(Ok(frame))) = tokio::time::timeout(Duration::from_secs(5), ws.next()).await else {
        panic!("no event frame");
    };
    let frame: Value = serde_json::from_str(frame.to_text().unwrap_or_default()).unwrap_or_default();
    assert_eq!(frame.get("type").and_then(Value::as_str), Some("event"));
    assert_eq!(
        frame.pointer("/payload/event_type").and_then(Value::as_str),
        Some("account_opened")
    );
}
