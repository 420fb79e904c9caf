mod common;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

use common::{eventually, fast_config, StubProcessor};
use payment_gateway::bootstrap::{GatewayBootstrap, GatewayHandle};

async fn start_gateway(default: &StubProcessor, fallback: &StubProcessor) -> GatewayHandle {
    let config = fast_config(default.base_url(), fallback.base_url());
    GatewayBootstrap::bootstrap_with_config(config).await.unwrap()
}

async fn summary(client: &Client, base: &str) -> Value {
    client
        .get(format!("{base}/payments-summary"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn committed(client: &Client, base: &str, processor: &str) -> u64 {
    summary(client, base).await[processor]["totalRequests"]
        .as_u64()
        .unwrap_or(0)
}

#[tokio::test]
async fn test_payment_is_accepted_then_committed_on_default() {
    let default = StubProcessor::start().await;
    let fallback = StubProcessor::start().await;
    let gateway = start_gateway(&default, &fallback).await;
    let base = format!("http://{}", gateway.local_addr());
    let client = Client::new();
    let correlation_id = Uuid::new_v4();

    let response = client
        .post(format!("{base}/payments"))
        .header("content-type", "application/json")
        // raw body keeps the amount's scale exact
        .body(format!(r#"{{"correlationId":"{correlation_id}","amount":19.90}}"#))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    assert!(
        eventually(Duration::from_secs(5), || async {
            committed(&client, &base, "default").await == 1
        })
        .await
    );
    let totals = summary(&client, &base).await;
    assert_eq!(totals["default"]["totalAmount"].to_string(), "19.90");
    assert_eq!(totals["fallback"]["totalRequests"], 0);
    assert_eq!(
        default.received()[0]["correlationId"],
        correlation_id.to_string()
    );
    assert!(fallback.received().is_empty());

    gateway.stop().await.unwrap();
}

#[tokio::test]
async fn test_failing_default_routes_to_fallback() {
    let default = StubProcessor::start().await;
    let fallback = StubProcessor::start().await;
    default.set_failing(true);
    let gateway = start_gateway(&default, &fallback).await;
    let base = format!("http://{}", gateway.local_addr());
    let client = Client::new();

    client
        .post(format!("{base}/payments"))
        .json(&json!({ "amount": 250.00 }))
        .send()
        .await
        .unwrap();

    assert!(
        eventually(Duration::from_secs(5), || async {
            committed(&client, &base, "fallback").await == 1
        })
        .await
    );
    assert!(default.received().is_empty());

    gateway.stop().await.unwrap();
}

#[tokio::test]
async fn test_both_failing_holds_payment_until_recovery() {
    let default = StubProcessor::start().await;
    let fallback = StubProcessor::start().await;
    default.set_failing(true);
    fallback.set_failing(true);
    let gateway = start_gateway(&default, &fallback).await;
    let base = format!("http://{}", gateway.local_addr());
    let client = Client::new();

    client
        .post(format!("{base}/payments"))
        .json(&json!({ "amount": 5.00 }))
        .send()
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(committed(&client, &base, "default").await, 0);
    assert_eq!(committed(&client, &base, "fallback").await, 0);
    assert!(gateway.dispatch().health_report().stats.workers.requeued > 0);

    default.set_failing(false);
    assert!(
        eventually(Duration::from_secs(5), || async {
            committed(&client, &base, "default").await == 1
        })
        .await
    );

    gateway.stop().await.unwrap();
}

#[tokio::test]
async fn test_invalid_amount_is_bad_request() {
    let default = StubProcessor::start().await;
    let fallback = StubProcessor::start().await;
    let gateway = start_gateway(&default, &fallback).await;
    let base = format!("http://{}", gateway.local_addr());

    let response = Client::new()
        .post(format!("{base}/payments"))
        .json(&json!({ "amount": -1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    gateway.stop().await.unwrap();
}

#[tokio::test]
async fn test_summary_range_and_purge() {
    let default = StubProcessor::start().await;
    let fallback = StubProcessor::start().await;
    let gateway = start_gateway(&default, &fallback).await;
    let base = format!("http://{}", gateway.local_addr());
    let client = Client::new();

    for _ in 0..3 {
        client
            .post(format!("{base}/payments"))
            .json(&json!({ "amount": 10 }))
            .send()
            .await
            .unwrap();
    }
    assert!(
        eventually(Duration::from_secs(5), || async {
            committed(&client, &base, "default").await == 3
        })
        .await
    );

    let before: Value = client
        .get(format!("{base}/payments-summary"))
        .query(&[("to", "2000-01-01T00:00:00Z")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(before["default"]["totalRequests"], 0);

    let purged = client
        .post(format!("{base}/purge-payments"))
        .send()
        .await
        .unwrap();
    assert_eq!(purged.status(), StatusCode::OK);
    assert_eq!(committed(&client, &base, "default").await, 0);

    gateway.stop().await.unwrap();
}

#[tokio::test]
async fn test_health_and_internal_surface() {
    let default = StubProcessor::start().await;
    let fallback = StubProcessor::start().await;
    fallback.set_failing(true);
    let gateway = start_gateway(&default, &fallback).await;
    let base = format!("http://{}", gateway.local_addr());
    let client = Client::new();

    assert!(
        eventually(Duration::from_secs(5), || async {
            let report: Value = client
                .get(format!("{base}/health"))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            report["defaultActive"] == true
        })
        .await
    );

    let report: Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["fallbackActive"], false);
    assert_eq!(report["replicaRole"], "DESIGNATED_LEADER");
    assert!(report["queueDepth"].is_u64());

    let snapshot: Value = client
        .get(format!("{base}/internal/health/default"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(snapshot, json!({ "failing": false, "minResponseTime": 7 }));

    let unknown = client
        .get(format!("{base}/internal/health/primary"))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    gateway.stop().await.unwrap();
}
