//! Collection endpoint tests.

use std::time::Duration;

use page_vitals::config::VitalsConfig;
use page_vitals::storage::{CSV_FILE, CSV_HEADER, JSON_FILE};
use serde_json::{json, Value};

mod common;

fn stored_documents(dir: &std::path::Path) -> Vec<Value> {
    let body = std::fs::read_to_string(dir.join(JSON_FILE)).unwrap();
    serde_json::from_str(&body).unwrap()
}

#[tokio::test]
async fn test_stores_record_in_json_and_csv() {
    let dir = tempfile::tempdir().unwrap();
    let collector = common::start_collector(dir.path()).await;
    let client = common::http_client();

    let record = json!({
        "id": "7d0c2a6e-1111-4a4a-9c9c-000000000001",
        "pageUrl": "/ssr",
        "pageType": "SSR",
        "timestamp": 1700000000000u64,
        "ttfb": 81.5,
        "lcp": 1210,
        "inp": null,
        "incomplete": true,
        "device": {
            "userAgent": "Mozilla/5.0",
            "connectionType": "4g",
            "deviceMemory": 8,
            "viewport": { "width": 1280, "height": 720 }
        }
    });
    let res = client
        .post(collector.url("/api/metrics"))
        .json(&record)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let ack: Value = res.json().await.unwrap();
    assert_eq!(
        ack,
        json!({ "success": true, "id": "7d0c2a6e-1111-4a4a-9c9c-000000000001" })
    );

    let docs = stored_documents(dir.path());
    assert_eq!(docs, vec![record]);

    let csv = std::fs::read_to_string(dir.path().join(CSV_FILE)).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(
        lines[1],
        "\"7d0c2a6e-1111-4a4a-9c9c-000000000001\",1700000000000,\"SSR\",\"/ssr\",81.5,1210,,,,,true,\"Mozilla/5.0\",\"4g\",8"
    );

    collector.shutdown.trigger();
}

#[tokio::test]
async fn test_assigns_id_when_absent() {
    let dir = tempfile::tempdir().unwrap();
    let collector = common::start_collector(dir.path()).await;
    let client = common::http_client();

    let res = client
        .post(collector.url("/api/metrics"))
        .json(&json!({ "pageUrl": "/csr", "pageType": "CSR" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let ack: Value = res.json().await.unwrap();
    let id = ack["id"].as_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());

    let docs = stored_documents(dir.path());
    assert_eq!(docs[0]["id"], json!(id));

    collector.shutdown.trigger();
}

#[tokio::test]
async fn test_rejects_missing_page_url() {
    let dir = tempfile::tempdir().unwrap();
    let collector = common::start_collector(dir.path()).await;
    let client = common::http_client();

    for body in [json!({ "ttfb": 10 }), json!({ "pageUrl": "" }), json!([1, 2])] {
        let res = client
            .post(collector.url("/api/metrics"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400);
        let err: Value = res.json().await.unwrap();
        assert_eq!(err["success"], json!(false));
        assert!(err["error"].is_string());
    }
    assert!(!dir.path().join(JSON_FILE).exists());

    collector.shutdown.trigger();
}

#[tokio::test]
async fn test_rejects_non_string_id() {
    let dir = tempfile::tempdir().unwrap();
    let collector = common::start_collector(dir.path()).await;
    let client = common::http_client();

    for id in [json!(42), json!(null), json!(""), json!({ "v": 1 })] {
        let res = client
            .post(collector.url("/api/metrics"))
            .json(&json!({ "id": id, "pageUrl": "/ssr" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400);
    }
    assert!(!dir.path().join(JSON_FILE).exists());

    collector.shutdown.trigger();
}

#[tokio::test]
async fn test_rejects_non_json_body() {
    let dir = tempfile::tempdir().unwrap();
    let collector = common::start_collector(dir.path()).await;
    let client = common::http_client();

    let res = client
        .post(collector.url("/api/metrics"))
        .header("content-type", "application/json")
        .body("ttfb=10&lcp=20")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    collector.shutdown.trigger();
}

#[tokio::test]
async fn test_store_failure_is_500() {
    let blocker = tempfile::NamedTempFile::new().unwrap();
    let collector = common::start_collector(&blocker.path().join("metrics")).await;
    let client = common::http_client();

    let res = client
        .post(collector.url("/api/metrics"))
        .json(&json!({ "pageUrl": "/ssr" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["success"], json!(false));

    collector.shutdown.trigger();
}

#[tokio::test]
async fn test_cors_preflight() {
    let dir = tempfile::tempdir().unwrap();
    let collector = common::start_collector(dir.path()).await;
    let client = common::http_client();

    let res = client
        .request(reqwest::Method::OPTIONS, collector.url("/api/metrics"))
        .header("origin", "https://shop.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    collector.shutdown.trigger();
}

#[tokio::test]
async fn test_no_cors_when_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = VitalsConfig::default();
    config.storage.dir = dir.path().display().to_string();
    config.security.cors_permissive = false;
    let collector = common::start_collector_with(config).await;
    let client = common::http_client();

    let res = client
        .post(collector.url("/api/metrics"))
        .header("origin", "https://shop.example.com")
        .json(&json!({ "pageUrl": "/ssr" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(!res.headers().contains_key("access-control-allow-origin"));

    collector.shutdown.trigger();
}

#[tokio::test]
async fn test_body_limit() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = VitalsConfig::default();
    config.storage.dir = dir.path().display().to_string();
    config.security.max_body_size = 256;
    let collector = common::start_collector_with(config).await;
    let client = common::http_client();

    let res = client
        .post(collector.url("/api/metrics"))
        .json(&json!({ "pageUrl": "/ssr", "padding": "x".repeat(1024) }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 413);

    collector.shutdown.trigger();
}

#[tokio::test]
async fn test_status_counts_records() {
    let dir = tempfile::tempdir().unwrap();
    let collector = common::start_collector(dir.path()).await;
    let client = common::http_client();

    for url in ["/ssr", "/csr", "/ssr"] {
        let res = client
            .post(collector.url("/api/metrics"))
            .json(&json!({ "pageUrl": url }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }

    let status: Value = client
        .get(collector.url("/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"], json!("ok"));
    assert_eq!(status["records"], json!(3));
    assert_eq!(status["version"], json!(env!("CARGO_PKG_VERSION")));

    collector.shutdown.trigger();
}

#[tokio::test]
async fn test_graceful_shutdown_stops_accepting() {
    let dir = tempfile::tempdir().unwrap();
    let collector = common::start_collector(dir.path()).await;
    let client = common::http_client();

    let res = client.get(collector.url("/status")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    collector.shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(client.get(collector.url("/status")).send().await.is_err());
}
