//! HTTP surface tests
//!
//! Drives the router with `oneshot` requests. The record store points at a
//! closed local port, so only routes that answer before reaching the store
//! (or that report its absence) are exercised here.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use quote_builder_backend::config::{AirtableConfig, Config, ServerConfig, TableConfig};
use quote_builder_backend::{create_app, AppState};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use shared::{Item, ItemKind, Quote};
use tower::ServiceExt;

fn test_app() -> Router {
    let config = Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        airtable: AirtableConfig {
            api_key: "test-key".to_string(),
            base_id: "appTestBase000001".to_string(),
            base_url: "http://127.0.0.1:9/v0".to_string(),
            timeout_secs: 2,
            tables: TableConfig::default(),
        },
    };
    create_app(AppState::new(config).unwrap())
}

async fn send(request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = test_app().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// ============================================================================
// Liveness
// ============================================================================

#[tokio::test]
async fn test_root_banner() {
    let (status, body) = send(get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Quote Builder API v1.0");
}

#[tokio::test]
async fn test_liveness() {
    let (status, body) = send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_api_health_reports_unreachable_store() {
    let (status, body) = send(get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);

    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["record_store"], "disconnected");
}

// ============================================================================
// Quotes
// ============================================================================

#[tokio::test]
async fn test_get_quote_rejects_bad_id() {
    let (status, body) = send(get("/api/v1/quotes/not-a-record")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(error["error"]["field"], "quote_id");
}

#[tokio::test]
async fn test_update_status_requires_status() {
    let request = json_request(
        "PUT",
        "/api/v1/quotes/recQUOTE000000001/status",
        json!({ "status": "" }),
    );
    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_rejects_invalid_quote_before_store() {
    let mut quote = Quote::new("Q-1");
    quote.customer.email = "nope".to_string();
    let request = json_request("POST", "/api/v1/quotes", serde_json::to_value(&quote).unwrap());

    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"]["message_en"], "Invalid email format");
}

#[tokio::test]
async fn test_recalculate_derives_every_option() {
    let mut quote = Quote::new("Q-2");
    quote.budget.package_quantity = 10;
    quote.budget.budget_per_package = Decimal::from(200);
    quote.options[0].items = vec![
        Item {
            id: "recPRODUCT0000001".to_string(),
            kind: ItemKind::Product,
            name: "Wine".to_string(),
            price: Decimal::from(60),
            ..Default::default()
        },
        Item {
            id: "recPACKAGING00001".to_string(),
            kind: ItemKind::Packaging,
            name: "Wooden box".to_string(),
            price: Decimal::from(15),
            ..Default::default()
        },
    ];
    let mut second = quote.options[0].duplicate();
    second.items.truncate(1);
    quote.options.push(second);

    let request = json_request(
        "POST",
        "/api/v1/quotes/recalculate",
        serde_json::to_value(&quote).unwrap(),
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);

    let result: Quote = serde_json::from_slice(&body).unwrap();
    assert_eq!(result.options.len(), 2);
    assert_eq!(result.options[0].derived.products_cost, Decimal::from(60));
    assert_eq!(result.options[0].derived.packaging_items_cost, Decimal::from(15));
    assert_eq!(result.options[1].derived.packaging_items_cost, Decimal::ZERO);
    assert_eq!(
        result.options[0].derived.effective_budget_per_package,
        Decimal::from(200)
    );
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_catalog_surfaces_store_failure() {
    let (status, body) = send(get("/api/v1/catalog/products")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"]["code"], "RECORD_STORE_ERROR");
}

#[tokio::test]
async fn test_catalog_packages_rejects_bad_id() {
    let (status, _) = send(get("/api/v1/catalog/catalogs/holidays/packages")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _) = send(get("/api/v1/quotes/recQUOTE000000001/history")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
