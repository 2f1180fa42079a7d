//! Shared harness for API integration tests.
//!
//! Requests go straight to the router through `tower::ServiceExt::oneshot`,
//! no TCP listener involved.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use retrohub_api::config::ServerConfig;
use retrohub_api::router::build_app_router;
use retrohub_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        db_max_connections: 5,
        upcoming_days: 30,
    }
}

/// Build the full application router, with the production middleware stack,
/// over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    seller_id: Option<i64>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(seller_id) = seller_id {
        builder = builder.header("x-seller-id", seller_id.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(json)).await
}

pub async fn post_json_as(
    app: Router,
    uri: &str,
    seller_id: i64,
    json: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(seller_id), Some(json)).await
}

pub async fn put_json_as(
    app: Router,
    uri: &str,
    seller_id: i64,
    json: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(seller_id), Some(json)).await
}

pub async fn delete_as(app: Router, uri: &str, seller_id: i64) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(seller_id), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a product owned by `seller_id` through the API and return its id.
pub async fn create_product(pool: &PgPool, seller_id: i64, name: &str, price: f64) -> i64 {
    let response = post_json_as(
        build_test_app(pool.clone()),
        "/api/v1/products",
        seller_id,
        serde_json::json!({"name": name, "price": price}),
    )
    .await;
    assert_eq!(response.status(), 201, "product fixture should be created");
    body_json(response).await["id"].as_i64().unwrap()
}

/// Create a discount window through the API and return the raw response.
pub async fn create_discount(
    pool: &PgPool,
    seller_id: i64,
    product_id: i64,
    percent: f64,
    start_date: &str,
    end_date: &str,
) -> Response<Body> {
    post_json_as(
        build_test_app(pool.clone()),
        "/api/v1/discounts",
        seller_id,
        serde_json::json!({
            "product_id": product_id,
            "percent": percent,
            "start_date": start_date,
            "end_date": end_date,
        }),
    )
    .await
}
