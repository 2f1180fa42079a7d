//! Shared application router builder.
//!
//! [`build_app_router`] is shared by `main.rs` and the integration tests, so
//! both serve the storefront API behind the same middleware stack.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::middleware::seller::SELLER_ID_HEADER;
use crate::routes;
use crate::state::AppState;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the storefront API [`Router`] with all middleware layers.
///
/// Layers wrap bottom-up, so a request passes CORS first and the panic guard
/// last, right before the handler:
///
/// 1. CORS (browser storefront origins, `X-Seller-Id` allowed)
/// 2. Assign a request id
/// 3. Request/response tracing span carrying that id
/// 4. Echo the request id on the response
/// 5. Request timeout (`REQUEST_TIMEOUT_SECS`)
/// 6. Panic recovery (500 instead of a dropped connection)
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = build_cors_layer(config);
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        // Health check at root level (not under /api/v1).
        .merge(routes::health::router())
        // Discounts, products, pricing and audit under the versioned prefix.
        .nest("/api/v1", routes::api_routes())
        // -- Middleware stack (applied bottom-up) --
        // A panicking handler becomes a 500.
        .layer(CatchPanicLayer::new())
        // Slow quotes or lock waits past the limit answer 408.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Echo the request id back to the caller.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // One INFO span per request, closed with status and latency.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Mint a UUID request id unless the caller sent one.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        // CORS.
        .layer(cors)
        // Pool and config for every handler.
        .with_state(state)
}

/// Build the CORS middleware layer from server configuration.
///
/// Seller writes need `X-Seller-Id` on preflight, and browser clients may read
/// `x-request-id` off responses. Panics at startup if any configured origin is
/// invalid.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(SELLER_ID_HEADER)])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
