pub mod audit;
pub mod discount;
pub mod health;
pub mod pricing;
pub mod product;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /discount-info                      product page discount lookup (GET)
///
/// /discounts                          list, create
/// /discounts/active                   active on as_of
/// /discounts/upcoming                 starting within N days
/// /discounts/stats                    status counts, average percent
/// /discounts/{id}                     get, update, delete
///
/// /products                           list, create
/// /products/{id}                      product page, delete
/// /products/{id}/discounts            all windows with status
/// /products/{id}/active-discount      window in effect on as_of
///
/// /pricing/cart                       cart and checkout quote (POST)
///
/// /audit-logs                         audit trail query
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/discount-info", get(handlers::pricing::discount_info))
        .nest("/discounts", discount::router())
        .nest("/products", product::router())
        .nest("/pricing", pricing::router())
        .nest("/audit-logs", audit::router())
}
