//! Route definitions for the `/products` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::product;
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// ```text
/// GET    /                        -> list (?seller_id=)
/// POST   /                        -> create (seller)
/// GET    /{id}                    -> get_by_id (product + quote, ?as_of=)
/// DELETE /{id}                    -> delete (seller, cascades discounts)
/// GET    /{id}/discounts          -> list_discounts (?as_of=)
/// GET    /{id}/active-discount    -> active_discount (?as_of=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(product::list).post(product::create))
        .route("/{id}", get(product::get_by_id).delete(product::delete))
        .route("/{id}/discounts", get(product::list_discounts))
        .route("/{id}/active-discount", get(product::active_discount))
}
