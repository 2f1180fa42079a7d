//! Route definitions for the `/discounts` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::discount;
use crate::state::AppState;

/// Routes mounted at `/discounts`.
///
/// ```text
/// GET    /            -> list (?seller_id=&status=&as_of=)
/// POST   /            -> create (seller)
/// GET    /active      -> list_active (?seller_id=&as_of=)
/// GET    /upcoming    -> list_upcoming (?seller_id=&within_days=&as_of=)
/// GET    /stats       -> stats (?seller_id=&as_of=)
/// GET    /{id}        -> get_by_id
/// PUT    /{id}        -> update (seller)
/// DELETE /{id}        -> delete (seller)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(discount::list).post(discount::create))
        .route("/active", get(discount::list_active))
        .route("/upcoming", get(discount::list_upcoming))
        .route("/stats", get(discount::stats))
        .route(
            "/{id}",
            get(discount::get_by_id)
                .put(discount::update)
                .delete(discount::delete),
        )
}
