//! Route definitions for storefront pricing.

use axum::routing::post;
use axum::Router;

use crate::handlers::pricing;
use crate::state::AppState;

/// Routes mounted at `/pricing`.
///
/// ```text
/// POST   /cart    -> quote_cart
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/cart", post(pricing::quote_cart))
}
