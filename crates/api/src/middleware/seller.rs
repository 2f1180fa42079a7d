//! Seller identity extractor for Axum handlers.
//!
//! Session handling is owned by the storefront; it forwards the signed-in
//! seller's id in the `X-Seller-Id` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use retrohub_core::error::CoreError;
use retrohub_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the acting seller's id.
pub const SELLER_ID_HEADER: &str = "x-seller-id";

/// The seller performing a mutation, extracted from the `X-Seller-Id` header.
///
/// Use this as an extractor parameter in any handler that changes seller-owned data:
///
/// ```ignore
/// async fn my_handler(seller: SellerActor) -> AppResult<Json<()>> {
///     tracing::info!(seller_id = seller.seller_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SellerActor {
    pub seller_id: DbId,
}

impl FromRequestParts<AppState> for SellerActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SELLER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Missing X-Seller-Id header".into()))
            })?;

        let seller_id = raw.trim().parse::<DbId>().map_err(|_| {
            AppError::Core(CoreError::Unauthorized(format!(
                "Invalid X-Seller-Id header: '{raw}'"
            )))
        })?;

        Ok(SellerActor { seller_id })
    }
}
