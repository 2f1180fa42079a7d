//! Handlers for storefront price lookups: the product page discount-info
//! endpoint and cart/checkout quoting.

use std::str::FromStr;

use axum::extract::{Query, State};
use axum::Json;
use retrohub_core::error::CoreError;
use retrohub_core::pricing::PriceQuote;
use retrohub_core::types::{Date, DbId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::discount::{CartItem, CartQuote, DiscountEngine};
use crate::error::AppResult;
use crate::query::resolve_as_of;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Discount info
// ---------------------------------------------------------------------------

/// Query parameters for `GET /discount-info`.
///
/// Accepts the storefront's camelCase names as well as snake_case.
#[derive(Debug, Deserialize)]
pub struct DiscountInfoParams {
    #[serde(rename = "productId", alias = "product_id")]
    pub product_id: DbId,
    pub price: String,
    #[serde(rename = "asOf", alias = "as_of")]
    pub as_of: Option<String>,
}

/// Response for `GET /discount-info`.
#[derive(Debug, Serialize)]
pub struct DiscountInfoResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub original_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discounted_price: Decimal,
    pub has_discount: bool,
    pub discount_id: Option<DbId>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

impl From<PriceQuote> for DiscountInfoResponse {
    fn from(quote: PriceQuote) -> Self {
        Self {
            original_price: quote.original_price,
            discount_percent: quote.percent,
            discount_amount: quote.amount_off,
            discounted_price: quote.final_price,
            has_discount: quote.has_discount,
            discount_id: quote.discount_id,
            start_date: quote.start_date,
            end_date: quote.end_date,
        }
    }
}

/// GET /api/v1/discount-info?productId=&price=&asOf=
pub async fn discount_info(
    State(state): State<AppState>,
    Query(params): Query<DiscountInfoParams>,
) -> AppResult<Json<DiscountInfoResponse>> {
    let price = Decimal::from_str(params.price.trim()).map_err(|_| {
        CoreError::InvalidFormat(format!("price must be a number, got '{}'", params.price))
    })?;
    let as_of = resolve_as_of(params.as_of.as_deref())?;

    let quote = DiscountEngine::from_state(&state)
        .apply_discount_to_price(price, params.product_id, as_of)
        .await?;
    Ok(Json(quote.into()))
}

// ---------------------------------------------------------------------------
// Cart quote
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    pub product_id: DbId,
    pub quantity: i32,
}

/// Request body for `POST /pricing/cart`.
#[derive(Debug, Deserialize)]
pub struct CartRequest {
    pub items: Vec<CartItemRequest>,
    pub as_of: Option<String>,
}

/// POST /api/v1/pricing/cart
pub async fn quote_cart(
    State(state): State<AppState>,
    Json(input): Json<CartRequest>,
) -> AppResult<Json<DataResponse<CartQuote>>> {
    let as_of = resolve_as_of(input.as_of.as_deref())?;
    let items: Vec<CartItem> = input
        .items
        .iter()
        .map(|item| CartItem {
            product_id: item.product_id,
            quantity: item.quantity,
        })
        .collect();

    let quote = DiscountEngine::from_state(&state)
        .quote_cart(&items, as_of)
        .await?;
    Ok(Json(DataResponse { data: quote }))
}
