//! Handlers for the `/discounts` resource.
//!
//! Mutations require the `X-Seller-Id` header and are limited to the seller's
//! own products. Listings are public.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use retrohub_core::discount::{DiscountStats, DiscountStatus};
use retrohub_core::types::DbId;
use retrohub_db::models::discount::{DiscountWindow, DiscountWindowWithStatus};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::engine::discount::{DiscountDraft, DiscountEngine};
use crate::error::AppResult;
use crate::middleware::seller::SellerActor;
use crate::query::{resolve_as_of, AsOfParams, SellerScopeParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / query parameter types
// ---------------------------------------------------------------------------

/// Request body for `POST /discounts`.
#[derive(Debug, Deserialize)]
pub struct CreateDiscountRequest {
    pub product_id: DbId,
    pub percent: Decimal,
    pub start_date: String,
    pub end_date: String,
}

/// Request body for `PUT /discounts/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateDiscountRequest {
    pub percent: Decimal,
    pub start_date: String,
    pub end_date: String,
}

/// Query parameters for `GET /discounts`.
#[derive(Debug, Deserialize)]
pub struct ListDiscountsParams {
    pub seller_id: Option<DbId>,
    pub status: Option<String>,
    pub as_of: Option<String>,
}

/// Query parameters for `GET /discounts/upcoming`.
#[derive(Debug, Deserialize)]
pub struct UpcomingParams {
    pub seller_id: Option<DbId>,
    pub within_days: Option<i64>,
    pub as_of: Option<String>,
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/discounts
pub async fn create(
    State(state): State<AppState>,
    seller: SellerActor,
    Json(input): Json<CreateDiscountRequest>,
) -> AppResult<(StatusCode, Json<DiscountWindow>)> {
    let draft = DiscountDraft {
        percent: input.percent,
        start_date: &input.start_date,
        end_date: &input.end_date,
    };
    let window = DiscountEngine::from_state(&state)
        .create(seller.seller_id, input.product_id, draft)
        .await?;
    Ok((StatusCode::CREATED, Json(window)))
}

/// PUT /api/v1/discounts/{id}
pub async fn update(
    State(state): State<AppState>,
    seller: SellerActor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDiscountRequest>,
) -> AppResult<Json<DiscountWindow>> {
    let draft = DiscountDraft {
        percent: input.percent,
        start_date: &input.start_date,
        end_date: &input.end_date,
    };
    let window = DiscountEngine::from_state(&state)
        .update(seller.seller_id, id, draft)
        .await?;
    Ok(Json(window))
}

/// DELETE /api/v1/discounts/{id}
pub async fn delete(
    State(state): State<AppState>,
    seller: SellerActor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    DiscountEngine::from_state(&state)
        .remove(seller.seller_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/v1/discounts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<AsOfParams>,
) -> AppResult<Json<DiscountWindowWithStatus>> {
    let as_of = params.resolve()?;
    let window = DiscountEngine::from_state(&state).get(id).await?;
    Ok(Json(DiscountWindowWithStatus::new(window, as_of)))
}

/// GET /api/v1/discounts?seller_id=&status=&as_of=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListDiscountsParams>,
) -> AppResult<Json<DataResponse<Vec<DiscountWindowWithStatus>>>> {
    let as_of = resolve_as_of(params.as_of.as_deref())?;
    let status = params
        .status
        .as_deref()
        .map(DiscountStatus::parse)
        .transpose()?;
    let windows = DiscountEngine::from_state(&state)
        .list_for_seller(params.seller_id, status, as_of)
        .await?;
    Ok(Json(DataResponse { data: windows }))
}

/// GET /api/v1/discounts/active?seller_id=&as_of=
pub async fn list_active(
    State(state): State<AppState>,
    Query(params): Query<SellerScopeParams>,
) -> AppResult<Json<DataResponse<Vec<DiscountWindow>>>> {
    let as_of = params.resolve()?;
    let windows = DiscountEngine::from_state(&state)
        .list_active(params.seller_id, as_of)
        .await?;
    Ok(Json(DataResponse { data: windows }))
}

/// GET /api/v1/discounts/upcoming?seller_id=&within_days=&as_of=
pub async fn list_upcoming(
    State(state): State<AppState>,
    Query(params): Query<UpcomingParams>,
) -> AppResult<Json<DataResponse<Vec<DiscountWindow>>>> {
    let as_of = resolve_as_of(params.as_of.as_deref())?;
    let windows = DiscountEngine::from_state(&state)
        .list_upcoming(params.seller_id, params.within_days, as_of)
        .await?;
    Ok(Json(DataResponse { data: windows }))
}

/// GET /api/v1/discounts/stats?seller_id=&as_of=
pub async fn stats(
    State(state): State<AppState>,
    Query(params): Query<SellerScopeParams>,
) -> AppResult<Json<DataResponse<DiscountStats>>> {
    let as_of = params.resolve()?;
    let stats = DiscountEngine::from_state(&state)
        .stats(params.seller_id, as_of)
        .await?;
    Ok(Json(DataResponse { data: stats }))
}
