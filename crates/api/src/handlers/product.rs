//! Handlers for the `/products` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use retrohub_core::audit::{action_types, entity_types};
use retrohub_core::error::CoreError;
use retrohub_core::pricing::{validate_price, PriceQuote};
use retrohub_core::types::{Date, DbId};
use retrohub_db::models::discount::{DiscountWindow, DiscountWindowWithStatus};
use retrohub_db::models::product::{CreateProduct, Product};
use retrohub_db::repositories::ProductRepo;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::audit::{record_change, snapshot};
use crate::engine::discount::{ensure_owner, DiscountEngine};
use crate::error::{AppError, AppResult};
use crate::middleware::seller::SellerActor;
use crate::query::AsOfParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /products`. The owner is the calling seller.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ProductListParams {
    pub seller_id: Option<DbId>,
}

/// A product together with its price quote on `as_of`.
#[derive(Debug, Serialize)]
pub struct ProductPage {
    #[serde(flatten)]
    pub product: Product,
    pub as_of: Date,
    pub quote: PriceQuote,
}

/// The discount in effect for a product on `as_of`, if any.
#[derive(Debug, Serialize)]
pub struct ActiveDiscountResponse {
    pub product_id: DbId,
    pub as_of: Date,
    pub discount: Option<DiscountWindow>,
}

/// POST /api/v1/products
pub async fn create(
    State(state): State<AppState>,
    seller: SellerActor,
    Json(input): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    let price = validate_price(input.price)?;

    let product = ProductRepo::create(
        &state.pool,
        &CreateProduct {
            seller_id: seller.seller_id,
            name: name.to_string(),
            price,
        },
    )
    .await?;

    tracing::info!(
        product_id = product.id,
        seller_id = seller.seller_id,
        "Product created",
    );
    record_change(
        &state.pool,
        seller.seller_id,
        action_types::PRODUCT_CREATE,
        entity_types::PRODUCT,
        product.id,
        None,
        snapshot(&product),
    )
    .await;

    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/v1/products?seller_id=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> AppResult<Json<DataResponse<Vec<Product>>>> {
    let products = ProductRepo::list(&state.pool, params.seller_id).await?;
    Ok(Json(DataResponse { data: products }))
}

/// GET /api/v1/products/{id}?as_of=
///
/// The product page payload: listing fields plus the current quote.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<AsOfParams>,
) -> AppResult<Json<ProductPage>> {
    let as_of = params.resolve()?;
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id,
        }))?;
    let quote = DiscountEngine::from_state(&state)
        .quote_product(&product, as_of)
        .await?;
    Ok(Json(ProductPage {
        product,
        as_of,
        quote,
    }))
}

/// DELETE /api/v1/products/{id}
///
/// Removes the product and, by cascade, all of its discount windows.
pub async fn delete(
    State(state): State<AppState>,
    seller: SellerActor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Product",
            id,
        })
    };

    let owner = ProductRepo::owner_of(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;
    ensure_owner(seller.seller_id, id, owner)?;

    let product = ProductRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(product_id = id, seller_id = seller.seller_id, "Product deleted");
    record_change(
        &state.pool,
        seller.seller_id,
        action_types::PRODUCT_DELETE,
        entity_types::PRODUCT,
        id,
        snapshot(&product),
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/products/{id}/discounts?as_of=
pub async fn list_discounts(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<AsOfParams>,
) -> AppResult<Json<DataResponse<Vec<DiscountWindowWithStatus>>>> {
    let as_of = params.resolve()?;
    let windows = DiscountEngine::from_state(&state)
        .list_for_product(id, as_of)
        .await?;
    Ok(Json(DataResponse { data: windows }))
}

/// GET /api/v1/products/{id}/active-discount?as_of=
pub async fn active_discount(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<AsOfParams>,
) -> AppResult<Json<ActiveDiscountResponse>> {
    let as_of = params.resolve()?;
    let discount = DiscountEngine::from_state(&state)
        .active_discount(id, as_of)
        .await?;
    Ok(Json(ActiveDiscountResponse {
        product_id: id,
        as_of,
        discount,
    }))
}
