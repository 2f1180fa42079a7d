//! Product entity model and DTOs.

use retrohub_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A product row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub seller_id: DbId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new product. `seller_id` comes from the caller identity.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub seller_id: DbId,
    pub name: String,
    pub price: Decimal,
}
