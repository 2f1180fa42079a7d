//! Repository for the `products` table.
//!
//! Also serves as the product lookup collaborator for discount management
//! (`exists`, `owner_of`).

use retrohub_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::product::{CreateProduct, Product};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, seller_id, name, price, created_at, updated_at";

/// Provides CRUD and lookup operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (seller_id, name, price)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(input.seller_id)
            .bind(&input.name)
            .bind(input.price)
            .fetch_one(pool)
            .await
    }

    /// Find a product by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a product and lock its row until the surrounding transaction ends.
    ///
    /// Discount writes lock the owning product first so that concurrent
    /// overlap checks for the same product run one at a time.
    pub async fn find_by_id_for_update<'e, E>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Product>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find every product whose id is in `ids`. Missing ids are skipped.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, Product>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List products, newest first, optionally restricted to one seller.
    pub async fn list(pool: &PgPool, seller_id: Option<DbId>) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products
             WHERE ($1::BIGINT IS NULL OR seller_id = $1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(seller_id)
            .fetch_all(pool)
            .await
    }

    /// Whether a product with the given id exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// The seller that owns a product, or `None` if the product does not exist.
    pub async fn owner_of(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT seller_id FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a product. Its discount windows cascade.
    ///
    /// Returns the removed row, or `None` if it did not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("DELETE FROM products WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
