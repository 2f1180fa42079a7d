//! Repository for the `discount_windows` table.
//!
//! Validation and the overlap rule live in `retrohub_core::discount`; this
//! repository only reads and writes rows. The `ex_discount_windows_no_overlap`
//! exclusion constraint rejects overlapping rows that slip past the
//! application check.

use retrohub_core::types::{Date, DbId};
use sqlx::{PgExecutor, PgPool};

use crate::models::discount::{DiscountTermsInput, DiscountWindow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, product_id, percent, start_date, end_date, created_at, updated_at";

/// Column list qualified with the `d` alias, for queries joining `products`.
const QUALIFIED_COLUMNS: &str = "\
    d.id, d.product_id, d.percent, d.start_date, d.end_date, \
    d.created_at, d.updated_at";

/// Name of the exclusion constraint backing the overlap rule.
pub const OVERLAP_CONSTRAINT: &str = "ex_discount_windows_no_overlap";

/// Provides CRUD and date-scoped queries for discount windows.
pub struct DiscountRepo;

impl DiscountRepo {
    /// Insert a new window for `product_id`, returning the created row.
    pub async fn insert<'e, E>(
        executor: E,
        product_id: DbId,
        input: &DiscountTermsInput,
    ) -> Result<DiscountWindow, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO discount_windows (product_id, percent, start_date, end_date)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DiscountWindow>(&query)
            .bind(product_id)
            .bind(input.percent)
            .bind(input.range.start)
            .bind(input.range.end)
            .fetch_one(executor)
            .await
    }

    /// Replace the percent and dates of a window.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update<'e, E>(
        executor: E,
        id: DbId,
        input: &DiscountTermsInput,
    ) -> Result<Option<DiscountWindow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE discount_windows SET
                percent = $2,
                start_date = $3,
                end_date = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DiscountWindow>(&query)
            .bind(id)
            .bind(input.percent)
            .bind(input.range.start)
            .bind(input.range.end)
            .fetch_optional(executor)
            .await
    }

    /// Delete a window, returning the removed row if it existed.
    pub async fn delete<'e, E>(executor: E, id: DbId) -> Result<Option<DiscountWindow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("DELETE FROM discount_windows WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, DiscountWindow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a window by its internal ID.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<DiscountWindow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM discount_windows WHERE id = $1");
        sqlx::query_as::<_, DiscountWindow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List every window of a product, latest start first.
    pub async fn list_for_product<'e, E>(
        executor: E,
        product_id: DbId,
    ) -> Result<Vec<DiscountWindow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM discount_windows
             WHERE product_id = $1
             ORDER BY start_date DESC, id DESC"
        );
        sqlx::query_as::<_, DiscountWindow>(&query)
            .bind(product_id)
            .fetch_all(executor)
            .await
    }

    /// Windows of a product whose inclusive range contains `as_of`.
    ///
    /// Normally zero or one row; the caller applies the tie-break.
    pub async fn find_containing(
        pool: &PgPool,
        product_id: DbId,
        as_of: Date,
    ) -> Result<Vec<DiscountWindow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM discount_windows
             WHERE product_id = $1 AND start_date <= $2 AND end_date >= $2
             ORDER BY percent DESC, created_at DESC, id DESC"
        );
        sqlx::query_as::<_, DiscountWindow>(&query)
            .bind(product_id)
            .bind(as_of)
            .fetch_all(pool)
            .await
    }

    /// Active windows on `as_of` for the given products.
    pub async fn find_containing_for_products(
        pool: &PgPool,
        product_ids: &[DbId],
        as_of: Date,
    ) -> Result<Vec<DiscountWindow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM discount_windows
             WHERE product_id = ANY($1) AND start_date <= $2 AND end_date >= $2
             ORDER BY product_id, id"
        );
        sqlx::query_as::<_, DiscountWindow>(&query)
            .bind(product_ids)
            .bind(as_of)
            .fetch_all(pool)
            .await
    }

    /// Windows active on `as_of`, optionally restricted to one seller's
    /// products, soonest to expire first.
    pub async fn list_active(
        pool: &PgPool,
        seller_id: Option<DbId>,
        as_of: Date,
    ) -> Result<Vec<DiscountWindow>, sqlx::Error> {
        let query = format!(
            "SELECT {QUALIFIED_COLUMNS} FROM discount_windows d
             JOIN products p ON p.id = d.product_id
             WHERE ($1::BIGINT IS NULL OR p.seller_id = $1)
               AND d.start_date <= $2 AND d.end_date >= $2
             ORDER BY d.end_date ASC, d.id ASC"
        );
        sqlx::query_as::<_, DiscountWindow>(&query)
            .bind(seller_id)
            .bind(as_of)
            .fetch_all(pool)
            .await
    }

    /// Windows starting in `(as_of, cutoff]`, earliest start first.
    pub async fn list_upcoming(
        pool: &PgPool,
        seller_id: Option<DbId>,
        as_of: Date,
        cutoff: Date,
    ) -> Result<Vec<DiscountWindow>, sqlx::Error> {
        let query = format!(
            "SELECT {QUALIFIED_COLUMNS} FROM discount_windows d
             JOIN products p ON p.id = d.product_id
             WHERE ($1::BIGINT IS NULL OR p.seller_id = $1)
               AND d.start_date > $2 AND d.start_date <= $3
             ORDER BY d.start_date ASC, d.id ASC"
        );
        sqlx::query_as::<_, DiscountWindow>(&query)
            .bind(seller_id)
            .bind(as_of)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// Every window in scope (all, or one seller's), latest start first.
    pub async fn list_for_seller(
        pool: &PgPool,
        seller_id: Option<DbId>,
    ) -> Result<Vec<DiscountWindow>, sqlx::Error> {
        let query = format!(
            "SELECT {QUALIFIED_COLUMNS} FROM discount_windows d
             JOIN products p ON p.id = d.product_id
             WHERE ($1::BIGINT IS NULL OR p.seller_id = $1)
             ORDER BY d.start_date DESC, d.id DESC"
        );
        sqlx::query_as::<_, DiscountWindow>(&query)
            .bind(seller_id)
            .fetch_all(pool)
            .await
    }
}
