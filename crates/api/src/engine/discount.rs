//! Discount lifecycle and price quoting.
//!
//! Every write runs in one transaction: the owning product row is locked
//! (`FOR UPDATE`), the product's windows are read, the inclusive overlap rule
//! is checked, and the row is written. Concurrent writers for the same product
//! therefore serialize on the product lock, and the
//! `ex_discount_windows_no_overlap` exclusion constraint rejects anything that
//! still gets through.
//!
//! Audit entries are written after commit and never fail the mutation.

use std::collections::{HashMap, HashSet};

use retrohub_core::audit::{action_types, entity_types};
use retrohub_core::discount::{
    ensure_no_overlap, pick_active, summarize, upcoming_cutoff, validate_percent, DateRange,
    DiscountStats, DiscountStatus,
};
use retrohub_core::error::CoreError;
use retrohub_core::pricing::{validate_price, validate_quantity, CartLine, CartTotals, PriceQuote};
use retrohub_core::types::{Date, DbId};
use retrohub_db::models::discount::{DiscountTermsInput, DiscountWindow, DiscountWindowWithStatus};
use retrohub_db::models::product::Product;
use retrohub_db::repositories::discount_repo::OVERLAP_CONSTRAINT;
use retrohub_db::repositories::{DiscountRepo, ProductRepo};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::engine::audit::{record_change, snapshot};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// Unvalidated discount terms as submitted by a seller.
#[derive(Debug, Clone, Copy)]
pub struct DiscountDraft<'a> {
    pub percent: Decimal,
    pub start_date: &'a str,
    pub end_date: &'a str,
}

impl DiscountDraft<'_> {
    /// Validate percent, then date format, then date order.
    fn validate(&self) -> Result<DiscountTermsInput, CoreError> {
        let percent = validate_percent(self.percent)?;
        let range = DateRange::parse(self.start_date, self.end_date)?;
        Ok(DiscountTermsInput { percent, range })
    }
}

/// One requested cart line.
#[derive(Debug, Clone, Copy)]
pub struct CartItem {
    pub product_id: DbId,
    pub quantity: i32,
}

/// A priced cart: one line per requested item plus totals.
#[derive(Debug, Clone, Serialize)]
pub struct CartQuote {
    pub as_of: Date,
    pub lines: Vec<CartLine>,
    #[serde(flatten)]
    pub totals: CartTotals,
}

// ---------------------------------------------------------------------------
// DiscountEngine
// ---------------------------------------------------------------------------

/// Discount management and pricing over a connection pool.
pub struct DiscountEngine<'a> {
    pool: &'a PgPool,
    upcoming_days: i64,
}

impl<'a> DiscountEngine<'a> {
    pub fn new(pool: &'a PgPool, upcoming_days: i64) -> Self {
        Self {
            pool,
            upcoming_days,
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(&state.pool, state.config.upcoming_days)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a discount window for one of the actor's products.
    pub async fn create(
        &self,
        actor: DbId,
        product_id: DbId,
        draft: DiscountDraft<'_>,
    ) -> AppResult<DiscountWindow> {
        let mut tx = self.pool.begin().await?;

        let product = ProductRepo::find_by_id_for_update(&mut *tx, product_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Product",
                id: product_id,
            })?;
        ensure_owner(actor, product.id, product.seller_id)?;

        let input = draft.validate()?;
        let existing = DiscountRepo::list_for_product(&mut *tx, product_id).await?;
        ensure_no_overlap(product_id, &existing, &input.range, None)?;

        let window = DiscountRepo::insert(&mut *tx, product_id, &input)
            .await
            .map_err(|e| map_write_error(e, product_id))?;
        tx.commit().await?;

        tracing::info!(
            discount_id = window.id,
            product_id,
            seller_id = actor,
            percent = %window.percent,
            start_date = %window.start_date,
            end_date = %window.end_date,
            "Discount created",
        );

        record_change(
            self.pool,
            actor,
            action_types::DISCOUNT_CREATE,
            entity_types::DISCOUNT,
            window.id,
            None,
            snapshot(&window),
        )
        .await;

        Ok(window)
    }

    /// Replace the percent and dates of an existing window.
    ///
    /// The overlap check ignores the window being updated.
    pub async fn update(
        &self,
        actor: DbId,
        id: DbId,
        draft: DiscountDraft<'_>,
    ) -> AppResult<DiscountWindow> {
        let mut tx = self.pool.begin().await?;

        let (product, current) = lock_window(&mut *tx, id).await?;
        let product_id = product.id;
        ensure_owner(actor, product.id, product.seller_id)?;

        let input = draft.validate()?;
        let existing = DiscountRepo::list_for_product(&mut *tx, product_id).await?;
        ensure_no_overlap(product_id, &existing, &input.range, Some(id))?;

        let updated = DiscountRepo::update(&mut *tx, id, &input)
            .await
            .map_err(|e| map_write_error(e, product_id))?
            .ok_or(CoreError::NotFound {
                entity: "Discount",
                id,
            })?;
        tx.commit().await?;

        tracing::info!(
            discount_id = id,
            product_id,
            seller_id = actor,
            percent = %updated.percent,
            start_date = %updated.start_date,
            end_date = %updated.end_date,
            "Discount updated",
        );

        record_change(
            self.pool,
            actor,
            action_types::DISCOUNT_UPDATE,
            entity_types::DISCOUNT,
            id,
            snapshot(&current),
            snapshot(&updated),
        )
        .await;

        Ok(updated)
    }

    /// Delete a window. A second removal of the same id is `NotFound`.
    pub async fn remove(&self, actor: DbId, id: DbId) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let (product, _) = lock_window(&mut *tx, id).await?;
        ensure_owner(actor, product.id, product.seller_id)?;

        let removed = DiscountRepo::delete(&mut *tx, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Discount",
                id,
            })?;
        tx.commit().await?;

        tracing::info!(
            discount_id = id,
            product_id = removed.product_id,
            seller_id = actor,
            "Discount removed",
        );

        record_change(
            self.pool,
            actor,
            action_types::DISCOUNT_DELETE,
            entity_types::DISCOUNT,
            id,
            snapshot(&removed),
            None,
        )
        .await;

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub async fn get(&self, id: DbId) -> AppResult<DiscountWindow> {
        let window = DiscountRepo::find_by_id(self.pool, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Discount",
                id,
            })?;
        Ok(window)
    }

    /// The window of `product_id` in effect on `as_of`, if any.
    pub async fn active_discount(
        &self,
        product_id: DbId,
        as_of: Date,
    ) -> AppResult<Option<DiscountWindow>> {
        self.ensure_product_exists(product_id).await?;
        self.find_active(product_id, as_of).await
    }

    /// Apply the product's active discount on `as_of` to `original_price`.
    pub async fn apply_discount_to_price(
        &self,
        original_price: Decimal,
        product_id: DbId,
        as_of: Date,
    ) -> AppResult<PriceQuote> {
        let original_price = validate_price(original_price)?;
        let active = self.active_discount(product_id, as_of).await?;
        Ok(PriceQuote::apply(original_price, active.as_ref()))
    }

    /// Quote a product at its listed price.
    pub async fn quote_product(&self, product: &Product, as_of: Date) -> AppResult<PriceQuote> {
        let active = self.find_active(product.id, as_of).await?;
        Ok(PriceQuote::apply(product.price, active.as_ref()))
    }

    /// Every window of a product, latest start first, with derived status.
    pub async fn list_for_product(
        &self,
        product_id: DbId,
        as_of: Date,
    ) -> AppResult<Vec<DiscountWindowWithStatus>> {
        self.ensure_product_exists(product_id).await?;
        let windows = DiscountRepo::list_for_product(self.pool, product_id).await?;
        Ok(with_status(windows, as_of, None))
    }

    /// Windows in scope, optionally filtered by derived status.
    pub async fn list_for_seller(
        &self,
        seller_id: Option<DbId>,
        status: Option<DiscountStatus>,
        as_of: Date,
    ) -> AppResult<Vec<DiscountWindowWithStatus>> {
        let windows = DiscountRepo::list_for_seller(self.pool, seller_id).await?;
        Ok(with_status(windows, as_of, status))
    }

    /// Windows active on `as_of`, soonest to expire first.
    pub async fn list_active(
        &self,
        seller_id: Option<DbId>,
        as_of: Date,
    ) -> AppResult<Vec<DiscountWindow>> {
        Ok(DiscountRepo::list_active(self.pool, seller_id, as_of).await?)
    }

    /// Windows starting within `within_days` after `as_of`.
    ///
    /// `within_days` falls back to the configured look-ahead.
    pub async fn list_upcoming(
        &self,
        seller_id: Option<DbId>,
        within_days: Option<i64>,
        as_of: Date,
    ) -> AppResult<Vec<DiscountWindow>> {
        let cutoff = upcoming_cutoff(as_of, within_days.unwrap_or(self.upcoming_days))?;
        Ok(DiscountRepo::list_upcoming(self.pool, seller_id, as_of, cutoff).await?)
    }

    pub async fn stats(&self, seller_id: Option<DbId>, as_of: Date) -> AppResult<DiscountStats> {
        let windows = DiscountRepo::list_for_seller(self.pool, seller_id).await?;
        Ok(summarize(&windows, as_of))
    }

    // -----------------------------------------------------------------------
    // Cart pricing
    // -----------------------------------------------------------------------

    /// Price a cart at each product's listed price and active discount.
    ///
    /// An empty cart yields zero totals.
    pub async fn quote_cart(&self, items: &[CartItem], as_of: Date) -> AppResult<CartQuote> {
        for item in items {
            validate_quantity(item.quantity)?;
        }

        let ids: Vec<DbId> = items
            .iter()
            .map(|item| item.product_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let products: HashMap<DbId, Product> = ProductRepo::find_by_ids(self.pool, &ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        if let Some(missing) = items.iter().find(|item| !products.contains_key(&item.product_id)) {
            return Err(CoreError::NotFound {
                entity: "Product",
                id: missing.product_id,
            }
            .into());
        }

        let mut windows_by_product: HashMap<DbId, Vec<DiscountWindow>> = HashMap::new();
        for window in DiscountRepo::find_containing_for_products(self.pool, &ids, as_of).await? {
            windows_by_product
                .entry(window.product_id)
                .or_default()
                .push(window);
        }

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let Some(product) = products.get(&item.product_id) else {
                continue;
            };
            let active = windows_by_product
                .get(&item.product_id)
                .and_then(|windows| pick_active(windows, as_of));
            let unit = PriceQuote::apply(product.price, active);
            lines.push(CartLine::new(item.product_id, item.quantity, unit));
        }

        let totals = CartTotals::from_lines(&lines);
        tracing::debug!(
            lines = lines.len(),
            total = %totals.total,
            %as_of,
            "Cart quoted",
        );

        Ok(CartQuote {
            as_of,
            lines,
            totals,
        })
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn ensure_product_exists(&self, product_id: DbId) -> AppResult<()> {
        if ProductRepo::exists(self.pool, product_id).await? {
            Ok(())
        } else {
            Err(CoreError::NotFound {
                entity: "Product",
                id: product_id,
            }
            .into())
        }
    }

    async fn find_active(&self, product_id: DbId, as_of: Date) -> AppResult<Option<DiscountWindow>> {
        let candidates = DiscountRepo::find_containing(self.pool, product_id, as_of).await?;
        Ok(pick_active(&candidates, as_of).cloned())
    }
}

/// Lock the product that owns window `id`, then read the window under that
/// lock.
///
/// The first read only finds the product. A window never moves between
/// products, and every writer to a product's windows holds its row lock, so
/// the second read is current until commit.
async fn lock_window(
    conn: &mut PgConnection,
    id: DbId,
) -> AppResult<(Product, DiscountWindow)> {
    let not_found = || CoreError::NotFound {
        entity: "Discount",
        id,
    };

    let product_id = DiscountRepo::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(not_found)?
        .product_id;
    let product = ProductRepo::find_by_id_for_update(&mut *conn, product_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Product",
            id: product_id,
        })?;
    let current = DiscountRepo::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(not_found)?;

    Ok((product, current))
}

/// Reject actions on products the actor does not own.
pub fn ensure_owner(actor: DbId, product_id: DbId, owner: DbId) -> Result<(), CoreError> {
    if owner != actor {
        return Err(CoreError::Forbidden(format!(
            "Product {product_id} does not belong to seller {actor}"
        )));
    }
    Ok(())
}

/// Translate an exclusion-constraint violation into `OverlapConflict`.
fn map_write_error(err: sqlx::Error, product_id: DbId) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.constraint() == Some(OVERLAP_CONSTRAINT) {
            return CoreError::OverlapConflict {
                product_id,
                conflicting_id: None,
            }
            .into();
        }
    }
    AppError::Database(err)
}

fn with_status(
    windows: Vec<DiscountWindow>,
    as_of: Date,
    filter: Option<DiscountStatus>,
) -> Vec<DiscountWindowWithStatus> {
    windows
        .into_iter()
        .map(|w| DiscountWindowWithStatus::new(w, as_of))
        .filter(|w| filter.map_or(true, |status| w.status == status))
        .collect()
}
