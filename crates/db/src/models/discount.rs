//! Discount window entity model and DTOs.

use retrohub_core::discount::{DateRange, DiscountStatus, DiscountTerms};
use retrohub_core::types::{Date, DbId, Timestamp};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A discount window row from the `discount_windows` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DiscountWindow {
    pub id: DbId,
    pub product_id: DbId,
    #[serde(with = "rust_decimal::serde::float")]
    pub percent: Decimal,
    pub start_date: Date,
    pub end_date: Date,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DiscountWindow {
    /// Derived status relative to `as_of`.
    pub fn status_on(&self, as_of: Date) -> DiscountStatus {
        self.range().status_on(as_of)
    }
}

impl DiscountTerms for DiscountWindow {
    fn window_id(&self) -> DbId {
        self.id
    }

    fn percent(&self) -> Decimal {
        self.percent
    }

    fn range(&self) -> DateRange {
        // Rows satisfy `end_date > start_date` via ck_discount_windows_dates.
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// A discount window together with its status on the evaluation date.
#[derive(Debug, Clone, Serialize)]
pub struct DiscountWindowWithStatus {
    #[serde(flatten)]
    pub window: DiscountWindow,
    pub status: DiscountStatus,
}

impl DiscountWindowWithStatus {
    pub fn new(window: DiscountWindow, as_of: Date) -> Self {
        let status = window.status_on(as_of);
        Self { window, status }
    }
}

/// Validated terms for inserting or updating a window.
///
/// Built only after percent and date validation, so repositories never see
/// unchecked input.
#[derive(Debug, Clone)]
pub struct DiscountTermsInput {
    pub percent: Decimal,
    pub range: DateRange,
}
