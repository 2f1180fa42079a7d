//! Discount window rules.
//!
//! A discount window grants a percentage reduction on one product for an
//! inclusive calendar-date range. This module owns the validation rules
//! (percent bounds, date parsing, `end > start`), the inclusive overlap rule,
//! the derived upcoming/active/expired classification, the tie-break used
//! when more than one window is active, and the seller-facing statistics.
//!
//! This module lives in `core` (zero internal deps) so the repository layer,
//! the HTTP layer and tests all share one definition of each rule.

use chrono::Days;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::{Date, DbId, Timestamp};

/// Wire and storage format for discount dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Percentages carry at most two decimal places (`NUMERIC(5,2)`).
pub const MAX_PERCENT_SCALE: u32 = 2;

/// Default look-ahead, in days, for upcoming-window listings.
pub const DEFAULT_UPCOMING_DAYS: i64 = 30;

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

/// Parse a `YYYY-MM-DD` calendar date.
///
/// Returns `CoreError::InvalidFormat` naming `field` for anything else,
/// including impossible dates such as `2026-02-30`.
pub fn parse_date(value: &str, field: &str) -> Result<Date, CoreError> {
    let trimmed = value.trim();
    if trimmed.len() != 10 {
        return Err(invalid_date(field, value));
    }
    Date::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| invalid_date(field, value))
}

fn invalid_date(field: &str, value: &str) -> CoreError {
    CoreError::InvalidFormat(format!(
        "{field} must be a valid date in YYYY-MM-DD format, got '{value}'"
    ))
}

/// Validate a discount percentage: `0 <= percent <= 100`, at most two
/// decimal places.
pub fn validate_percent(percent: Decimal) -> Result<Decimal, CoreError> {
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(CoreError::InvalidRange(format!(
            "percent must be between 0 and 100, got {percent}"
        )));
    }
    if percent.normalize().scale() > MAX_PERCENT_SCALE {
        return Err(CoreError::InvalidFormat(format!(
            "percent may have at most {MAX_PERCENT_SCALE} decimal places, got {percent}"
        )));
    }
    Ok(percent.normalize())
}

/// Compute the last start date included in an upcoming listing.
///
/// `within_days` must be non-negative.
pub fn upcoming_cutoff(as_of: Date, within_days: i64) -> Result<Date, CoreError> {
    let days = u64::try_from(within_days).map_err(|_| {
        CoreError::InvalidRange(format!(
            "within_days must not be negative, got {within_days}"
        ))
    })?;
    as_of.checked_add_days(Days::new(days)).ok_or_else(|| {
        CoreError::InvalidRange(format!("within_days is too large, got {within_days}"))
    })
}

// ---------------------------------------------------------------------------
// Date ranges
// ---------------------------------------------------------------------------

/// An inclusive `[start, end]` calendar range with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    /// Build a range, rejecting `end <= start` with `CoreError::InvalidRange`.
    pub fn new(start: Date, end: Date) -> Result<Self, CoreError> {
        if end <= start {
            return Err(CoreError::InvalidRange(format!(
                "end_date ({end}) must be after start_date ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both bounds from `YYYY-MM-DD` strings and validate the order.
    ///
    /// Format errors are reported before ordering errors.
    pub fn parse(start: &str, end: &str) -> Result<Self, CoreError> {
        let start = parse_date(start, "start_date")?;
        let end = parse_date(end, "end_date")?;
        Self::new(start, end)
    }

    /// Inclusive overlap: `[a,b]` and `[c,d]` overlap iff `a <= d && c <= b`.
    ///
    /// Two ranges that only share a boundary day still overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whether `day` falls inside the range, bounds included.
    pub fn contains(&self, day: Date) -> bool {
        self.start <= day && day <= self.end
    }

    /// Classify this range relative to `as_of`.
    pub fn status_on(&self, as_of: Date) -> DiscountStatus {
        if as_of < self.start {
            DiscountStatus::Upcoming
        } else if as_of > self.end {
            DiscountStatus::Expired
        } else {
            DiscountStatus::Active
        }
    }
}

// ---------------------------------------------------------------------------
// Derived status
// ---------------------------------------------------------------------------

/// Status of a window relative to an evaluation date. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountStatus {
    Upcoming,
    Active,
    Expired,
}

impl DiscountStatus {
    /// Parse a status filter value (`upcoming`, `active`, `expired`).
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Ok(Self::Upcoming),
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            other => Err(CoreError::InvalidFormat(format!(
                "status must be one of upcoming, active, expired; got '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Window selection
// ---------------------------------------------------------------------------

/// Read access to the fields the discount rules need.
///
/// Implemented by the persisted row type so the rules stay storage-agnostic.
pub trait DiscountTerms {
    fn window_id(&self) -> DbId;
    fn percent(&self) -> Decimal;
    fn range(&self) -> DateRange;
    fn created_at(&self) -> Timestamp;
}

/// Select the window active on `as_of`.
///
/// When several windows match (only possible for data that predates the
/// overlap constraint) the highest percent wins, then the most recently
/// created window, then the highest id.
pub fn pick_active<W: DiscountTerms>(windows: &[W], as_of: Date) -> Option<&W> {
    windows
        .iter()
        .filter(|w| w.range().contains(as_of))
        .max_by(|a, b| {
            a.percent()
                .cmp(&b.percent())
                .then_with(|| a.created_at().cmp(&b.created_at()))
                .then_with(|| a.window_id().cmp(&b.window_id()))
        })
}

/// Find the first window in `existing` that overlaps `candidate`.
///
/// `exclude_id` skips the window being updated.
pub fn find_overlap<'a, W: DiscountTerms>(
    existing: &'a [W],
    candidate: &DateRange,
    exclude_id: Option<DbId>,
) -> Option<&'a W> {
    existing
        .iter()
        .filter(|w| Some(w.window_id()) != exclude_id)
        .find(|w| w.range().overlaps(candidate))
}

/// Reject `candidate` if it overlaps any other window of the same product.
pub fn ensure_no_overlap<W: DiscountTerms>(
    product_id: DbId,
    existing: &[W],
    candidate: &DateRange,
    exclude_id: Option<DbId>,
) -> Result<(), CoreError> {
    match find_overlap(existing, candidate, exclude_id) {
        Some(conflict) => Err(CoreError::OverlapConflict {
            product_id,
            conflicting_id: Some(conflict.window_id()),
        }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Aggregate counts over a set of windows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountStats {
    pub total: i64,
    pub active: i64,
    pub upcoming: i64,
    pub expired: i64,
    /// Mean percent over every window in scope, not only active ones.
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_percent: Decimal,
}

/// Partition `windows` by status on `as_of` in a single pass.
pub fn summarize<W: DiscountTerms>(windows: &[W], as_of: Date) -> DiscountStats {
    let mut stats = DiscountStats {
        total: 0,
        active: 0,
        upcoming: 0,
        expired: 0,
        avg_percent: Decimal::ZERO,
    };
    let mut percent_sum = Decimal::ZERO;

    for window in windows {
        stats.total += 1;
        percent_sum += window.percent();
        match window.range().status_on(as_of) {
            DiscountStatus::Active => stats.active += 1,
            DiscountStatus::Upcoming => stats.upcoming += 1,
            DiscountStatus::Expired => stats.expired += 1,
        }
    }

    if stats.total > 0 {
        stats.avg_percent = (percent_sum / Decimal::from(stats.total))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
    }
    stats
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
