//! Shared query parameter types for API handlers.
//!
//! Common query structs that appear across multiple handler modules are
//! extracted here to avoid duplication.

use retrohub_core::discount::parse_date;
use retrohub_core::error::CoreError;
use retrohub_core::types::{Date, DbId};
use serde::Deserialize;

/// Today's date in UTC, the default evaluation date for discount status.
pub fn today() -> Date {
    chrono::Utc::now().date_naive()
}

/// Parse an optional `as_of` parameter, defaulting to today.
pub fn resolve_as_of(as_of: Option<&str>) -> Result<Date, CoreError> {
    match as_of {
        Some(value) => parse_date(value, "as_of"),
        None => Ok(today()),
    }
}

/// Evaluation date parameter (`?as_of=YYYY-MM-DD`).
#[derive(Debug, Default, Deserialize)]
pub struct AsOfParams {
    pub as_of: Option<String>,
}

impl AsOfParams {
    pub fn resolve(&self) -> Result<Date, CoreError> {
        resolve_as_of(self.as_of.as_deref())
    }
}

/// Optional seller scope plus evaluation date (`?seller_id=&as_of=`).
///
/// Used by the active-listing and stats endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SellerScopeParams {
    pub seller_id: Option<DbId>,
    pub as_of: Option<String>,
}

impl SellerScopeParams {
    pub fn resolve(&self) -> Result<Date, CoreError> {
        resolve_as_of(self.as_of.as_deref())
    }
}
