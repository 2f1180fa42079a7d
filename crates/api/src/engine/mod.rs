//! Discount engine and the audit trail it writes.
//!
//! Handlers stay thin: they parse requests and delegate to
//! [`discount::DiscountEngine`], which owns transactions, ownership checks,
//! overlap enforcement and price quoting.

pub mod audit;
pub mod discount;
