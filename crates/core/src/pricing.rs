//! Price calculation for discounted products, carts and checkout.
//!
//! Rounding is half-up (midpoint away from zero) to two decimal places. The
//! discount amount is rounded once and then subtracted, so
//! `amount_off + final_price == original_price` holds exactly.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::discount::DiscountTerms;
use crate::error::CoreError;
use crate::types::{Date, DbId};

/// Currency amounts carry two decimal places.
pub const CURRENCY_SCALE: u32 = 2;

/// Round a currency amount half-up to two decimal places.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Largest price a product can carry (`NUMERIC(10,2)`).
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Validate and normalise a price: must lie in `0..=MAX_PRICE` once rounded
/// to cents.
pub fn validate_price(price: Decimal) -> Result<Decimal, CoreError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(CoreError::InvalidRange(format!(
            "price must not be negative, got {price}"
        )));
    }
    let price = round_currency(price);
    if price > MAX_PRICE {
        return Err(CoreError::InvalidRange(format!(
            "price must not exceed {MAX_PRICE}, got {price}"
        )));
    }
    Ok(price)
}

/// Validate a cart line quantity (at least one unit).
pub fn validate_quantity(quantity: i32) -> Result<i32, CoreError> {
    if quantity < 1 {
        return Err(CoreError::InvalidRange(format!(
            "quantity must be at least 1, got {quantity}"
        )));
    }
    Ok(quantity)
}

/// The result of applying the active discount (if any) to a price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    #[serde(with = "rust_decimal::serde::float")]
    pub original_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_off: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub final_price: Decimal,
    pub has_discount: bool,
    pub discount_id: Option<DbId>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

impl PriceQuote {
    /// A quote with no discount applied.
    pub fn undiscounted(original_price: Decimal) -> Self {
        let original_price = round_currency(original_price);
        Self {
            original_price,
            percent: Decimal::ZERO,
            amount_off: Decimal::ZERO,
            final_price: original_price,
            has_discount: false,
            discount_id: None,
            start_date: None,
            end_date: None,
        }
    }

    /// Apply `window` (the active discount, if any) to `original_price`.
    pub fn apply<W: DiscountTerms>(original_price: Decimal, window: Option<&W>) -> Self {
        let Some(window) = window else {
            return Self::undiscounted(original_price);
        };

        let original_price = round_currency(original_price);
        let percent = window.percent();
        let amount_off = round_currency(original_price * percent / Decimal::ONE_HUNDRED);
        let final_price = round_currency(original_price - amount_off);
        let range = window.range();

        Self {
            original_price,
            percent,
            amount_off,
            final_price,
            has_discount: true,
            discount_id: Some(window.window_id()),
            start_date: Some(range.start),
            end_date: Some(range.end),
        }
    }
}

// ---------------------------------------------------------------------------
// Cart pricing
// ---------------------------------------------------------------------------

/// One priced cart line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub product_id: DbId,
    pub quantity: i32,
    pub unit: PriceQuote,
    #[serde(with = "rust_decimal::serde::float")]
    pub line_total: Decimal,
}

impl CartLine {
    pub fn new(product_id: DbId, quantity: i32, unit: PriceQuote) -> Self {
        let line_total = round_currency(unit.final_price * Decimal::from(quantity));
        Self {
            product_id,
            quantity,
            unit,
            line_total,
        }
    }
}

/// Totals for a priced cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartTotals {
    /// Sum of undiscounted line amounts.
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl CartTotals {
    pub fn from_lines(lines: &[CartLine]) -> Self {
        let (subtotal, total) = lines.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(subtotal, total), line| {
                let quantity = Decimal::from(line.quantity);
                (
                    subtotal + line.unit.original_price * quantity,
                    total + line.line_total,
                )
            },
        );
        Self {
            subtotal,
            discount_total: subtotal - total,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discount::DateRange;
    use crate::types::Timestamp;
    use assert_matches::assert_matches;
    use std::str::FromStr;

    struct Offer {
        percent: Decimal,
    }

    impl DiscountTerms for Offer {
        fn window_id(&self) -> DbId {
            42
        }
        fn percent(&self) -> Decimal {
            self.percent
        }
        fn range(&self) -> DateRange {
            DateRange::parse("2026-02-10", "2026-02-28").unwrap()
        }
        fn created_at(&self) -> Timestamp {
            Timestamp::default()
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn offer(percent: &str) -> Offer {
        Offer {
            percent: dec(percent),
        }
    }

    #[test]
    fn no_discount_keeps_price() {
        let quote = PriceQuote::apply::<Offer>(dec("100.00"), None);
        assert!(!quote.has_discount);
        assert_eq!(quote.final_price, dec("100.00"));
        assert_eq!(quote.amount_off, Decimal::ZERO);
        assert_eq!(quote.percent, Decimal::ZERO);
        assert_eq!(quote.discount_id, None);
    }

    #[test]
    fn fractional_percent_rounds_to_cents() {
        let quote = PriceQuote::apply(dec("20.00"), Some(&offer("15.5")));
        assert!(quote.has_discount);
        assert_eq!(quote.amount_off, dec("3.10"));
        assert_eq!(quote.final_price, dec("16.90"));
        assert_eq!(quote.discount_id, Some(42));
        assert_eq!(quote.start_date.unwrap().to_string(), "2026-02-10");
        assert_eq!(quote.end_date.unwrap().to_string(), "2026-02-28");
    }

    #[test]
    fn midpoint_rounds_up() {
        // 0.10 * 25% = 0.025 -> 0.03
        let quote = PriceQuote::apply(dec("0.10"), Some(&offer("25")));
        assert_eq!(quote.amount_off, dec("0.03"));
        assert_eq!(quote.final_price, dec("0.07"));
    }

    #[test]
    fn full_discount_is_free() {
        let quote = PriceQuote::apply(dec("59.99"), Some(&offer("100")));
        assert_eq!(quote.amount_off, dec("59.99"));
        assert_eq!(quote.final_price, Decimal::ZERO);
    }

    #[test]
    fn zero_percent_window_still_counts_as_discount() {
        let quote = PriceQuote::apply(dec("12.34"), Some(&offer("0")));
        assert!(quote.has_discount);
        assert_eq!(quote.final_price, dec("12.34"));
    }

    #[test]
    fn parts_always_sum_to_original() {
        let prices = ["0.00", "0.01", "0.99", "1.05", "19.99", "20.00", "333.33", "1234.56"];
        let percents = ["0", "0.01", "12.5", "15.5", "33.33", "50", "66.67", "99.99", "100"];
        for price in prices {
            for percent in percents {
                let quote = PriceQuote::apply(dec(price), Some(&offer(percent)));
                assert_eq!(
                    quote.amount_off + quote.final_price,
                    quote.original_price,
                    "price {price} at {percent}%"
                );
            }
        }
    }

    #[test]
    fn sub_cent_price_is_normalised_before_discount() {
        let quote = PriceQuote::apply(dec("10.005"), Some(&offer("10")));
        assert_eq!(quote.original_price, dec("10.01"));
        assert_eq!(quote.amount_off + quote.final_price, quote.original_price);
    }

    #[test]
    fn negative_price_is_invalid_range() {
        assert_matches!(validate_price(dec("-1")), Err(CoreError::InvalidRange(_)));
        assert_eq!(validate_price(dec("4.999")).unwrap(), dec("5.00"));
    }

    #[test]
    fn price_above_column_ceiling_is_invalid_range() {
        assert_eq!(validate_price(dec("99999999.99")).unwrap(), MAX_PRICE);
        assert_eq!(validate_price(dec("99999999.994")).unwrap(), MAX_PRICE);
        assert_matches!(
            validate_price(dec("99999999.995")),
            Err(CoreError::InvalidRange(_))
        );
        assert_matches!(
            validate_price(dec("1000000000")),
            Err(CoreError::InvalidRange(_))
        );
        assert_matches!(
            validate_price(dec("70000000000000000000000000000")),
            Err(CoreError::InvalidRange(_))
        );
    }

    #[test]
    fn largest_price_quotes_without_overflow() {
        let price = validate_price(MAX_PRICE).unwrap();
        let quote = PriceQuote::apply(price, Some(&offer("99.99")));
        assert_eq!(quote.amount_off + quote.final_price, MAX_PRICE);

        let line = CartLine::new(1, i32::MAX, quote);
        assert!(line.line_total > Decimal::ZERO);
    }

    #[test]
    fn zero_quantity_is_invalid_range() {
        assert_matches!(validate_quantity(0), Err(CoreError::InvalidRange(_)));
        assert_eq!(validate_quantity(3).unwrap(), 3);
    }

    #[test]
    fn cart_totals_sum_lines() {
        let lines = vec![
            CartLine::new(1, 2, PriceQuote::apply(dec("20.00"), Some(&offer("15.5")))),
            CartLine::new(2, 1, PriceQuote::undiscounted(dec("5.00"))),
        ];
        assert_eq!(lines[0].line_total, dec("33.80"));

        let totals = CartTotals::from_lines(&lines);
        assert_eq!(totals.subtotal, dec("45.00"));
        assert_eq!(totals.total, dec("38.80"));
        assert_eq!(totals.discount_total, dec("6.20"));
    }
}
