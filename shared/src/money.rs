//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are stored as `f64` on the models (that is what the backend
//! sends) and every calculation goes through `Decimal`, rounded to 2 decimal
//! places half-away-from-zero.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Rounding strategy for monetary values (2 decimal places)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Convert f64 to Decimal; non-finite values become zero
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::warn!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Round a Decimal to 2dp and convert back to f64
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round an f64 amount to 2dp
pub fn round_money(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Whether two amounts are equal within [`MONEY_TOLERANCE`]
pub fn money_eq(a: f64, b: f64) -> bool {
    to_decimal(a)
        .checked_sub(to_decimal(b))
        .is_some_and(|diff| diff.abs() < MONEY_TOLERANCE)
}

/// `a + b`, saturating at the `Decimal` range
pub fn add_money(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or_else(|| {
        tracing::warn!(%a, %b, "Monetary sum overflowed, saturating");
        if b.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

/// `a - b`, saturating at the `Decimal` range
pub fn sub_money(a: Decimal, b: Decimal) -> Decimal {
    add_money(a, -b)
}

/// `a * b`, saturating at the `Decimal` range
pub fn mul_money(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or_else(|| {
        tracing::warn!(%a, %b, "Monetary product overflowed, saturating");
        if a.is_sign_negative() != b.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

/// Tax formula: a proportional rate plus a fixed fee
///
/// The fixed fee only applies to non-empty orders.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxConfig {
    /// Proportional rate, e.g. `0.08` for 8%
    pub rate: f64,
    /// Flat amount added on top of the proportional part
    pub fixed_fee: f64,
}

impl TaxConfig {
    pub fn new(rate: f64, fixed_fee: f64) -> Self {
        Self { rate, fixed_fee }
    }

    /// Tax for a given subtotal, as Decimal
    pub fn tax_decimal(&self, subtotal: Decimal) -> Decimal {
        if subtotal <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let tax = add_money(
            mul_money(subtotal, to_decimal(self.rate)),
            to_decimal(self.fixed_fee),
        );
        tax.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn compute_tax(&self, subtotal: f64) -> f64 {
        to_f64(self.tax_decimal(to_decimal(subtotal)))
    }
}

/// Computed totals of an order
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// Line subtotal: unit price times quantity
pub fn line_subtotal(unit_price: f64, quantity: u32) -> Decimal {
    mul_money(to_decimal(unit_price), Decimal::from(quantity))
}

/// Compute subtotal, tax and total for `(unit_price, quantity)` lines
///
/// `total` is computed from the already-rounded subtotal and tax, so
/// `total == subtotal + tax` holds exactly at 2dp.
pub fn order_totals<I>(lines: I, tax: &TaxConfig) -> OrderTotals
where
    I: IntoIterator<Item = (f64, u32)>,
{
    let subtotal = lines
        .into_iter()
        .map(|(price, qty)| line_subtotal(price, qty))
        .fold(Decimal::ZERO, add_money);
    let subtotal = subtotal.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let tax_amount = tax.tax_decimal(subtotal);
    OrderTotals {
        subtotal: to_f64(subtotal),
        tax: to_f64(tax_amount),
        total: to_f64(add_money(subtotal, tax_amount)),
    }
}
