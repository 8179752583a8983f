//! # Invoice Module
//!
//! The one place where a transaction's payable amount is computed.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Invoice Total Pipeline                             │
//! │                                                                         │
//! │  lines ──► subtotal = Σ qty × unit_price                               │
//! │                │                                                        │
//! │                ▼                                                        │
//! │           base = subtotal + additional_fee                              │
//! │                │                                                        │
//! │                ▼                                                        │
//! │           discount = base × clamp(discount%, 0, 100) / 100             │
//! │                │                                                        │
//! │                ▼                                                        │
//! │           after_discount = max(0, base − discount)                     │
//! │                │                                                        │
//! │                ▼                                                        │
//! │           tax = after_discount × tax% / 100                            │
//! │                │                                                        │
//! │                ▼                                                        │
//! │           total = after_discount + tax                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The steps run in exactly this order. Nothing is rounded along the way;
//! rounding happens only when a value is formatted for display
//! (see [`crate::money::format_rupiah`]).
//!
//! ## Consumers
//! Transaction creation, transaction detail, dashboard, reports, CSV export,
//! outlet recap, top members and chat statistics all call [`calculate`].
//! None of them re-derive the arithmetic.
//!
//! ## Usage
//! ```rust
//! use laundry_core::invoice::{calculate, fixed_discount_to_percent, InvoiceLine};
//!
//! let lines = [InvoiceLine::new(1.0, 100_000.0)];
//!
//! // A fixed Rp 150.000 discount on a Rp 100.000 base caps at 100%
//! let percent = fixed_discount_to_percent(150_000.0, 100_000.0);
//! assert_eq!(percent, 100.0);
//!
//! let breakdown = calculate(&lines, 0.0, percent, 11.0);
//! assert_eq!(breakdown.total, 0.0);
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Inputs
// =============================================================================

/// One priced line of an invoice.
///
/// Quantities are real numbers since per-kilo packages are weighed
/// (2.5 kg is a normal line).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceLine {
    pub quantity: f64,
    pub unit_price: f64,
}

impl InvoiceLine {
    #[inline]
    pub const fn new(quantity: f64, unit_price: f64) -> Self {
        InvoiceLine {
            quantity,
            unit_price,
        }
    }

    /// Line contribution to the subtotal.
    #[inline]
    pub fn amount(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// How a discount was entered at the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Discount given as a percentage of the base amount.
    #[default]
    Percent,
    /// Discount given as a currency amount. Converted to a percentage
    /// once, when the transaction is created.
    Fixed,
}

// =============================================================================
// Breakdown
// =============================================================================

/// Every intermediate value of the pipeline, for display and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceBreakdown {
    pub subtotal: f64,
    pub additional_fee: f64,
    pub base_amount: f64,
    /// Discount percent actually applied (after clamping).
    pub discount_percent: f64,
    pub discount_value: f64,
    pub after_discount: f64,
    pub tax_percent: f64,
    pub tax_value: f64,
    pub total: f64,
}

// =============================================================================
// Calculation
// =============================================================================

/// Clamps a discount percentage into `[0, 100]`.
///
/// NaN clamps to 0.
#[inline]
pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

/// Sum of `quantity × unit_price` over all lines.
pub fn subtotal(lines: &[InvoiceLine]) -> f64 {
    lines.iter().map(InvoiceLine::amount).sum()
}

/// Computes the full invoice breakdown.
///
/// Pure and total over its numeric domain. The discount is clamped here
/// again even though callers store an already clamped value, so an out of
/// range input can never produce a negative amount.
///
/// Rejecting negative quantities or prices is the caller's job
/// (see [`crate::validation`]).
///
/// ## Example
/// ```rust
/// use laundry_core::invoice::{calculate, InvoiceLine};
///
/// let b = calculate(&[InvoiceLine::new(2.0, 15_000.0)], 5_000.0, 10.0, 11.0);
/// assert_eq!(b.base_amount, 35_000.0);
/// assert_eq!(b.discount_value, 3_500.0);
/// assert_eq!(b.after_discount, 31_500.0);
/// assert_eq!(b.tax_value, 3_465.0);
/// assert_eq!(b.total, 34_965.0);
/// ```
pub fn calculate(
    lines: &[InvoiceLine],
    additional_fee: f64,
    discount_percent: f64,
    tax_percent: f64,
) -> InvoiceBreakdown {
    let subtotal = subtotal(lines);
    let base_amount = subtotal + additional_fee;
    let discount_percent = clamp_percent(discount_percent);
    let discount_value = base_amount * (discount_percent / 100.0);
    let after_discount = (base_amount - discount_value).max(0.0);
    let tax_value = after_discount * (tax_percent / 100.0);
    let total = after_discount + tax_value;

    InvoiceBreakdown {
        subtotal,
        additional_fee,
        base_amount,
        discount_percent,
        discount_value,
        after_discount,
        tax_percent,
        tax_value,
        total,
    }
}

/// Converts a fixed currency discount into a percentage of `base_amount`.
///
/// Capped at 100. A zero (or negative) base yields 0.
pub fn fixed_discount_to_percent(fixed_amount: f64, base_amount: f64) -> f64 {
    if base_amount > 0.0 {
        (fixed_amount / base_amount * 100.0).min(100.0)
    } else {
        0.0
    }
}

/// Resolves the discount percent to persist for a new transaction.
///
/// Fixed discounts are converted against `subtotal + additional_fee`; the
/// result is always clamped.
pub fn resolve_discount_percent(
    discount_type: DiscountType,
    discount: f64,
    subtotal: f64,
    additional_fee: f64,
) -> f64 {
    let percent = match discount_type {
        DiscountType::Percent => discount,
        DiscountType::Fixed => fixed_discount_to_percent(discount, subtotal + additional_fee),
    };
    clamp_percent(percent)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_kiloan_invoice() {
        let lines = [InvoiceLine::new(2.0, 15_000.0)];
        let b = calculate(&lines, 5_000.0, 10.0, 11.0);

        assert_eq!(b.subtotal, 30_000.0);
        assert_eq!(b.base_amount, 35_000.0);
        assert!(approx_eq(b.discount_value, 3_500.0));
        assert!(approx_eq(b.after_discount, 31_500.0));
        assert!(approx_eq(b.tax_value, 3_465.0));
        assert!(approx_eq(b.total, 34_965.0));
    }

    #[test]
    fn test_empty_invoice_is_zero() {
        let b = calculate(&[], 0.0, 0.0, 11.0);
        assert_eq!(b.subtotal, 0.0);
        assert_eq!(b.total, 0.0);
    }

    #[test]
    fn test_discount_over_100_clamps() {
        let lines = [InvoiceLine::new(1.0, 100_000.0)];
        let b = calculate(&lines, 0.0, 120.0, 11.0);

        assert_eq!(b.discount_percent, 100.0);
        assert_eq!(b.after_discount, 0.0);
        assert_eq!(b.total, 0.0);
    }

    #[test]
    fn test_negative_discount_clamps_to_zero() {
        let lines = [InvoiceLine::new(1.0, 10_000.0)];
        let b = calculate(&lines, 0.0, -25.0, 0.0);

        assert_eq!(b.discount_percent, 0.0);
        assert_eq!(b.discount_value, 0.0);
        assert_eq!(b.total, 10_000.0);
    }

    #[test]
    fn test_nan_discount_treated_as_zero() {
        let lines = [InvoiceLine::new(1.0, 10_000.0)];
        let b = calculate(&lines, 0.0, f64::NAN, 0.0);
        assert_eq!(b.total, 10_000.0);
    }

    #[test]
    fn test_subtotal_is_sum_of_line_products() {
        let lines = [
            InvoiceLine::new(2.5, 7_000.0),
            InvoiceLine::new(1.0, 25_000.0),
            InvoiceLine::new(3.0, 4_000.0),
        ];
        let expected: f64 = lines.iter().map(|l| l.quantity * l.unit_price).sum();

        assert_eq!(subtotal(&lines), expected);
        assert!(approx_eq(subtotal(&lines), 54_500.0));
    }

    #[test]
    fn test_after_discount_never_negative() {
        let lines = [InvoiceLine::new(3.0, 12_000.0)];
        for percent in [-50.0, 0.0, 33.3, 99.9, 100.0, 150.0, 1e9] {
            let b = calculate(&lines, 2_000.0, percent, 11.0);
            assert!(b.after_discount >= 0.0, "percent {percent}");
            assert!(b.total >= 0.0, "percent {percent}");
        }
    }

    #[test]
    fn test_tax_applies_to_discounted_base() {
        let lines = [InvoiceLine::new(1.0, 100_000.0)];
        let b = calculate(&lines, 0.0, 20.0, 10.0);

        assert!(approx_eq(b.tax_value, 8_000.0));
        assert!(b.tax_value < b.base_amount * 0.10);
        assert!(approx_eq(b.total, 88_000.0));
    }

    #[test]
    fn test_additional_fee_is_taxed() {
        let b = calculate(&[], 10_000.0, 0.0, 11.0);
        assert!(approx_eq(b.tax_value, 1_100.0));
        assert!(approx_eq(b.total, 11_100.0));
    }

    #[test]
    fn test_calculation_is_bit_identical() {
        let lines = [
            InvoiceLine::new(1.3, 6_999.99),
            InvoiceLine::new(0.7, 13_333.33),
        ];
        let a = calculate(&lines, 1_234.56, 17.5, 11.0);
        let b = calculate(&lines, 1_234.56, 17.5, 11.0);

        assert_eq!(a.total.to_bits(), b.total.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_fixed_discount_caps_at_100() {
        assert_eq!(fixed_discount_to_percent(150_000.0, 100_000.0), 100.0);
        assert_eq!(fixed_discount_to_percent(25_000.0, 100_000.0), 25.0);
        assert_eq!(fixed_discount_to_percent(5_000.0, 0.0), 0.0);
    }

    #[test]
    fn test_resolve_discount_percent() {
        // Fixed discounts convert against subtotal + fee
        let p = resolve_discount_percent(DiscountType::Fixed, 10_000.0, 30_000.0, 10_000.0);
        assert_eq!(p, 25.0);

        let p = resolve_discount_percent(DiscountType::Percent, 140.0, 30_000.0, 0.0);
        assert_eq!(p, 100.0);

        let p = resolve_discount_percent(DiscountType::Fixed, 1.0, 0.0, 0.0);
        assert_eq!(p, 0.0);
    }

    #[test]
    fn test_discount_type_serde() {
        let t: DiscountType = serde_json::from_str("\"fixed\"").unwrap();
        assert_eq!(t, DiscountType::Fixed);
        assert_eq!(DiscountType::default(), DiscountType::Percent);
    }
}
