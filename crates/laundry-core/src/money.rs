//! # Money Formatting
//!
//! Amounts are carried as `f64` Rupiah through the whole invoice pipeline
//! and rounded only here, when they are turned into text.
//!
//! ```text
//! calculate() ──► 34965.0 ──► format_rupiah() ──► "Rp 34.965"
//!                  (exact)                        (display only)
//! ```
//!
//! Rupiah has no minor unit in everyday use, so amounts are shown as whole
//! numbers with `.` as the thousands separator.

/// Rounds to whole Rupiah, half away from zero.
#[inline]
pub fn round_rupiah(amount: f64) -> i64 {
    amount.round() as i64
}

/// Formats an amount as Indonesian Rupiah.
///
/// ## Example
/// ```rust
/// use laundry_core::money::format_rupiah;
///
/// assert_eq!(format_rupiah(1_250_000.0), "Rp 1.250.000");
/// assert_eq!(format_rupiah(34_964.6), "Rp 34.965");
/// assert_eq!(format_rupiah(0.0), "Rp 0");
/// ```
pub fn format_rupiah(amount: f64) -> String {
    let rounded = round_rupiah(amount);
    let sign = if rounded < 0 { "-" } else { "" };
    format!("{sign}Rp {}", group_thousands(rounded.unsigned_abs()))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}
