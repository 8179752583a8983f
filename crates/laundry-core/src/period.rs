//! # Report Periods
//!
//! Date arithmetic for report windows, per-day charts and recap buckets.
//!
//! ```text
//! period=7   ──► Monday 00:00 of the current week
//! period=30  ──► same instant one calendar month ago
//! period=90  ──► same instant three calendar months ago
//! period=N   ──► N days ago
//! ```
//!
//! All arithmetic is in UTC.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

use crate::error::ValidationError;

/// Default report window when the request does not specify one.
pub const DEFAULT_PERIOD_DAYS: u32 = 30;

/// Upper bound on a report window (ten years).
pub const MAX_PERIOD_DAYS: u32 = 3650;

/// Window length of the dashboard chart.
pub const DASHBOARD_CHART_DAYS: u32 = 90;

/// A validated report window length in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod(u32);

impl ReportPeriod {
    /// Parses the `period` query value. `None` means the default.
    pub fn parse(days: Option<i64>) -> Result<Self, ValidationError> {
        let days = days.unwrap_or(DEFAULT_PERIOD_DAYS as i64);
        if days < 1 || days > MAX_PERIOD_DAYS as i64 {
            return Err(ValidationError::OutOfRange {
                field: "period".to_string(),
                min: 1.0,
                max: MAX_PERIOD_DAYS as f64,
            });
        }
        Ok(ReportPeriod(days as u32))
    }

    #[inline]
    pub const fn days(&self) -> u32 {
        self.0
    }

    /// First instant included in the report.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.0 {
            7 => start_of_week(now),
            30 => now.checked_sub_months(Months::new(1)).unwrap_or(now),
            90 => now.checked_sub_months(Months::new(3)).unwrap_or(now),
            days => now - Duration::days(days as i64),
        }
    }
}

impl Default for ReportPeriod {
    fn default() -> Self {
        ReportPeriod(DEFAULT_PERIOD_DAYS)
    }
}

/// Monday 00:00 of the week containing `now`.
pub fn start_of_week(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_from_monday = now.weekday().num_days_from_monday() as i64;
    let monday = now.date_naive() - Duration::days(days_from_monday);
    start_of_day(monday)
}

/// 00:00 UTC of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// First day of the month containing `now`, at 00:00.
pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.date_naive();
    start_of_day(date - Duration::days(date.day0() as i64))
}

/// The last `days` calendar dates ending today, oldest first.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use laundry_core::period::chart_days;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 2, 15, 0, 0).unwrap();
/// let days = chart_days(3, now);
/// assert_eq!(days[0].to_string(), "2024-02-29");
/// assert_eq!(days[2].to_string(), "2024-03-02");
/// ```
pub fn chart_days(days: u32, now: DateTime<Utc>) -> Vec<NaiveDate> {
    let today = now.date_naive();
    (0..days as i64)
        .rev()
        .map(|offset| today - Duration::days(offset))
        .collect()
}

/// Recap bucket key for a day, `YYYY-MM-DD`.
pub fn day_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Recap bucket key for a month, `YYYY-MM`.
pub fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
