//! # Report Aggregation
//!
//! Pure aggregation over loaded transactions. Every amount comes from
//! [`TransactionDetail::total`], which is the invoice calculator's output,
//! so reports always agree with what was charged at the counter.
//!
//! ```text
//! laundry-db ──► Vec<TransactionDetail> ──► build_report()     ──► /api/reports
//!                                       ├─► build_dashboard()  ──► /api/dashboard
//!                                       ├─► build_recap()      ──► /api/recap
//!                                       └─► rank_members()     ──► /api/members/top
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::period::{self, ReportPeriod};
use crate::types::TransactionDetail;

/// Number of recent transactions included in a period report.
pub const RECENT_TRANSACTIONS_LIMIT: usize = 50;

// =============================================================================
// Shared Pieces
// =============================================================================

/// Count, revenue and average over a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RevenueSummary {
    pub transaction_count: usize,
    pub total_revenue: f64,
    /// 0 when there are no transactions.
    pub average_transaction: f64,
}

pub fn summarize<'a, I>(details: I) -> RevenueSummary
where
    I: IntoIterator<Item = &'a TransactionDetail>,
{
    let (count, revenue) = details
        .into_iter()
        .fold((0usize, 0.0f64), |(n, sum), d| (n + 1, sum + d.total));

    RevenueSummary {
        transaction_count: count,
        total_revenue: revenue,
        average_transaction: if count > 0 { revenue / count as f64 } else { 0.0 },
    }
}

/// One point of a per-day chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyPoint {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub transactions: usize,
    pub revenue: f64,
}

/// Per-day transaction counts for the last `days` days, oldest first.
/// Days without transactions are present with zero.
pub fn daily_chart(details: &[TransactionDetail], days: u32, now: DateTime<Utc>) -> Vec<DailyPoint> {
    let mut buckets: BTreeMap<NaiveDate, (usize, f64)> = period::chart_days(days, now)
        .into_iter()
        .map(|day| (day, (0, 0.0)))
        .collect();

    for detail in details {
        let day = detail.transaction.created_at.date_naive();
        if let Some((count, revenue)) = buckets.get_mut(&day) {
            *count += 1;
            *revenue += detail.total;
        }
    }

    buckets
        .into_iter()
        .map(|(date, (transactions, revenue))| DailyPoint {
            date,
            transactions,
            revenue,
        })
        .collect()
}

// =============================================================================
// Period Report
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PeriodReport {
    pub period_days: u32,
    #[ts(as = "String")]
    pub start: DateTime<Utc>,
    pub total_transactions: usize,
    pub total_revenue: f64,
    pub total_members: i64,
    pub average_transaction: f64,
    pub recent_transactions: Vec<TransactionDetail>,
    pub chart: Vec<DailyPoint>,
}

/// Builds the period report from transactions created since the period
/// start, ordered newest first.
pub fn build_report(
    details: Vec<TransactionDetail>,
    total_members: i64,
    period: ReportPeriod,
    now: DateTime<Utc>,
) -> PeriodReport {
    let summary = summarize(&details);
    let chart = daily_chart(&details, period.days(), now);
    let recent_transactions = details
        .into_iter()
        .take(RECENT_TRANSACTIONS_LIMIT)
        .collect();

    PeriodReport {
        period_days: period.days(),
        start: period.start(now),
        total_transactions: summary.transaction_count,
        total_revenue: summary.total_revenue,
        total_members,
        average_transaction: summary.average_transaction,
        recent_transactions,
        chart,
    }
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dashboard {
    pub total_transactions: usize,
    pub total_revenue: f64,
    pub average_income: f64,
    /// Sum of line item quantities.
    pub packages_sold: f64,
    /// Distinct members with at least one transaction.
    pub total_customers: usize,
    pub today_transactions: usize,
    pub month_transactions: usize,
    pub total_members: i64,
    /// Transactions that are new or in progress.
    pub pending_transactions: usize,
    pub chart: Vec<DailyPoint>,
}

pub fn build_dashboard(details: &[TransactionDetail], total_members: i64, now: DateTime<Utc>) -> Dashboard {
    let summary = summarize(details);
    let today = period::start_of_day(now.date_naive());
    let month = period::start_of_month(now);

    let mut customers = std::collections::HashSet::new();
    let mut packages_sold = 0.0;
    let mut today_transactions = 0;
    let mut month_transactions = 0;
    let mut pending_transactions = 0;

    for detail in details {
        let txn = &detail.transaction;
        if let Some(member_id) = txn.member_id.as_deref() {
            customers.insert(member_id);
        }
        packages_sold += detail.quantity_sold();
        if txn.created_at >= today {
            today_transactions += 1;
        }
        if txn.created_at >= month {
            month_transactions += 1;
        }
        if txn.status.is_pending() {
            pending_transactions += 1;
        }
    }

    Dashboard {
        total_transactions: summary.transaction_count,
        total_revenue: summary.total_revenue,
        average_income: summary.average_transaction,
        packages_sold,
        total_customers: customers.len(),
        today_transactions,
        month_transactions,
        total_members,
        pending_transactions,
        chart: daily_chart(details, period::DASHBOARD_CHART_DAYS, now),
    }
}

// =============================================================================
// Outlet Recap
// =============================================================================

/// Revenue of paid transactions in one day or month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecapBucket {
    /// `YYYY-MM-DD` or `YYYY-MM`.
    pub period: String,
    pub transactions: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OutletRecap {
    pub outlet_id: String,
    /// Day the `daily_revenue` / `monthly_revenue` figures refer to.
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// Paid revenue for `date`.
    pub daily_revenue: f64,
    /// Paid revenue for the month containing `date`.
    pub monthly_revenue: f64,
    pub total_revenue: f64,
    pub daily: Vec<RecapBucket>,
    pub monthly: Vec<RecapBucket>,
}

/// Buckets paid transactions by their paid timestamp.
///
/// Unpaid transactions and paid ones without a paid timestamp are skipped.
/// `daily_revenue` and `monthly_revenue` are the buckets containing `now`.
pub fn build_recap(outlet_id: &str, details: &[TransactionDetail], now: DateTime<Utc>) -> OutletRecap {
    let mut daily: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    let mut monthly: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    let mut total_revenue = 0.0;

    for detail in details {
        let txn = &detail.transaction;
        let Some(paid_at) = txn.paid_at.filter(|_| txn.is_paid()) else {
            continue;
        };

        for (map, key) in [
            (&mut daily, period::day_key(paid_at)),
            (&mut monthly, period::month_key(paid_at)),
        ] {
            let entry = map.entry(key).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += detail.total;
        }
        total_revenue += detail.total;
    }

    let revenue_of = |map: &BTreeMap<String, (usize, f64)>, key: String| {
        map.get(&key).map_or(0.0, |(_, revenue)| *revenue)
    };
    let daily_revenue = revenue_of(&daily, period::day_key(now));
    let monthly_revenue = revenue_of(&monthly, period::month_key(now));

    let into_buckets = |map: BTreeMap<String, (usize, f64)>| {
        map.into_iter()
            .map(|(period, (transactions, revenue))| RecapBucket {
                period,
                transactions,
                revenue,
            })
            .collect()
    };

    OutletRecap {
        outlet_id: outlet_id.to_string(),
        date: now.date_naive(),
        daily_revenue,
        monthly_revenue,
        total_revenue,
        daily: into_buckets(daily),
        monthly: into_buckets(monthly),
    }
}

// =============================================================================
// Member Ranking
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopMember {
    pub member_id: String,
    pub name: String,
    pub transaction_count: usize,
    pub total_spent: f64,
    #[ts(as = "String")]
    pub last_visit: DateTime<Utc>,
}

/// Members ranked by total spending, highest first.
///
/// Only members with at least one transaction appear.
pub fn rank_members(details: &[TransactionDetail], limit: usize) -> Vec<TopMember> {
    let mut by_member: HashMap<&str, TopMember> = HashMap::new();

    for detail in details {
        let txn = &detail.transaction;
        let Some(member_id) = txn.member_id.as_deref() else {
            continue;
        };

        let entry = by_member.entry(member_id).or_insert_with(|| TopMember {
            member_id: member_id.to_string(),
            name: txn.member_name.clone().unwrap_or_default(),
            transaction_count: 0,
            total_spent: 0.0,
            last_visit: txn.created_at,
        });
        entry.transaction_count += 1;
        entry.total_spent += detail.total;
        if txn.created_at > entry.last_visit {
            entry.last_visit = txn.created_at;
        }
    }

    let mut ranked: Vec<TopMember> = by_member.into_values().collect();
    ranked.sort_by(|a, b| {
        b.total_spent
            .total_cmp(&a.total_spent)
            .then(b.transaction_count.cmp(&a.transaction_count))
            .then(a.name.cmp(&b.name))
    });
    ranked.truncate(limit);
    ranked
}

// =============================================================================
// Outlet Activity
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OutletActivity {
    pub outlet_id: String,
    pub outlet_name: String,
    pub transactions: usize,
    pub revenue: f64,
}

/// Transaction count and revenue per outlet, busiest first.
pub fn outlet_activity(details: &[TransactionDetail]) -> Vec<OutletActivity> {
    let mut by_outlet: HashMap<&str, OutletActivity> = HashMap::new();

    for detail in details {
        let txn = &detail.transaction;
        let entry = by_outlet
            .entry(txn.outlet_id.as_str())
            .or_insert_with(|| OutletActivity {
                outlet_id: txn.outlet_id.clone(),
                outlet_name: txn.outlet_name.clone().unwrap_or_default(),
                transactions: 0,
                revenue: 0.0,
            });
        entry.transactions += 1;
        entry.revenue += detail.total;
    }

    let mut activity: Vec<OutletActivity> = by_outlet.into_values().collect();
    activity.sort_by(|a, b| {
        b.transactions
            .cmp(&a.transactions)
            .then(a.outlet_name.cmp(&b.outlet_name))
    });
    activity
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentStatus, Transaction, TransactionItem, TransactionStatus};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 16, 12, 0, 0).unwrap()
    }

    struct Fixture {
        member: Option<&'static str>,
        outlet: &'static str,
        created: DateTime<Utc>,
        price: f64,
        quantity: f64,
        status: TransactionStatus,
        paid_at: Option<DateTime<Utc>>,
    }

    impl Default for Fixture {
        fn default() -> Self {
            Fixture {
                member: None,
                outlet: "o-1",
                created: now(),
                price: 10_000.0,
                quantity: 1.0,
                status: TransactionStatus::New,
                paid_at: None,
            }
        }
    }

    fn detail(id: &str, fx: Fixture) -> TransactionDetail {
        let txn = Transaction {
            id: id.to_string(),
            invoice_code: format!("INV-{id}"),
            outlet_id: fx.outlet.to_string(),
            member_id: fx.member.map(str::to_string),
            user_id: None,
            additional_fee: 0.0,
            discount_percent: 0.0,
            tax_percent: 0.0,
            status: fx.status,
            payment_status: if fx.paid_at.is_some() {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Unpaid
            },
            due_at: None,
            paid_at: fx.paid_at,
            outlet_name: Some(format!("Outlet {}", fx.outlet)),
            member_name: fx.member.map(|m| format!("Member {m}")),
            created_at: fx.created,
            updated_at: fx.created,
        };
        let item = TransactionItem {
            id: format!("{id}-item"),
            transaction_id: id.to_string(),
            package_id: "p-1".to_string(),
            package_name: "Kiloan".to_string(),
            unit_price: fx.price,
            quantity: fx.quantity,
            note: None,
            created_at: fx.created,
        };
        TransactionDetail::new(txn, vec![item])
    }

    #[test]
    fn test_summary_of_nothing_is_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.transaction_count, 0);
        assert_eq!(summary.average_transaction, 0.0);
    }

    #[test]
    fn test_report_totals_use_calculator() {
        let details = vec![
            detail("a", Fixture { price: 20_000.0, ..Default::default() }),
            detail("b", Fixture { price: 10_000.0, quantity: 2.0, ..Default::default() }),
        ];
        let report = build_report(details, 7, ReportPeriod::default(), now());

        assert_eq!(report.total_transactions, 2);
        assert_eq!(report.total_revenue, 40_000.0);
        assert_eq!(report.average_transaction, 20_000.0);
        assert_eq!(report.total_members, 7);
        assert_eq!(report.chart.len(), 30);
    }

    #[test]
    fn test_daily_chart_places_counts() {
        let details = vec![
            detail("a", Fixture::default()),
            detail("b", Fixture::default()),
            detail("c", Fixture { created: now() - Duration::days(2), ..Default::default() }),
            detail("old", Fixture { created: now() - Duration::days(40), ..Default::default() }),
        ];
        let chart = daily_chart(&details, 7, now());

        assert_eq!(chart.len(), 7);
        assert_eq!(chart[6].transactions, 2);
        assert_eq!(chart[4].transactions, 1);
        assert_eq!(chart.iter().map(|p| p.transactions).sum::<usize>(), 3);
    }

    #[test]
    fn test_dashboard_counts() {
        let details = vec![
            detail("a", Fixture { member: Some("m1"), quantity: 2.5, ..Default::default() }),
            detail("b", Fixture {
                member: Some("m1"),
                created: now() - Duration::days(3),
                status: TransactionStatus::InProgress,
                ..Default::default()
            }),
            detail("c", Fixture {
                member: Some("m2"),
                created: now() - Duration::days(20),
                status: TransactionStatus::PickedUp,
                ..Default::default()
            }),
        ];
        let dash = build_dashboard(&details, 5, now());

        assert_eq!(dash.total_transactions, 3);
        assert_eq!(dash.total_customers, 2);
        assert_eq!(dash.packages_sold, 4.5);
        assert_eq!(dash.today_transactions, 1);
        // 2024-05-13 is this month, 2024-04-26 is not
        assert_eq!(dash.month_transactions, 2);
        assert_eq!(dash.pending_transactions, 2);
        assert_eq!(dash.chart.len(), 90);
    }

    #[test]
    fn test_recap_buckets_by_paid_date() {
        let may_2 = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        let apr_30 = Utc.with_ymd_and_hms(2024, 4, 30, 9, 0, 0).unwrap();
        let details = vec![
            detail("a", Fixture { paid_at: Some(may_2), ..Default::default() }),
            detail("b", Fixture { paid_at: Some(may_2), price: 5_000.0, ..Default::default() }),
            detail("c", Fixture { paid_at: Some(apr_30), ..Default::default() }),
            detail("unpaid", Fixture::default()),
        ];
        let recap = build_recap("o-1", &details, now());

        assert_eq!(recap.total_revenue, 25_000.0);
        assert_eq!(recap.daily.len(), 2);
        assert_eq!(recap.daily[0].period, "2024-04-30");
        assert_eq!(recap.daily[1].transactions, 2);
        assert_eq!(recap.daily[1].revenue, 15_000.0);
        assert_eq!(recap.monthly[0].period, "2024-04");
        assert_eq!(recap.monthly[1].period, "2024-05");

        // now() is 2024-05-16: nothing paid today, two payments this month
        assert_eq!(recap.date.to_string(), "2024-05-16");
        assert_eq!(recap.daily_revenue, 0.0);
        assert_eq!(recap.monthly_revenue, 15_000.0);
    }

    #[test]
    fn test_recap_current_day() {
        let this_morning = Utc.with_ymd_and_hms(2024, 5, 16, 8, 0, 0).unwrap();
        let last_month = Utc.with_ymd_and_hms(2024, 4, 16, 8, 0, 0).unwrap();
        let details = vec![
            detail("a", Fixture { paid_at: Some(this_morning), price: 12_000.0, ..Default::default() }),
            detail("b", Fixture { paid_at: Some(last_month), ..Default::default() }),
        ];
        let recap = build_recap("o-1", &details, now());

        assert_eq!(recap.daily_revenue, 12_000.0);
        assert_eq!(recap.monthly_revenue, 12_000.0);
        assert_eq!(recap.total_revenue, 22_000.0);
    }

    #[test]
    fn test_rank_members() {
        let details = vec![
            detail("a", Fixture { member: Some("m1"), price: 10_000.0, ..Default::default() }),
            detail("b", Fixture {
                member: Some("m1"),
                price: 10_000.0,
                created: now() - Duration::days(5),
                ..Default::default()
            }),
            detail("c", Fixture { member: Some("m2"), price: 50_000.0, ..Default::default() }),
            detail("guest", Fixture { price: 99_000.0, ..Default::default() }),
        ];
        let ranked = rank_members(&details, 10);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].member_id, "m2");
        assert_eq!(ranked[1].transaction_count, 2);
        assert_eq!(ranked[1].total_spent, 20_000.0);
        assert_eq!(ranked[1].last_visit, now());

        assert_eq!(rank_members(&details, 1).len(), 1);
    }

    #[test]
    fn test_outlet_activity() {
        let details = vec![
            detail("a", Fixture { outlet: "o-1", ..Default::default() }),
            detail("b", Fixture { outlet: "o-2", ..Default::default() }),
            detail("c", Fixture { outlet: "o-2", ..Default::default() }),
        ];
        let activity = outlet_activity(&details);

        assert_eq!(activity[0].outlet_id, "o-2");
        assert_eq!(activity[0].transactions, 2);
        assert_eq!(activity[1].outlet_name, "Outlet o-1");
    }
}
