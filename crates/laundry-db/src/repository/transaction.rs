//! # Transaction Repository
//!
//! Database operations for invoices and their line items.
//!
//! ## Transaction Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Transaction Lifecycle                               │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert() → header + items in ONE store transaction             │
//! │                                                                         │
//! │  2. WASH CYCLE                                                         │
//! │     └── update_status() → new → in_progress → done → picked_up         │
//! │                                                                         │
//! │  3. PAYMENT                                                            │
//! │     └── update_payment(Paid)   → paid_at = now                         │
//! │     └── update_payment(Unpaid) → paid_at cleared                       │
//! │                                                                         │
//! │  4. (OPTIONAL) DELETE                                                  │
//! │     └── delete() → items removed by ON DELETE CASCADE                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads always return [`TransactionDetail`], so every caller gets totals
//! computed by the invoice calculator from the stored inputs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use laundry_core::{PaymentStatus, Transaction, TransactionDetail, TransactionItem, TransactionStatus};

const TRANSACTION_SELECT: &str = r#"
    SELECT
        t.id,
        t.invoice_code,
        t.outlet_id,
        t.member_id,
        t.user_id,
        t.additional_fee,
        t.discount_percent,
        t.tax_percent,
        t.status,
        t.payment_status,
        t.due_at,
        t.paid_at,
        o.name AS outlet_name,
        m.name AS member_name,
        t.created_at,
        t.updated_at
    FROM transactions t
    LEFT JOIN outlets o ON o.id = t.outlet_id
    LEFT JOIN members m ON m.id = t.member_id
"#;

const NEWEST_FIRST: &str = "ORDER BY t.created_at DESC, t.rowid DESC";

/// Items are fetched for at most this many headers per query, well under
/// SQLite's bound parameter limit.
const ITEM_BATCH: usize = 500;

/// Repository for transaction database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Persists a transaction header and its items atomically.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - Outlet, member or package vanished
    /// * `Err(DbError::UniqueViolation)` - Invoice code collision
    pub async fn insert(&self, detail: &TransactionDetail) -> DbResult<()> {
        let txn = &detail.transaction;
        debug!(
            id = %txn.id,
            invoice_code = %txn.invoice_code,
            items = detail.items.len(),
            "Inserting transaction"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, invoice_code, outlet_id, member_id, user_id,
                additional_fee, discount_percent, tax_percent,
                status, payment_status, due_at, paid_at,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?11, ?12,
                ?13, ?14
            )
            "#,
        )
        .bind(&txn.id)
        .bind(&txn.invoice_code)
        .bind(&txn.outlet_id)
        .bind(&txn.member_id)
        .bind(&txn.user_id)
        .bind(txn.additional_fee)
        .bind(txn.discount_percent)
        .bind(txn.tax_percent)
        .bind(txn.status)
        .bind(txn.payment_status)
        .bind(txn.due_at)
        .bind(txn.paid_at)
        .bind(txn.created_at)
        .bind(txn.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &detail.items {
            sqlx::query(
                r#"
                INSERT INTO transaction_items (
                    id, transaction_id, package_id, package_name,
                    unit_price, quantity, note, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.transaction_id)
            .bind(&item.package_id)
            .bind(&item.package_name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(&item.note)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Gets a transaction with its items and breakdown.
    pub async fn get_detail(&self, id: &str) -> DbResult<Option<TransactionDetail>> {
        let header = sqlx::query_as::<_, Transaction>(&format!("{TRANSACTION_SELECT} WHERE t.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match header {
            Some(header) => Ok(self.with_items(vec![header]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Most recent transactions first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<TransactionDetail>> {
        let headers = sqlx::query_as::<_, Transaction>(&format!(
            "{TRANSACTION_SELECT} {NEWEST_FIRST} LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        self.with_items(headers).await
    }

    /// Transactions created at or after `start`, newest first.
    pub async fn list_since(&self, start: DateTime<Utc>) -> DbResult<Vec<TransactionDetail>> {
        let headers = sqlx::query_as::<_, Transaction>(&format!(
            "{TRANSACTION_SELECT} WHERE t.created_at >= ?1 {NEWEST_FIRST}"
        ))
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        debug!(start = %start, count = headers.len(), "Loaded transactions for period");
        self.with_items(headers).await
    }

    /// Every transaction, newest first (dashboard, rankings).
    pub async fn list_all(&self) -> DbResult<Vec<TransactionDetail>> {
        let headers = sqlx::query_as::<_, Transaction>(&format!("{TRANSACTION_SELECT} {NEWEST_FIRST}"))
            .fetch_all(&self.pool)
            .await?;

        self.with_items(headers).await
    }

    /// Paid transactions of one outlet, oldest payment first.
    pub async fn list_paid_for_outlet(&self, outlet_id: &str) -> DbResult<Vec<TransactionDetail>> {
        let headers = sqlx::query_as::<_, Transaction>(&format!(
            "{TRANSACTION_SELECT} WHERE t.outlet_id = ?1 AND t.payment_status = ?2 \
             AND t.paid_at IS NOT NULL ORDER BY t.paid_at ASC"
        ))
        .bind(outlet_id)
        .bind(PaymentStatus::Paid)
        .fetch_all(&self.pool)
        .await?;

        self.with_items(headers).await
    }

    /// Moves a transaction through the wash cycle.
    pub async fn update_status(&self, id: &str, status: TransactionStatus) -> DbResult<TransactionDetail> {
        debug!(id = %id, status = status.as_str(), "Updating transaction status");

        let result = sqlx::query("UPDATE transactions SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        self.reload_after(id, result.rows_affected()).await
    }

    /// Marks a transaction paid (stamping `paid_at`) or unpaid (clearing it).
    pub async fn update_payment(&self, id: &str, payment: PaymentStatus) -> DbResult<TransactionDetail> {
        debug!(id = %id, payment = payment.as_str(), "Updating payment status");

        let now = Utc::now();
        let paid_at = (payment == PaymentStatus::Paid).then_some(now);

        let result = sqlx::query(
            "UPDATE transactions SET payment_status = ?2, paid_at = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(payment)
        .bind(paid_at)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.reload_after(id, result.rows_affected()).await
    }

    /// Deletes a transaction; its items go with it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting transaction");

        let result = sqlx::query("DELETE FROM transactions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn reload_after(&self, id: &str, rows_affected: u64) -> DbResult<TransactionDetail> {
        if rows_affected == 0 {
            return Err(DbError::not_found("Transaction", id));
        }

        self.get_detail(id)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", id))
    }

    /// Loads the items of `headers` and pairs them up, keeping header order.
    async fn with_items(&self, headers: Vec<Transaction>) -> DbResult<Vec<TransactionDetail>> {
        let mut items_by_txn: HashMap<String, Vec<TransactionItem>> = HashMap::new();

        for chunk in headers.chunks(ITEM_BATCH) {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
                "SELECT id, transaction_id, package_id, package_name, unit_price, quantity, note, created_at \
                 FROM transaction_items WHERE transaction_id IN (",
            );
            let mut ids = qb.separated(", ");
            for header in chunk {
                ids.push_bind(header.id.as_str());
            }
            ids.push_unseparated(") ORDER BY rowid");

            let items = qb
                .build_query_as::<TransactionItem>()
                .fetch_all(&self.pool)
                .await?;

            for item in items {
                items_by_txn
                    .entry(item.transaction_id.clone())
                    .or_default()
                    .push(item);
            }
        }

        Ok(headers
            .into_iter()
            .map(|header| {
                let items = items_by_txn.remove(&header.id).unwrap_or_default();
                TransactionDetail::new(header, items)
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
