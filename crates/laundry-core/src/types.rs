//! # Domain Types
//!
//! Core domain types used throughout SmartLaundry.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Outlet      │◄──│    Package      │   │     Member      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  outlet_id (FK) │   │  name           │       │
//! │  │  address        │   │  category       │   │  gender         │       │
//! │  └────────▲────────┘   │  price          │   └────────▲────────┘       │
//! │           │            └────────▲────────┘            │                │
//! │           │                     │                     │                │
//! │  ┌────────┴─────────────────────┼─────────────────────┴────────┐       │
//! │  │                      Transaction                            │       │
//! │  │  invoice_code • additional_fee • discount% • tax%           │       │
//! │  │  status • payment_status                                    │       │
//! │  │        └── TransactionItem (package snapshot, quantity) ────┘       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has a UUID v4 `id` used for relations. Transactions also
//! carry a human-readable `invoice_code` (`INV-<unix millis>`).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::access::Role;
use crate::error::{CoreError, CoreResult};
use crate::invoice::{self, DiscountType, InvoiceBreakdown, InvoiceLine};
use crate::validation;
use crate::MAX_LINE_ITEMS;

// =============================================================================
// Enums
// =============================================================================

/// Package category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PackageCategory {
    /// Priced per kilogram.
    PerKilo,
    Blanket,
    BedCover,
    TShirt,
    Other,
}

impl PackageCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PackageCategory::PerKilo => "per_kilo",
            PackageCategory::Blanket => "blanket",
            PackageCategory::BedCover => "bed_cover",
            PackageCategory::TShirt => "t_shirt",
            PackageCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Where a transaction is in the wash cycle.
///
/// ```text
/// New ──► InProgress ──► Done ──► PickedUp
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Received at the counter.
    #[default]
    New,
    /// Being washed.
    InProgress,
    /// Ready for pickup.
    Done,
    /// Collected by the customer.
    PickedUp,
}

impl TransactionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::New => "new",
            TransactionStatus::InProgress => "in_progress",
            TransactionStatus::Done => "done",
            TransactionStatus::PickedUp => "picked_up",
        }
    }

    /// Orders still waiting on the shop (new or in progress).
    pub const fn is_pending(&self) -> bool {
        matches!(self, TransactionStatus::New | TransactionStatus::InProgress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Unpaid,
}

impl PaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Unpaid => "unpaid",
        }
    }
}

// =============================================================================
// Outlet
// =============================================================================

/// A physical shop location.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Outlet {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Member
// =============================================================================

/// A registered customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Package
// =============================================================================

/// A priced service offered by an outlet.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Package {
    pub id: String,
    pub outlet_id: String,
    pub name: String,
    pub category: PackageCategory,
    /// Unit price in Rupiah (per kg or per piece).
    pub price: f64,
    /// Joined from outlets in listings.
    #[cfg_attr(feature = "sqlx", sqlx(default))]
    pub outlet_name: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

/// A staff account.
///
/// The password hash is never serialized into responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: Role,
    pub outlet_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Transaction
// =============================================================================

/// An invoice header.
///
/// `discount_percent` is stored already clamped and `tax_percent` is the
/// rate actually used, so [`Transaction::breakdown`] reproduces the total
/// charged at the counter.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    pub invoice_code: String,
    pub outlet_id: String,
    pub member_id: Option<String>,
    pub user_id: Option<String>,
    pub additional_fee: f64,
    pub discount_percent: f64,
    pub tax_percent: f64,
    pub status: TransactionStatus,
    pub payment_status: PaymentStatus,
    #[ts(as = "Option<String>")]
    pub due_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
    /// Joined from outlets.
    #[cfg_attr(feature = "sqlx", sqlx(default))]
    pub outlet_name: Option<String>,
    /// Joined from members. `None` for walk-in guests.
    #[cfg_attr(feature = "sqlx", sqlx(default))]
    pub member_name: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Generates an invoice code from the creation instant.
    pub fn invoice_code_for(at: DateTime<Utc>) -> String {
        format!("INV-{}", at.timestamp_millis())
    }

    /// Runs the invoice calculator over this header and its items.
    pub fn breakdown(&self, items: &[TransactionItem]) -> InvoiceBreakdown {
        let lines: Vec<InvoiceLine> = items.iter().map(TransactionItem::invoice_line).collect();
        invoice::calculate(
            &lines,
            self.additional_fee,
            self.discount_percent,
            self.tax_percent,
        )
    }

    #[inline]
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A line item of a transaction.
/// Uses snapshot pattern to freeze package data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub package_id: String,
    /// Package name at time of sale (frozen).
    pub package_name: String,
    /// Unit price at time of sale (frozen).
    pub unit_price: f64,
    pub quantity: f64,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl TransactionItem {
    #[inline]
    pub fn invoice_line(&self) -> InvoiceLine {
        InvoiceLine::new(self.quantity, self.unit_price)
    }
}

/// A transaction with its items and computed breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
    pub subtotal: f64,
    pub total: f64,
    pub breakdown: InvoiceBreakdown,
}

impl TransactionDetail {
    pub fn new(transaction: Transaction, items: Vec<TransactionItem>) -> Self {
        let breakdown = transaction.breakdown(&items);
        TransactionDetail {
            transaction,
            items,
            subtotal: breakdown.subtotal,
            total: breakdown.total,
            breakdown,
        }
    }

    /// "Wash Kiloan x2.5, Bed Cover x1" as shown on exports.
    pub fn package_summary(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("{} x{}", item.package_name, item.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Sum of quantities across all items.
    pub fn quantity_sold(&self) -> f64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Request Payloads
// =============================================================================

/// Create/update payload for an outlet.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct OutletInput {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl OutletInput {
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_name("name", &self.name)?;
        validation::validate_optional_text("address", self.address.as_deref())?;
        validation::validate_phone(self.phone.as_deref())?;
        Ok(())
    }
}

/// Create/update payload for a member.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct MemberInput {
    pub name: String,
    pub address: Option<String>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
}

impl MemberInput {
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_name("name", &self.name)?;
        validation::validate_optional_text("address", self.address.as_deref())?;
        validation::validate_phone(self.phone.as_deref())?;
        Ok(())
    }
}

/// Create/update payload for a package.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct PackageInput {
    pub outlet_id: String,
    pub name: String,
    pub category: PackageCategory,
    pub price: f64,
}

impl PackageInput {
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_uuid("outlet_id", &self.outlet_id)?;
        validation::validate_name("name", &self.name)?;
        validation::validate_amount("price", self.price)?;
        Ok(())
    }
}

/// Create/update payload for a user.
///
/// `password` is required on create and optional on update.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct UserInput {
    pub name: String,
    pub username: String,
    pub password: Option<String>,
    pub role: Role,
    pub outlet_id: Option<String>,
}

impl UserInput {
    pub fn validate_create(&self) -> CoreResult<()> {
        self.validate_common()?;
        validation::validate_password(self.password.as_deref().unwrap_or(""))?;
        Ok(())
    }

    pub fn validate_update(&self) -> CoreResult<()> {
        self.validate_common()?;
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            validation::validate_password(password)?;
        }
        Ok(())
    }

    fn validate_common(&self) -> CoreResult<()> {
        validation::validate_name("name", &self.name)?;
        validation::validate_username(&self.username)?;
        if let Some(outlet_id) = self.outlet_id.as_deref() {
            validation::validate_uuid("outlet_id", outlet_id)?;
        }
        Ok(())
    }
}

fn deserialize_due_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(at.with_timezone(&Utc)));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| Some(date.and_time(NaiveTime::MIN).and_utc()))
        .map_err(|_| {
            serde::de::Error::custom(format!(
                "invalid due_at '{}': expected YYYY-MM-DD or an RFC 3339 timestamp",
                raw
            ))
        })
}

/// One line of a new transaction.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct NewTransactionItem {
    pub package_id: String,
    pub quantity: f64,
    pub note: Option<String>,
}

/// Payload for creating a transaction at the counter.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct NewTransaction {
    pub outlet_id: String,
    pub member_id: Option<String>,
    /// RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
    #[serde(default, deserialize_with = "deserialize_due_at")]
    #[ts(as = "Option<String>")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub additional_fee: f64,
    /// Percent or Rupiah depending on `discount_type`.
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub discount_type: DiscountType,
    /// Defaults to [`crate::DEFAULT_TAX_PERCENT`].
    pub tax_percent: Option<f64>,
    pub status: Option<TransactionStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub items: Vec<NewTransactionItem>,
}

impl NewTransaction {
    /// Checks everything that can be checked without the database.
    pub fn validate(&self) -> CoreResult<()> {
        if self.outlet_id.trim().is_empty() {
            return Err(crate::ValidationError::Required {
                field: "outlet_id".to_string(),
            }
            .into());
        }
        validation::validate_uuid("outlet_id", &self.outlet_id)?;
        if let Some(member_id) = self.member_id.as_deref().filter(|m| !m.is_empty()) {
            validation::validate_uuid("member_id", member_id)?;
        }

        if self.items.is_empty() {
            return Err(CoreError::EmptyTransaction);
        }
        if self.items.len() > MAX_LINE_ITEMS {
            return Err(CoreError::TooManyItems {
                max: MAX_LINE_ITEMS,
            });
        }
        for item in &self.items {
            validation::validate_uuid("package_id", &item.package_id)?;
            validation::validate_quantity(item.quantity)?;
        }

        validation::validate_amount("additional_fee", self.additional_fee)?;
        match self.discount_type {
            DiscountType::Percent => validation::validate_finite("discount", self.discount)?,
            DiscountType::Fixed => validation::validate_amount("discount", self.discount)?,
        }
        if let Some(tax) = self.tax_percent {
            validation::validate_tax_percent(tax)?;
        }
        Ok(())
    }

    /// Tax percent to apply and persist.
    pub fn effective_tax_percent(&self) -> f64 {
        self.tax_percent.unwrap_or(crate::DEFAULT_TAX_PERCENT)
    }

    /// Assembles the header and line items to persist.
    ///
    /// ## Steps
    /// 1. Resolve every line's package from `packages` (unknown → `InvalidPackage`)
    /// 2. Snapshot package name and unit price onto the line
    /// 3. Convert a fixed discount to a percent of subtotal + fee, then clamp
    /// 4. Default the tax percent and stamp `paid_at` when created as paid
    ///
    /// `validate()` should have passed first.
    pub fn build(
        &self,
        packages: &[Package],
        user_id: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<TransactionDetail> {
        let transaction_id = uuid::Uuid::new_v4().to_string();

        let items = self
            .items
            .iter()
            .map(|line| {
                let package = packages
                    .iter()
                    .find(|p| p.id == line.package_id)
                    .ok_or_else(|| CoreError::InvalidPackage(line.package_id.clone()))?;
                Ok(TransactionItem {
                    id: uuid::Uuid::new_v4().to_string(),
                    transaction_id: transaction_id.clone(),
                    package_id: package.id.clone(),
                    package_name: package.name.clone(),
                    unit_price: package.price,
                    quantity: line.quantity,
                    note: line.note.clone().filter(|n| !n.trim().is_empty()),
                    created_at: now,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let lines: Vec<InvoiceLine> = items.iter().map(TransactionItem::invoice_line).collect();
        let discount_percent = invoice::resolve_discount_percent(
            self.discount_type,
            self.discount,
            invoice::subtotal(&lines),
            self.additional_fee,
        );

        let payment_status = self.payment_status.unwrap_or_default();
        let transaction = Transaction {
            id: transaction_id,
            invoice_code: Transaction::invoice_code_for(now),
            outlet_id: self.outlet_id.clone(),
            member_id: self.member_id.clone().filter(|m| !m.is_empty()),
            user_id,
            additional_fee: self.additional_fee,
            discount_percent,
            tax_percent: self.effective_tax_percent(),
            status: self.status.unwrap_or_default(),
            payment_status,
            due_at: self.due_at,
            paid_at: (payment_status == PaymentStatus::Paid).then_some(now),
            outlet_name: None,
            member_name: None,
            created_at: now,
            updated_at: now,
        };

        Ok(TransactionDetail::new(transaction, items))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transaction() -> Transaction {
        let now = Utc::now();
        Transaction {
            id: "t-1".to_string(),
            invoice_code: Transaction::invoice_code_for(now),
            outlet_id: "o-1".to_string(),
            member_id: None,
            user_id: None,
            additional_fee: 5_000.0,
            discount_percent: 10.0,
            tax_percent: 11.0,
            status: TransactionStatus::New,
            payment_status: PaymentStatus::Unpaid,
            due_at: None,
            paid_at: None,
            outlet_name: None,
            member_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_item(name: &str, quantity: f64, unit_price: f64) -> TransactionItem {
        TransactionItem {
            id: format!("i-{name}"),
            transaction_id: "t-1".to_string(),
            package_id: "p-1".to_string(),
            package_name: name.to_string(),
            unit_price,
            quantity,
            note: None,
            created_at: Utc::now(),
        }
    }

    fn sample_new_transaction() -> NewTransaction {
        NewTransaction {
            outlet_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            member_id: None,
            due_at: None,
            additional_fee: 0.0,
            discount: 0.0,
            discount_type: DiscountType::Percent,
            tax_percent: None,
            status: None,
            payment_status: None,
            items: vec![NewTransactionItem {
                package_id: "6ba7b810-9dad-11d1-80b4-00c04fd430c8".to_string(),
                quantity: 2.5,
                note: None,
            }],
        }
    }

    #[test]
    fn test_transaction_breakdown_uses_stored_inputs() {
        let txn = sample_transaction();
        let detail = TransactionDetail::new(txn, vec![sample_item("Kiloan", 2.0, 15_000.0)]);

        assert_eq!(detail.subtotal, 30_000.0);
        assert_eq!(detail.total, 34_965.0);
        assert_eq!(detail.breakdown.tax_percent, 11.0);
    }

    #[test]
    fn test_package_summary() {
        let detail = TransactionDetail::new(
            sample_transaction(),
            vec![
                sample_item("Kiloan", 2.5, 7_000.0),
                sample_item("Bed Cover", 1.0, 25_000.0),
            ],
        );
        assert_eq!(detail.package_summary(), "Kiloan x2.5, Bed Cover x1");
        assert_eq!(detail.quantity_sold(), 3.5);
    }

    #[test]
    fn test_invoice_code_format() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(Transaction::invoice_code_for(at), "INV-1700000000123");
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(TransactionStatus::default(), TransactionStatus::New);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Unpaid);
        assert!(TransactionStatus::InProgress.is_pending());
        assert!(!TransactionStatus::PickedUp.is_pending());
    }

    #[test]
    fn test_enum_serde_names() {
        assert_eq!(
            serde_json::to_string(&PackageCategory::TShirt).unwrap(),
            "\"t_shirt\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionStatus::PickedUp).unwrap(),
            "\"picked_up\""
        );
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"female\"");
        assert_eq!(PackageCategory::BedCover.as_str(), "bed_cover");
    }

    #[test]
    fn test_user_hash_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: "u-1".to_string(),
            name: "Admin".to_string(),
            username: "admin".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Admin,
            outlet_id: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn test_new_transaction_validation() {
        let txn = sample_new_transaction();
        assert!(txn.validate().is_ok());
        assert_eq!(txn.effective_tax_percent(), 11.0);

        let mut empty = sample_new_transaction();
        empty.items.clear();
        assert!(matches!(empty.validate(), Err(CoreError::EmptyTransaction)));

        let mut no_outlet = sample_new_transaction();
        no_outlet.outlet_id = " ".to_string();
        assert!(matches!(no_outlet.validate(), Err(CoreError::Validation(_))));

        let mut negative = sample_new_transaction();
        negative.items[0].quantity = -1.0;
        assert!(negative.validate().is_err());

        let mut bad_fee = sample_new_transaction();
        bad_fee.additional_fee = -5.0;
        assert!(bad_fee.validate().is_err());

        let mut bad_tax = sample_new_transaction();
        bad_tax.tax_percent = Some(150.0);
        assert!(bad_tax.validate().is_err());
    }

    #[test]
    fn test_new_transaction_deserializes_defaults() {
        let json = r#"{
            "outlet_id": "550e8400-e29b-41d4-a716-446655440000",
            "items": [{"package_id": "6ba7b810-9dad-11d1-80b4-00c04fd430c8", "quantity": 3}]
        }"#;
        let txn: NewTransaction = serde_json::from_str(json).unwrap();

        assert_eq!(txn.discount_type, DiscountType::Percent);
        assert_eq!(txn.additional_fee, 0.0);
        assert!(txn.tax_percent.is_none());
        assert_eq!(txn.items[0].quantity, 3.0);
        assert!(txn.due_at.is_none());
    }

    #[test]
    fn test_due_at_accepts_date_or_timestamp() {
        let parse = |due: &str| {
            let json = format!(
                r#"{{"outlet_id": "550e8400-e29b-41d4-a716-446655440000", "due_at": {}, "items": []}}"#,
                due
            );
            serde_json::from_str::<NewTransaction>(&json).map(|txn| txn.due_at)
        };

        let date_only = parse(r#""2024-05-20""#).unwrap().unwrap();
        assert_eq!(date_only.to_rfc3339(), "2024-05-20T00:00:00+00:00");

        let with_offset = parse(r#""2024-05-20T17:00:00+07:00""#).unwrap().unwrap();
        assert_eq!(with_offset.to_rfc3339(), "2024-05-20T10:00:00+00:00");

        assert!(parse("null").unwrap().is_none());
        assert!(parse(r#""""#).unwrap().is_none());
        assert!(parse(r#""20/05/2024""#).is_err());
    }

    fn sample_package(id: &str, price: f64) -> Package {
        let now = Utc::now();
        Package {
            id: id.to_string(),
            outlet_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            name: "Cuci Kering".to_string(),
            category: PackageCategory::PerKilo,
            price,
            outlet_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_build_snapshots_packages() {
        let txn = sample_new_transaction();
        let packages = [sample_package("6ba7b810-9dad-11d1-80b4-00c04fd430c8", 7_000.0)];
        let now = Utc::now();

        let detail = txn.build(&packages, Some("u-1".to_string()), now).unwrap();

        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].package_name, "Cuci Kering");
        assert_eq!(detail.items[0].unit_price, 7_000.0);
        assert_eq!(detail.items[0].transaction_id, detail.transaction.id);
        assert_eq!(detail.subtotal, 17_500.0);
        assert_eq!(detail.transaction.tax_percent, 11.0);
        assert_eq!(detail.transaction.status, TransactionStatus::New);
        assert_eq!(detail.transaction.payment_status, PaymentStatus::Unpaid);
        assert!(detail.transaction.paid_at.is_none());
        assert_eq!(detail.transaction.user_id.as_deref(), Some("u-1"));
        assert!(detail.transaction.invoice_code.starts_with("INV-"));
    }

    #[test]
    fn test_build_converts_fixed_discount() {
        let mut txn = sample_new_transaction();
        txn.items[0].quantity = 1.0;
        txn.discount_type = DiscountType::Fixed;
        txn.discount = 150_000.0;
        txn.payment_status = Some(PaymentStatus::Paid);
        let packages = [sample_package("6ba7b810-9dad-11d1-80b4-00c04fd430c8", 100_000.0)];
        let now = Utc::now();

        let detail = txn.build(&packages, None, now).unwrap();

        assert_eq!(detail.transaction.discount_percent, 100.0);
        assert_eq!(detail.total, 0.0);
        assert_eq!(detail.transaction.paid_at, Some(now));
    }

    #[test]
    fn test_build_rejects_unknown_package() {
        let txn = sample_new_transaction();
        let err = txn.build(&[], None, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPackage(_)));
    }

    #[test]
    fn test_user_input_password_rules() {
        let mut input = UserInput {
            name: "Kasir Satu".to_string(),
            username: "kasir1".to_string(),
            password: None,
            role: Role::Cashier,
            outlet_id: None,
        };
        assert!(input.validate_create().is_err());
        assert!(input.validate_update().is_ok());

        input.password = Some("123".to_string());
        assert!(input.validate_update().is_err());

        input.password = Some("secret1".to_string());
        assert!(input.validate_create().is_ok());
    }
}
