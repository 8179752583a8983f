//! Transaction report export as an Excel workbook or CSV.
//!
//! Both formats share one row layout:
//!
//! | Column          | Source                                   |
//! |-----------------|------------------------------------------|
//! | Invoice         | `invoice_code`                           |
//! | Member          | member name, or `Guest`                  |
//! | Date            | `created_at` (`YYYY-MM-DD HH:MM`, UTC)   |
//! | Package Details | `name xqty, ...`                         |
//! | Subtotal        | calculator subtotal, whole Rupiah        |
//! | Additional Fee  | whole Rupiah                             |
//! | Discount (%)    | stored clamped percent                   |
//! | Tax (%)         | stored percent                           |
//! | Total           | calculator total, whole Rupiah           |
//! | Status          | `new` / `in_progress` / `done` / ...     |
//! | Payment         | `paid` / `unpaid`                        |
//! | Paid Date       | `paid_at`, or `-`                        |

use std::str::FromStr;

use csv::Writer;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Serialize;

use laundry_core::money::round_rupiah;
use laundry_core::{CoreError, TransactionDetail};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Worksheet holding the exported rows.
pub const SHEET_NAME: &str = "Laporan Transaksi";

pub const COLUMNS: [&str; 12] = [
    "Invoice",
    "Member",
    "Date",
    "Package Details",
    "Subtotal",
    "Additional Fee",
    "Discount (%)",
    "Tax (%)",
    "Total",
    "Status",
    "Payment",
    "Paid Date",
];

// =============================================================================
// Format
// =============================================================================

/// Requested export format. Excel when the request names none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Excel,
    Csv,
}

impl ExportFormat {
    pub const fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    pub const fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    /// Renders the transactions in this format.
    pub fn render(&self, details: &[TransactionDetail]) -> Result<Vec<u8>, ExportError> {
        match self {
            ExportFormat::Excel => Ok(transactions_xlsx(details)?),
            ExportFormat::Csv => Ok(transactions_csv(details)?),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(CoreError::UnsupportedExportFormat(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel export failed: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Attachment file name for a report period.
pub fn report_filename(period_days: u32, format: ExportFormat) -> String {
    format!(
        "transactions-report-{}-days.{}",
        period_days,
        format.extension()
    )
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Serialize)]
struct ReportRow {
    #[serde(rename = "Invoice")]
    invoice: String,
    #[serde(rename = "Member")]
    member: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Package Details")]
    package_details: String,
    #[serde(rename = "Subtotal")]
    subtotal: i64,
    #[serde(rename = "Additional Fee")]
    additional_fee: i64,
    #[serde(rename = "Discount (%)")]
    discount_percent: f64,
    #[serde(rename = "Tax (%)")]
    tax_percent: f64,
    #[serde(rename = "Total")]
    total: i64,
    #[serde(rename = "Status")]
    status: &'static str,
    #[serde(rename = "Payment")]
    payment: &'static str,
    #[serde(rename = "Paid Date")]
    paid_date: String,
}

enum Cell<'a> {
    Text(&'a str),
    Number(f64),
}

impl ReportRow {
    /// Cells in [`COLUMNS`] order.
    fn cells(&self) -> [Cell<'_>; 12] {
        [
            Cell::Text(&self.invoice),
            Cell::Text(&self.member),
            Cell::Text(&self.date),
            Cell::Text(&self.package_details),
            Cell::Number(self.subtotal as f64),
            Cell::Number(self.additional_fee as f64),
            Cell::Number(self.discount_percent),
            Cell::Number(self.tax_percent),
            Cell::Number(self.total as f64),
            Cell::Text(self.status),
            Cell::Text(self.payment),
            Cell::Text(&self.paid_date),
        ]
    }
}

impl From<&TransactionDetail> for ReportRow {
    fn from(detail: &TransactionDetail) -> Self {
        let txn = &detail.transaction;
        ReportRow {
            invoice: txn.invoice_code.clone(),
            member: txn
                .member_name
                .clone()
                .unwrap_or_else(|| "Guest".to_string()),
            date: txn.created_at.format(DATE_FORMAT).to_string(),
            package_details: detail.package_summary(),
            subtotal: round_rupiah(detail.subtotal),
            additional_fee: round_rupiah(txn.additional_fee),
            discount_percent: txn.discount_percent,
            tax_percent: txn.tax_percent,
            total: round_rupiah(detail.total),
            status: txn.status.as_str(),
            payment: txn.payment_status.as_str(),
            paid_date: txn
                .paid_at
                .map(|at| at.format(DATE_FORMAT).to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

// =============================================================================
// Writers
// =============================================================================

/// Renders transactions as CSV with a header row.
pub fn transactions_csv(details: &[TransactionDetail]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = Writer::from_writer(Vec::new());

    if details.is_empty() {
        // serialize() only writes headers with the first record
        writer.write_record(COLUMNS)?;
    }

    for detail in details {
        writer.serialize(ReportRow::from(detail))?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Renders transactions as a single-sheet `.xlsx` workbook with a bold
/// header row.
pub fn transactions_xlsx(details: &[TransactionDetail]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, title) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, &header)?;
        sheet.set_column_width(col, 16.0)?;
    }

    for (index, detail) in details.iter().enumerate() {
        let row = index as u32 + 1;
        let record = ReportRow::from(detail);

        for (col, cell) in record.cells().into_iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => sheet.write_string(row, col, text)?,
                Cell::Number(number) => sheet.write_number(row, col, number)?,
            };
        }
    }

    workbook.save_to_buffer()
}
