//! # laundry-core: Pure Business Logic for SmartLaundry
//!
//! This crate holds the laundry domain as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       SmartLaundry Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend                                 │   │
//! │  │   Members ──► Transactions ──► Reports ──► Chat widget          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ laundry-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  types   │ │ invoice  │ │  access  │ │validation│          │   │
//! │  │   │ Outlet   │ │ subtotal │ │ Role     │ │  rules   │          │   │
//! │  │   │ Package  │ │ discount │ │Capability│ │  checks  │          │   │
//! │  │   │ Txn      │ │ tax      │ └──────────┘ └──────────┘          │   │
//! │  │   └──────────┘ └──────────┘                                     │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  laundry-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Outlet, Member, Package, User, Transaction)
//! - [`invoice`] - The single invoicing formula used by every consumer
//! - [`access`] - Role → capability policy table
//! - [`period`] - Report period and recap window arithmetic
//! - [`report`] - Aggregation for reports, dashboard, recap and rankings
//! - [`money`] - Rupiah display formatting
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use laundry_core::invoice::{calculate, InvoiceLine};
//!
//! let lines = [InvoiceLine::new(2.0, 15_000.0)];
//! let breakdown = calculate(&lines, 5_000.0, 10.0, 11.0);
//!
//! assert_eq!(breakdown.subtotal, 30_000.0);
//! assert_eq!(breakdown.total, 34_965.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod invoice;
pub mod money;
pub mod period;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{Capability, Role};
pub use error::{CoreError, ValidationError};
pub use invoice::{InvoiceBreakdown, InvoiceLine};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tax percentage applied when the caller does not specify one.
pub const DEFAULT_TAX_PERCENT: f64 = 11.0;

/// Maximum line items allowed in a single transaction.
pub const MAX_LINE_ITEMS: usize = 100;

/// Maximum quantity of a single line item (kilograms or pieces).
///
/// ## Business Reason
/// Catches typing slips such as 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: f64 = 999.0;

/// Number of top members returned by the loyalty ranking.
pub const TOP_MEMBERS_LIMIT: usize = 10;
