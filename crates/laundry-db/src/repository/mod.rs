//! # Repository Module
//!
//! Database repository implementations for SmartLaundry.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.transactions().get_detail(id)                              │
//! │       ▼                                                                 │
//! │  TransactionRepository                                                 │
//! │  ├── insert(&self, detail)          ← one store transaction            │
//! │  ├── get_detail(&self, id)                                             │
//! │  ├── list_recent(&self, limit)                                         │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`OutletRepository`](outlet::OutletRepository) - Outlet CRUD
//! - [`MemberRepository`](member::MemberRepository) - Member CRUD
//! - [`PackageRepository`](package::PackageRepository) - Package CRUD and lookups
//! - [`UserRepository`](user::UserRepository) - Staff accounts and password hashing
//! - [`TransactionRepository`](transaction::TransactionRepository) - Invoices and line items

pub mod member;
pub mod outlet;
pub mod package;
pub mod transaction;
pub mod user;

/// Generates a new entity ID.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
