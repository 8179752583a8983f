//! # laundry-db: Database Layer for SmartLaundry
//!
//! This crate provides database access for the SmartLaundry server.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SmartLaundry Data Flow                             │
//! │                                                                         │
//! │  HTTP handler (POST /api/transactions)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    laundry-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ OutletRepo    │    │              │  │   │
//! │  │   │ SqlitePool    │    │ MemberRepo    │    │ 001_initial_ │  │   │
//! │  │   │ Connection    │◄───│ PackageRepo   │    │   schema.sql │  │   │
//! │  │   │ Management    │    │ UserRepo      │    │              │  │   │
//! │  │   │               │    │ TransactionRepo│   │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                     ./data/laundry.db                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (outlet, transaction, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use laundry_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/laundry.db")).await?;
//!
//! let recent = db.transactions().list_recent(20).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::member::MemberRepository;
pub use repository::outlet::OutletRepository;
pub use repository::package::PackageRepository;
pub use repository::transaction::TransactionRepository;
pub use repository::user::{hash_password, verify_password, UserRepository};
