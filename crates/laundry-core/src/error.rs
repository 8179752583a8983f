//! # Error Types
//!
//! Domain-specific error types for laundry-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  laundry-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  laundry-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP API errors (apps/server)                                         │
//! │  └── ApiError         - What the frontend sees (JSON envelope)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend               │
//! │        sqlx::Error → DbError → ApiError → Frontend                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ID, field name, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A package referenced by a line item does not exist.
    ///
    /// ## When This Occurs
    /// - The cashier's package list is stale and the package was deleted
    /// - A hand-crafted request carries a random package id
    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    /// A transaction needs at least one line item.
    #[error("Transaction must have at least one item")]
    EmptyTransaction,

    /// Transaction exceeded the maximum number of line items.
    #[error("Transaction cannot have more than {max} items")]
    TooManyItems { max: usize },

    /// A role lacks the capability an operation requires.
    ///
    /// ## When This Occurs
    /// - A cashier calls an outlet/package/user management endpoint
    #[error("Role {role} lacks capability {capability}")]
    MissingCapability { role: String, capability: String },

    /// Export format other than the supported ones.
    #[error("Unsupported export format: {0}")]
    UnsupportedExportFormat(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate username).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidPackage("pkg-1".to_string());
        assert_eq!(err.to_string(), "Invalid package: pkg-1");

        let err = CoreError::MissingCapability {
            role: "cashier".to_string(),
            capability: "manage_users".to_string(),
        };
        assert_eq!(err.to_string(), "Role cashier lacks capability manage_users");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        };
        assert_eq!(err.to_string(), "password must be at least 6 characters");

        let err = ValidationError::OutOfRange {
            field: "tax_percent".to_string(),
            min: 0.0,
            max: 100.0,
        };
        assert_eq!(err.to_string(), "tax_percent must be between 0 and 100");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "outlet_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
