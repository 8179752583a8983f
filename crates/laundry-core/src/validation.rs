//! # Validation Module
//!
//! Input validation utilities for SmartLaundry.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints (username, invoice code)                       │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use laundry_core::validation::{validate_quantity, validate_username};
//!
//! assert!(validate_username("kasir1").is_ok());
//! assert!(validate_quantity(2.5).is_ok());
//! assert!(validate_quantity(-1.0).is_err());
//! ```

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length on account creation.
pub const MIN_PASSWORD_LEN: usize = 6;

const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 500;
const MAX_USERNAME_LEN: usize = 50;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display name (outlet, member, package, user).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional free-text field such as an address or a note.
pub fn validate_optional_text(field: &str, text: Option<&str>) -> ValidationResult<()> {
    match text {
        Some(text) if text.chars().count() > MAX_TEXT_LEN => Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        }),
        _ => Ok(()),
    }
}

/// Validates an optional phone number.
///
/// ## Rules
/// - Digits, spaces, `+` and `-` only
/// - At most 20 characters
///
/// ## Example
/// ```rust
/// use laundry_core::validation::validate_phone;
///
/// assert!(validate_phone(Some("+62 812-3456-7890")).is_ok());
/// assert!(validate_phone(None).is_ok());
/// assert!(validate_phone(Some("call me")).is_err());
/// ```
pub fn validate_phone(phone: Option<&str>) -> ValidationResult<()> {
    let Some(phone) = phone.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(());
    };

    if phone.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 20,
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '+' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, '+' and '-'".to_string(),
        });
    }

    Ok(())
}

/// Validates a login username.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits, `.`, `-`, `_` only
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() > MAX_USERNAME_LEN {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LEN,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, '.', '-' and '_'".to_string(),
        });
    }

    Ok(())
}

/// Validates a new password.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Rejects NaN and infinities.
pub fn validate_finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    Ok(())
}

/// Validates a line item quantity (kilograms or pieces).
///
/// ## Rules
/// - Must be finite and positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Counter: Add Line                                                      │
/// │                                                                         │
/// │  Cashier weighs the bag: 2.5 kg                                        │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(2.5) ← THIS FUNCTION                                │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 0 and 999"     │
/// │       │                                                                 │
/// │       └── OK → Line priced at qty × package price                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: f64) -> ValidationResult<()> {
    validate_finite("quantity", qty)?;

    if qty <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0.0,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a currency amount (price, additional fee, fixed discount).
///
/// ## Rules
/// - Must be finite
/// - Zero is allowed, negatives are not
///
/// ## Example
/// ```rust
/// use laundry_core::validation::validate_amount;
///
/// assert!(validate_amount("price", 7_000.0).is_ok());
/// assert!(validate_amount("price", 0.0).is_ok());
/// assert!(validate_amount("price", -100.0).is_err());
/// ```
pub fn validate_amount(field: &str, amount: f64) -> ValidationResult<()> {
    validate_finite(field, amount)?;

    if amount < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a tax percentage.
///
/// ## Rules
/// - Must be between 0 and 100 inclusive
pub fn validate_tax_percent(percent: f64) -> ValidationResult<()> {
    validate_finite("tax_percent", percent)?;

    if !(0.0..=100.0).contains(&percent) {
        return Err(ValidationError::OutOfRange {
            field: "tax_percent".to_string(),
            min: 0.0,
            max: 100.0,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use laundry_core::validation::validate_uuid;
///
/// assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Outlet Pusat").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("admin").is_ok());
        assert!(validate_username("kasir.satu_2").is_ok());

        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(60)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("").is_err());
        assert!(matches!(
            validate_password("12345"),
            Err(ValidationError::TooShort { min: 6, .. })
        ));
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone(Some("081234567890")).is_ok());
        assert!(validate_phone(Some("")).is_ok());
        assert!(validate_phone(Some("0812-abc")).is_err());
        assert!(validate_phone(Some(&"1".repeat(25))).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1.0).is_ok());
        assert!(validate_quantity(2.5).is_ok());
        assert!(validate_quantity(999.0).is_ok());

        assert!(validate_quantity(0.0).is_err());
        assert!(validate_quantity(-1.0).is_err());
        assert!(validate_quantity(1000.0).is_err());
        assert!(validate_quantity(f64::NAN).is_err());
        assert!(validate_quantity(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("fee", 0.0).is_ok());
        assert!(validate_amount("fee", 5_000.0).is_ok());
        assert!(matches!(
            validate_amount("fee", -1.0),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
        assert!(validate_amount("fee", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_tax_percent() {
        assert!(validate_tax_percent(0.0).is_ok());
        assert!(validate_tax_percent(11.0).is_ok());
        assert!(validate_tax_percent(100.0).is_ok());
        assert!(validate_tax_percent(100.5).is_err());
        assert!(validate_tax_percent(-1.0).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
        assert!(validate_uuid("id", "123").is_err());
    }
}
