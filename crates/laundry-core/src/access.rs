//! # Access Control
//!
//! Declarative role → capability policy table.
//!
//! ```text
//! ┌──────────────────────┬───────┬─────────┬───────┐
//! │ Capability           │ admin │ cashier │ owner │
//! ├──────────────────────┼───────┼─────────┼───────┤
//! │ register_members     │   ✓   │    ✓    │   ✓   │
//! │ manage_outlets       │   ✓   │         │       │
//! │ manage_packages      │   ✓   │         │       │
//! │ manage_users         │   ✓   │         │       │
//! │ enter_transactions   │   ✓   │    ✓    │   ✓   │
//! │ generate_reports     │   ✓   │    ✓    │   ✓   │
//! └──────────────────────┴───────┴─────────┴───────┘
//! ```
//!
//! The HTTP layer only asks "does this role hold capability X". Adding a
//! role or moving a permission is a change to [`Role::capabilities`] alone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};

// =============================================================================
// Role
// =============================================================================

/// Staff role attached to every user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Cashier,
    Owner,
}

// =============================================================================
// Capability
// =============================================================================

/// A named permission granted to roles by the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    RegisterMembers,
    ManageOutlets,
    ManagePackages,
    ManageUsers,
    EnterTransactions,
    GenerateReports,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::RegisterMembers,
        Capability::ManageOutlets,
        Capability::ManagePackages,
        Capability::ManageUsers,
        Capability::EnterTransactions,
        Capability::GenerateReports,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Capability::RegisterMembers => "register_members",
            Capability::ManageOutlets => "manage_outlets",
            Capability::ManagePackages => "manage_packages",
            Capability::ManageUsers => "manage_users",
            Capability::EnterTransactions => "enter_transactions",
            Capability::GenerateReports => "generate_reports",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Policy Table
// =============================================================================

const COUNTER_STAFF: &[Capability] = &[
    Capability::RegisterMembers,
    Capability::EnterTransactions,
    Capability::GenerateReports,
];

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Cashier => "cashier",
            Role::Owner => "owner",
        }
    }

    /// Capabilities held by this role.
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Admin => &Capability::ALL,
            Role::Cashier | Role::Owner => COUNTER_STAFF,
        }
    }

    #[inline]
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Like [`Role::can`], but as a `Result` for use with `?`.
    pub fn require(&self, capability: Capability) -> CoreResult<()> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(CoreError::MissingCapability {
                role: self.as_str().to_string(),
                capability: capability.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "cashier" => Ok(Role::Cashier),
            "owner" => Ok(Role::Owner),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec![
                    "admin".to_string(),
                    "cashier".to_string(),
                    "owner".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
