//! # Package Repository
//!
//! Database operations for priced laundry packages.
//!
//! ```text
//! packages ──(outlet_id)──► outlets
//!     ▲
//!     └──(package_id)── transaction_items   (RESTRICT on delete)
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use laundry_core::{Package, PackageInput};

const PACKAGE_SELECT: &str = r#"
    SELECT
        p.id,
        p.outlet_id,
        p.name,
        p.category,
        p.price,
        o.name AS outlet_name,
        p.created_at,
        p.updated_at
    FROM packages p
    LEFT JOIN outlets o ON o.id = p.outlet_id
"#;

/// Repository for package database operations.
#[derive(Debug, Clone)]
pub struct PackageRepository {
    pool: SqlitePool,
}

impl PackageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PackageRepository { pool }
    }

    /// Lists all packages with their outlet name, newest first.
    pub async fn list(&self) -> DbResult<Vec<Package>> {
        let packages = sqlx::query_as::<_, Package>(&format!(
            "{PACKAGE_SELECT} ORDER BY p.created_at DESC, p.rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(packages)
    }

    /// Gets a package by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Package))` - Package found
    /// * `Ok(None)` - Package not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Package>> {
        let package = sqlx::query_as::<_, Package>(&format!("{PACKAGE_SELECT} WHERE p.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(package)
    }

    /// Inserts a package.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - The outlet does not exist
    pub async fn create(&self, input: &PackageInput) -> DbResult<Package> {
        let id = generate_id();
        let now = Utc::now();

        debug!(id = %id, outlet_id = %input.outlet_id, "Inserting package");

        sqlx::query(
            r#"
            INSERT INTO packages (id, outlet_id, name, category, price, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&id)
        .bind(&input.outlet_id)
        .bind(input.name.trim())
        .bind(input.category)
        .bind(input.price)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Package", &id))
    }

    /// Updates a package.
    ///
    /// Past transactions keep the name and price they were sold at.
    pub async fn update(&self, id: &str, input: &PackageInput) -> DbResult<Package> {
        debug!(id = %id, "Updating package");

        let result = sqlx::query(
            r#"
            UPDATE packages
            SET outlet_id = ?2, name = ?3, category = ?4, price = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.outlet_id)
        .bind(input.name.trim())
        .bind(input.category)
        .bind(input.price)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Package", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Package", id))
    }

    /// Deletes a package.
    ///
    /// ## Returns
    /// * `Err(DbError::InUse)` - A transaction line still references it
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting package");

        let result = sqlx::query("DELETE FROM packages WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).on_delete("Package", id))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Package", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM packages")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
