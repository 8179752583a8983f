//! # Outlet Repository
//!
//! Database operations for outlets.
//!
//! Deleting an outlet that packages or transactions still point at fails
//! with [`DbError::InUse`]; users affiliated with it are detached.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use laundry_core::{Outlet, OutletInput};

const OUTLET_COLUMNS: &str = "id, name, address, phone, created_at, updated_at";

/// Repository for outlet database operations.
#[derive(Debug, Clone)]
pub struct OutletRepository {
    pool: SqlitePool,
}

impl OutletRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OutletRepository { pool }
    }

    /// Lists all outlets, newest first.
    pub async fn list(&self) -> DbResult<Vec<Outlet>> {
        let outlets = sqlx::query_as::<_, Outlet>(&format!(
            "SELECT {OUTLET_COLUMNS} FROM outlets ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(outlets)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Outlet>> {
        let outlet = sqlx::query_as::<_, Outlet>(&format!(
            "SELECT {OUTLET_COLUMNS} FROM outlets WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(outlet)
    }

    /// Inserts a new outlet from validated input.
    pub async fn create(&self, input: &OutletInput) -> DbResult<Outlet> {
        let now = Utc::now();
        let outlet = Outlet {
            id: generate_id(),
            name: input.name.trim().to_string(),
            address: input.address.clone(),
            phone: input.phone.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %outlet.id, name = %outlet.name, "Inserting outlet");

        sqlx::query(
            r#"
            INSERT INTO outlets (id, name, address, phone, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&outlet.id)
        .bind(&outlet.name)
        .bind(&outlet.address)
        .bind(&outlet.phone)
        .bind(outlet.created_at)
        .bind(outlet.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(outlet)
    }

    /// Updates an outlet in place.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Outlet doesn't exist
    pub async fn update(&self, id: &str, input: &OutletInput) -> DbResult<Outlet> {
        debug!(id = %id, "Updating outlet");

        let result = sqlx::query(
            r#"
            UPDATE outlets SET name = ?2, address = ?3, phone = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.address)
        .bind(&input.phone)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Outlet", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Outlet", id))
    }

    /// Deletes an outlet.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Outlet doesn't exist
    /// * `Err(DbError::InUse)` - Packages or transactions still reference it
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting outlet");

        let result = sqlx::query("DELETE FROM outlets WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).on_delete("Outlet", id))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Outlet", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM outlets")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
