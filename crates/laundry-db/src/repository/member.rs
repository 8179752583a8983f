//! # Member Repository
//!
//! Database operations for registered customers.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use laundry_core::{Member, MemberInput};

const MEMBER_COLUMNS: &str = "id, name, address, gender, phone, created_at, updated_at";

/// Repository for member database operations.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    pool: SqlitePool,
}

impl MemberRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MemberRepository { pool }
    }

    /// Lists all members, newest first.
    pub async fn list(&self) -> DbResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    pub async fn create(&self, input: &MemberInput) -> DbResult<Member> {
        let now = Utc::now();
        let member = Member {
            id: generate_id(),
            name: input.name.trim().to_string(),
            address: input.address.clone(),
            gender: input.gender,
            phone: input.phone.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %member.id, "Inserting member");

        sqlx::query(
            r#"
            INSERT INTO members (id, name, address, gender, phone, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&member.id)
        .bind(&member.name)
        .bind(&member.address)
        .bind(member.gender)
        .bind(&member.phone)
        .bind(member.created_at)
        .bind(member.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(member)
    }

    pub async fn update(&self, id: &str, input: &MemberInput) -> DbResult<Member> {
        debug!(id = %id, "Updating member");

        let result = sqlx::query(
            r#"
            UPDATE members SET name = ?2, address = ?3, gender = ?4, phone = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.address)
        .bind(input.gender)
        .bind(&input.phone)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Member", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Member", id))
    }

    /// Deletes a member.
    ///
    /// ## Returns
    /// * `Err(DbError::InUse)` - The member has transactions
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting member");

        let result = sqlx::query("DELETE FROM members WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).on_delete("Member", id))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Member", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
