//! # User Repository
//!
//! Staff accounts and their password hashes.
//!
//! ## Password Storage
//! ```text
//! "secret1" ──► argon2id + random salt ──► "$argon2id$v=19$m=19456,t=2,p=1$..."
//! ```
//! Plain passwords never reach the database; the hash never leaves this
//! crate in a response because [`User`] skips it when serialized.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use laundry_core::{User, UserInput};

const USER_COLUMNS: &str =
    "id, name, username, password_hash, role, outlet_id, created_at, updated_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Lists all users, newest first.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Creates a user, hashing the supplied password.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Username already taken
    pub async fn create(&self, input: &UserInput) -> DbResult<User> {
        let username = input.username.trim();
        self.ensure_username_free(username, None).await?;

        let password = input
            .password
            .as_deref()
            .ok_or_else(|| DbError::Internal("password missing on create".to_string()))?;

        let now = Utc::now();
        let user = User {
            id: generate_id(),
            name: input.name.trim().to_string(),
            username: username.to_string(),
            password_hash: hash_password(password)?,
            role: input.role,
            outlet_id: input.outlet_id.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %user.id, username = %user.username, role = %user.role, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, username, password_hash, role, outlet_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.outlet_id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    /// Updates a user. The password is re-hashed only when a non-empty one
    /// is supplied.
    pub async fn update(&self, id: &str, input: &UserInput) -> DbResult<User> {
        let username = input.username.trim();
        self.ensure_username_free(username, Some(id)).await?;

        let new_hash = match input.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        debug!(id = %id, rehash = new_hash.is_some(), "Updating user");

        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = ?2,
                username = ?3,
                role = ?4,
                outlet_id = ?5,
                password_hash = COALESCE(?6, password_hash),
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(username)
        .bind(input.role)
        .bind(&input.outlet_id)
        .bind(new_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Deletes a user. Their transactions stay, with the user reference
    /// cleared.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).on_delete("User", id))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Looks up a user and checks the password.
    ///
    /// Returns `None` for an unknown username or a wrong password alike.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> DbResult<Option<User>> {
        let Some(user) = self.get_by_username(username).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    async fn ensure_username_free(&self, username: &str, except_id: Option<&str>) -> DbResult<()> {
        let taken: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        match taken {
            Some(owner) if Some(owner.as_str()) != except_id => {
                Err(DbError::duplicate("username", username))
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password for storage (argon2id, random salt).
pub fn hash_password(password: &str) -> DbResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(e) => {
            warn!(error = %e, "Stored password hash is malformed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use laundry_core::Role;

    fn input(username: &str, password: Option<&str>) -> UserInput {
        UserInput {
            name: "Kasir Satu".to_string(),
            username: username.to_string(),
            password: password.map(str::to_string),
            role: Role::Cashier,
            outlet_id: None,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("secret1", "not-a-hash"));
    }

    #[tokio::test]
    async fn test_create_and_login() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        let user = repo.create(&input("kasir1", Some("secret1"))).await.unwrap();
        assert_eq!(user.role, Role::Cashier);

        let ok = repo.verify_credentials("kasir1", "secret1").await.unwrap();
        assert_eq!(ok.map(|u| u.id), Some(user.id));

        assert!(repo.verify_credentials("kasir1", "nope").await.unwrap().is_none());
        assert!(repo.verify_credentials("ghost", "secret1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        repo.create(&input("kasir1", Some("secret1"))).await.unwrap();
        let err = repo.create(&input("kasir1", Some("secret2"))).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_keeps_password_unless_given() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();
        let user = repo.create(&input("kasir1", Some("secret1"))).await.unwrap();

        // Same username on the same user is fine
        let updated = repo.update(&user.id, &input("kasir1", None)).await.unwrap();
        assert_eq!(updated.password_hash, user.password_hash);
        assert!(repo.verify_credentials("kasir1", "secret1").await.unwrap().is_some());

        repo.update(&user.id, &input("kasir1", Some("newpass"))).await.unwrap();
        assert!(repo.verify_credentials("kasir1", "secret1").await.unwrap().is_none());
        assert!(repo.verify_credentials("kasir1", "newpass").await.unwrap().is_some());
    }
}
