//! # User Repository
//!
//! Database operations for staff accounts.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use velva_core::{Role, StaffUser};

/// Repository for staff account operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    fn map_user(row: &SqliteRow) -> DbResult<StaffUser> {
        Ok(StaffUser {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get::<Role, _>("role")?,
            active: row.try_get("active")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }

    /// Inserts a staff account.
    ///
    /// Usernames are unique; a duplicate surfaces as
    /// [`crate::DbError::UniqueViolation`].
    pub async fn insert(&self, user: &StaffUser) -> DbResult<()> {
        debug!(id = %user.id, username = %user.username, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, username, password_hash, role, active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing staff account (profile, role, active flag,
    /// password hash).
    pub async fn update(&self, user: &StaffUser) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = ?2,
                username = ?3,
                password_hash = ?4,
                role = ?5,
                active = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.active)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(crate::DbError::not_found("User", &user.id));
        }
        Ok(())
    }

    /// Gets a user by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StaffUser>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_user).transpose()
    }

    /// Gets a user by login username.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<StaffUser>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_user).transpose()
    }

    /// Lists all staff accounts, admins first.
    pub async fn list(&self) -> DbResult<Vec<StaffUser>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY role, username")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::map_user).collect()
    }

    /// Deletes a staff account.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(crate::DbError::not_found("User", id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
