//! # Shift Repository
//!
//! Database operations for cash shifts and the drawer expenses booked
//! against them.
//!
//! ## One Open Shift Per User
//! The `idx_shifts_one_open_per_user` partial unique index backs the
//! invariant at the storage layer; the shift manager additionally makes
//! `open_shift` idempotent by returning the existing open shift instead
//! of inserting a second one.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use velva_core::{Expense, Shift};

/// Repository for shift and expense operations.
#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    /// Creates a new ShiftRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShiftRepository { pool }
    }

    fn map_shift(row: &SqliteRow) -> DbResult<Shift> {
        Ok(Shift {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            opened_at: row.try_get::<DateTime<Utc>, _>("opened_at")?,
            closed_at: row.try_get::<Option<DateTime<Utc>>, _>("closed_at")?,
            opening_cash_cents: row.try_get("opening_cash_cents")?,
            closing_cash_cents: row.try_get("closing_cash_cents")?,
            calculated_cash_cents: row.try_get("calculated_cash_cents")?,
        })
    }

    fn map_expense(row: &SqliteRow) -> DbResult<Expense> {
        Ok(Expense {
            id: row.try_get("id")?,
            shift_id: row.try_get("shift_id")?,
            category: row.try_get("category")?,
            amount_cents: row.try_get("amount_cents")?,
            note: row.try_get("note")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }

    // -------------------------------------------------------------------------
    // Shifts
    // -------------------------------------------------------------------------

    /// Inserts a freshly opened shift.
    pub async fn insert(&self, shift: &Shift) -> DbResult<()> {
        debug!(id = %shift.id, user = %shift.user_id, "Opening shift");

        sqlx::query(
            r#"
            INSERT INTO shifts (
                id, user_id, opened_at, closed_at,
                opening_cash_cents, closing_cash_cents, calculated_cash_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&shift.id)
        .bind(&shift.user_id)
        .bind(shift.opened_at)
        .bind(shift.closed_at)
        .bind(shift.opening_cash_cents)
        .bind(shift.closing_cash_cents)
        .bind(shift.calculated_cash_cents)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Finds the user's open shift, if any.
    pub async fn find_open_by_user(&self, user_id: &str) -> DbResult<Option<Shift>> {
        let row = sqlx::query(
            "SELECT * FROM shifts WHERE user_id = ?1 AND closed_at IS NULL",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_shift).transpose()
    }

    /// Gets a shift by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Shift>> {
        let row = sqlx::query("SELECT * FROM shifts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_shift).transpose()
    }

    /// Closes an open shift, writing the counted and calculated cash.
    ///
    /// Fails with NotFound if the shift does not exist or is already
    /// closed; closed shifts are immutable.
    pub async fn close(
        &self,
        shift_id: &str,
        closed_at: DateTime<Utc>,
        closing_cash_cents: i64,
        calculated_cash_cents: i64,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE shifts SET
                closed_at = ?2,
                closing_cash_cents = ?3,
                calculated_cash_cents = ?4
            WHERE id = ?1 AND closed_at IS NULL
            "#,
        )
        .bind(shift_id)
        .bind(closed_at)
        .bind(closing_cash_cents)
        .bind(calculated_cash_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shift (open)", shift_id));
        }

        info!(id = %shift_id, closing = closing_cash_cents, "Shift closed");
        Ok(())
    }

    /// Lists all shifts, newest first.
    pub async fn list(&self) -> DbResult<Vec<Shift>> {
        let rows = sqlx::query("SELECT * FROM shifts ORDER BY opened_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::map_shift).collect()
    }

    /// The most recently closed shift.
    ///
    /// The open-shift screen pre-fills the opening count with yesterday's
    /// closing count.
    pub async fn find_last_closed(&self) -> DbResult<Option<Shift>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM shifts
            WHERE closed_at IS NOT NULL
            ORDER BY closed_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_shift).transpose()
    }

    // -------------------------------------------------------------------------
    // Expenses
    // -------------------------------------------------------------------------

    /// Records a drawer expense against a shift.
    pub async fn insert_expense(&self, expense: &Expense) -> DbResult<()> {
        debug!(shift = %expense.shift_id, amount = expense.amount_cents, "Recording expense");

        sqlx::query(
            r#"
            INSERT INTO expenses (id, shift_id, category, amount_cents, note, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.shift_id)
        .bind(&expense.category)
        .bind(expense.amount_cents)
        .bind(&expense.note)
        .bind(expense.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists a shift's expenses, oldest first.
    pub async fn expenses_for_shift(&self, shift_id: &str) -> DbResult<Vec<Expense>> {
        let rows = sqlx::query(
            "SELECT * FROM expenses WHERE shift_id = ?1 ORDER BY created_at",
        )
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::map_expense).collect()
    }

    /// Lists all expenses, newest first (admin history).
    pub async fn list_expenses(&self) -> DbResult<Vec<Expense>> {
        let rows = sqlx::query("SELECT * FROM expenses ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::map_expense).collect()
    }

    /// Sum of a shift's expenses.
    pub async fn expense_total_for_shift(&self, shift_id: &str) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses WHERE shift_id = ?1",
        )
        .bind(shift_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use uuid::Uuid;
    use velva_core::{Role, StaffUser};

    async fn seed_user(db: &Database) -> String {
        let now = Utc::now();
        let user = StaffUser {
            id: Uuid::new_v4().to_string(),
            name: "Cashier".to_string(),
            username: format!("u-{}", Uuid::new_v4()),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::Cashier,
            active: true,
            created_at: now,
            updated_at: now,
        };
        db.users().insert(&user).await.unwrap();
        user.id
    }

    fn shift(user_id: &str, opening_cash_cents: i64) -> Shift {
        Shift {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            opened_at: Utc::now(),
            closed_at: None,
            opening_cash_cents,
            closing_cash_cents: None,
            calculated_cash_cents: 0,
        }
    }

    #[tokio::test]
    async fn test_open_and_find() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user_id = seed_user(&db).await;

        assert!(db.shifts().find_open_by_user(&user_id).await.unwrap().is_none());

        let s = shift(&user_id, 20000);
        db.shifts().insert(&s).await.unwrap();

        let open = db.shifts().find_open_by_user(&user_id).await.unwrap().unwrap();
        assert_eq!(open.id, s.id);
        assert!(open.is_open());
    }

    #[tokio::test]
    async fn test_second_open_shift_violates_index() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user_id = seed_user(&db).await;

        db.shifts().insert(&shift(&user_id, 20000)).await.unwrap();
        let err = db.shifts().insert(&shift(&user_id, 5000)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_close_is_final() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user_id = seed_user(&db).await;
        let s = shift(&user_id, 20000);
        db.shifts().insert(&s).await.unwrap();

        db.shifts().close(&s.id, Utc::now(), 23000, 23000).await.unwrap();

        let closed = db.shifts().get_by_id(&s.id).await.unwrap().unwrap();
        assert!(!closed.is_open());
        assert_eq!(closed.closing_cash_cents, Some(23000));
        assert_eq!(closed.calculated_cash_cents, 23000);

        // Closing twice fails: closed shifts are immutable
        let err = db.shifts().close(&s.id, Utc::now(), 1, 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // And the user can open a fresh one now
        db.shifts().insert(&shift(&user_id, 23000)).await.unwrap();
        let last = db.shifts().find_last_closed().await.unwrap().unwrap();
        assert_eq!(last.id, s.id);
    }

    #[tokio::test]
    async fn test_expense_totals() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user_id = seed_user(&db).await;
        let s = shift(&user_id, 20000);
        db.shifts().insert(&s).await.unwrap();

        for (amount, category) in [(2000, "supplies"), (1500, "delivery")] {
            db.shifts()
                .insert_expense(&Expense {
                    id: Uuid::new_v4().to_string(),
                    shift_id: s.id.clone(),
                    category: category.to_string(),
                    amount_cents: amount,
                    note: String::new(),
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        assert_eq!(db.shifts().expense_total_for_shift(&s.id).await.unwrap(), 3500);
        assert_eq!(db.shifts().expenses_for_shift(&s.id).await.unwrap().len(), 2);
    }
}
