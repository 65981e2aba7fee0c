//! # Table Repository
//!
//! Database operations for floor tables.
//!
//! Occupancy changes that accompany an order write happen inside the
//! order repository's transactions; the standalone `occupy`/`release`
//! here exist for the table tracker and for repair tooling.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::{DbError, DbResult};
use velva_core::{CafeTable, TableStatus};

/// Repository for table operations.
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    /// Creates a new TableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    fn map_table(row: &SqliteRow) -> DbResult<CafeTable> {
        Ok(CafeTable {
            id: row.try_get("id")?,
            number: row.try_get("number")?,
            status: row.try_get::<TableStatus, _>("status")?,
            order_id: row.try_get("order_id")?,
        })
    }

    /// Inserts a table (seeding / floor reconfiguration).
    pub async fn insert(&self, table: &CafeTable) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO cafe_tables (id, number, status, order_id) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&table.id)
        .bind(table.number)
        .bind(table.status)
        .bind(&table.order_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Gets a table by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CafeTable>> {
        let row = sqlx::query("SELECT * FROM cafe_tables WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::map_table).transpose()
    }

    /// Finds the table currently bound to an order, if any.
    pub async fn find_by_order(&self, order_id: &str) -> DbResult<Option<CafeTable>> {
        let row = sqlx::query("SELECT * FROM cafe_tables WHERE order_id = ?1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::map_table).transpose()
    }

    /// Lists all tables by floor number.
    pub async fn list(&self) -> DbResult<Vec<CafeTable>> {
        let rows = sqlx::query("SELECT * FROM cafe_tables ORDER BY number")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::map_table).collect()
    }

    /// Marks a table occupied by an open order.
    pub async fn occupy(&self, table_id: &str, order_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE cafe_tables SET status = ?2, order_id = ?3 WHERE id = ?1",
        )
        .bind(table_id)
        .bind(TableStatus::Occupied)
        .bind(order_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Table", table_id));
        }
        Ok(())
    }

    /// Frees a table.
    pub async fn release(&self, table_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE cafe_tables SET status = ?2, order_id = NULL WHERE id = ?1",
        )
        .bind(table_id)
        .bind(TableStatus::Available)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Table", table_id));
        }
        Ok(())
    }

    /// Number of tables on the floor.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cafe_tables")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
