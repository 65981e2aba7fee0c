//! # Reservation Repository
//!
//! Database operations for table bookings. Conflict detection itself is
//! pure logic in `velva_core::reservation`; this repository only hands
//! the scheduler the candidate rows.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use velva_core::{Reservation, ReservationStatus};

/// Repository for reservation operations.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    /// Creates a new ReservationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReservationRepository { pool }
    }

    fn map_reservation(row: &SqliteRow) -> DbResult<Reservation> {
        Ok(Reservation {
            id: row.try_get("id")?,
            table_id: row.try_get("table_id")?,
            customer_name: row.try_get("customer_name")?,
            customer_phone: row.try_get("customer_phone")?,
            reservation_time: row.try_get::<DateTime<Utc>, _>("reservation_time")?,
            party_size: row.try_get("party_size")?,
            status: row.try_get::<ReservationStatus, _>("status")?,
            notes: row.try_get("notes")?,
        })
    }

    /// Inserts a reservation.
    pub async fn insert(&self, reservation: &Reservation) -> DbResult<()> {
        debug!(id = %reservation.id, table = %reservation.table_id, "Inserting reservation");

        sqlx::query(
            r#"
            INSERT INTO reservations (
                id, table_id, customer_name, customer_phone,
                reservation_time, party_size, status, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&reservation.id)
        .bind(&reservation.table_id)
        .bind(&reservation.customer_name)
        .bind(&reservation.customer_phone)
        .bind(reservation.reservation_time)
        .bind(reservation.party_size)
        .bind(reservation.status)
        .bind(&reservation.notes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Updates a reservation's details and status.
    pub async fn update(&self, reservation: &Reservation) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE reservations SET
                table_id = ?2,
                customer_name = ?3,
                customer_phone = ?4,
                reservation_time = ?5,
                party_size = ?6,
                status = ?7,
                notes = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&reservation.id)
        .bind(&reservation.table_id)
        .bind(&reservation.customer_name)
        .bind(&reservation.customer_phone)
        .bind(reservation.reservation_time)
        .bind(reservation.party_size)
        .bind(reservation.status)
        .bind(&reservation.notes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reservation", &reservation.id));
        }
        Ok(())
    }

    /// Deletes a reservation outright (admin cleanup).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reservation", id));
        }
        Ok(())
    }

    /// Gets a reservation by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Reservation>> {
        let row = sqlx::query("SELECT * FROM reservations WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::map_reservation).transpose()
    }

    /// Writes only the status column.
    pub async fn set_status(&self, id: &str, status: ReservationStatus) -> DbResult<()> {
        let result = sqlx::query("UPDATE reservations SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reservation", id));
        }
        Ok(())
    }

    /// All reservations for one table, any status.
    ///
    /// Input set for the conflict check and the floor-view badge.
    pub async fn list_for_table(&self, table_id: &str) -> DbResult<Vec<Reservation>> {
        let rows = sqlx::query(
            "SELECT * FROM reservations WHERE table_id = ?1 ORDER BY reservation_time",
        )
        .bind(table_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::map_reservation).collect()
    }

    /// All reservations, soonest first.
    pub async fn list(&self) -> DbResult<Vec<Reservation>> {
        let rows = sqlx::query("SELECT * FROM reservations ORDER BY reservation_time")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::map_reservation).collect()
    }

    /// Reservations falling on one UTC calendar day (the book view).
    pub async fn list_for_day(&self, day: NaiveDate) -> DbResult<Vec<Reservation>> {
        let start = day.and_time(NaiveTime::MIN).and_utc();
        let end = start + chrono::Duration::days(1);

        let rows = sqlx::query(
            r#"
            SELECT * FROM reservations
            WHERE reservation_time >= ?1 AND reservation_time < ?2
            ORDER BY reservation_time
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::map_reservation).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::TimeZone;
    use uuid::Uuid;
    use velva_core::{CafeTable, TableStatus};

    async fn seed_table(db: &Database, number: i64) -> String {
        let table = CafeTable {
            id: Uuid::new_v4().to_string(),
            number,
            status: TableStatus::Available,
            order_id: None,
        };
        db.tables().insert(&table).await.unwrap();
        table.id
    }

    fn reservation(table_id: &str, time: DateTime<Utc>) -> Reservation {
        Reservation {
            id: Uuid::new_v4().to_string(),
            table_id: table_id.to_string(),
            customer_name: "Nadia".to_string(),
            customer_phone: "0100000000".to_string(),
            reservation_time: time,
            party_size: 2,
            status: ReservationStatus::Upcoming,
            notes: Some("window seat".to_string()),
        }
    }

    #[tokio::test]
    async fn test_round_trip_and_day_filter() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let table_id = seed_table(&db, 4).await;

        let tonight = Utc.with_ymd_and_hms(2026, 8, 6, 18, 0, 0).unwrap();
        let tomorrow = Utc.with_ymd_and_hms(2026, 8, 7, 18, 0, 0).unwrap();
        db.reservations().insert(&reservation(&table_id, tonight)).await.unwrap();
        db.reservations().insert(&reservation(&table_id, tomorrow)).await.unwrap();

        let today = db
            .reservations()
            .list_for_day(tonight.date_naive())
            .await
            .unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].reservation_time, tonight);
        assert_eq!(today[0].notes.as_deref(), Some("window seat"));

        assert_eq!(db.reservations().list_for_table(&table_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_set_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let table_id = seed_table(&db, 4).await;
        let r = reservation(&table_id, Utc::now());
        db.reservations().insert(&r).await.unwrap();

        db.reservations().set_status(&r.id, ReservationStatus::Seated).await.unwrap();
        let found = db.reservations().get_by_id(&r.id).await.unwrap().unwrap();
        assert_eq!(found.status, ReservationStatus::Seated);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let table_id = seed_table(&db, 4).await;
        let r = reservation(&table_id, Utc::now());
        db.reservations().insert(&r).await.unwrap();

        db.reservations().delete(&r.id).await.unwrap();
        assert!(db.reservations().get_by_id(&r.id).await.unwrap().is_none());
        assert!(matches!(
            db.reservations().delete(&r.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
