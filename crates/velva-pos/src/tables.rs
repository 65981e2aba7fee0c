//! # Table State Tracker
//!
//! Occupancy binding and the floor view.
//!
//! ## Invariant
//! `status == Occupied ⟺ order_id` points at an open order. The order
//! manager maintains this by carrying table updates inside its order
//! transactions; the standalone bind/unbind here serve the floor screen
//! and repair tooling, they do not re-verify the order side.

use serde::Serialize;

use crate::error::{ServiceError, ServiceResult};
use chrono::{DateTime, Utc};
use velva_core::{reservation, CafeTable, Reservation};
use velva_db::Database;

/// One tile on the floor view: the table plus its next booking today.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorTable {
    pub table: CafeTable,
    /// Soonest upcoming reservation today, for the corner badge on an
    /// available table.
    pub next_reservation: Option<Reservation>,
}

/// Tracker for table occupancy.
#[derive(Debug, Clone)]
pub struct TableTracker {
    db: Database,
}

impl TableTracker {
    /// Creates a new TableTracker.
    pub fn new(db: Database) -> Self {
        TableTracker { db }
    }

    /// Binds a table to an open order.
    pub async fn occupy(&self, table_id: &str, order_id: &str) -> ServiceResult<()> {
        self.db.tables().occupy(table_id, order_id).await?;
        Ok(())
    }

    /// Frees a table.
    pub async fn release(&self, table_id: &str) -> ServiceResult<()> {
        self.db.tables().release(table_id).await?;
        Ok(())
    }

    /// All tables by number.
    pub async fn list(&self) -> ServiceResult<Vec<CafeTable>> {
        Ok(self.db.tables().list().await?)
    }

    /// One table.
    pub async fn get(&self, table_id: &str) -> ServiceResult<CafeTable> {
        self.db
            .tables()
            .get_by_id(table_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Table", table_id))
    }

    /// The floor view: every table with its soonest upcoming reservation
    /// today. Read-only; polled by the register and tolerant of stale
    /// reads up to one poll interval.
    pub async fn floor_view(&self, now: DateTime<Utc>) -> ServiceResult<Vec<FloorTable>> {
        let tables = self.db.tables().list().await?;
        let reservations = self.db.reservations().list().await?;

        Ok(tables
            .into_iter()
            .map(|table| {
                let next = reservation::soonest_upcoming_today(&reservations, &table.id, now)
                    .cloned();
                FloorTable {
                    table,
                    next_reservation: next,
                }
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;
    use velva_core::{ReservationStatus, TableStatus};
    use velva_db::DbConfig;

    async fn setup() -> (TableTracker, Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let table = CafeTable {
            id: Uuid::new_v4().to_string(),
            number: 1,
            status: TableStatus::Available,
            order_id: None,
        };
        db.tables().insert(&table).await.unwrap();
        (TableTracker::new(db.clone()), db, table.id)
    }

    #[tokio::test]
    async fn test_floor_view_badges_the_next_booking() {
        let (tracker, db, table_id) = setup().await;
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 17, 0, 0).unwrap();

        for (id, hour, status) in [
            ("r-late", 20, ReservationStatus::Upcoming),
            ("r-soon", 18, ReservationStatus::Upcoming),
            ("r-cancelled", 17, ReservationStatus::Cancelled),
        ] {
            db.reservations()
                .insert(&Reservation {
                    id: id.to_string(),
                    table_id: table_id.clone(),
                    customer_name: "Nadia".to_string(),
                    customer_phone: "0100000000".to_string(),
                    reservation_time: Utc.with_ymd_and_hms(2026, 8, 6, hour, 30, 0).unwrap(),
                    party_size: 2,
                    status,
                    notes: None,
                })
                .await
                .unwrap();
        }

        let floor = tracker.floor_view(now).await.unwrap();
        assert_eq!(floor.len(), 1);
        let badge = floor[0].next_reservation.as_ref().unwrap();
        assert_eq!(badge.id, "r-soon");
    }

    #[tokio::test]
    async fn test_occupy_and_release() {
        let (tracker, db, table_id) = setup().await;

        // A real order row to satisfy the FK on cafe_tables.order_id
        let now = Utc::now();
        let user = velva_core::StaffUser {
            id: Uuid::new_v4().to_string(),
            name: "C".to_string(),
            username: "c".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: velva_core::Role::Cashier,
            active: true,
            created_at: now,
            updated_at: now,
        };
        db.users().insert(&user).await.unwrap();
        let shift = velva_core::Shift {
            id: Uuid::new_v4().to_string(),
            user_id: user.id,
            opened_at: now,
            closed_at: None,
            opening_cash_cents: 0,
            closing_cash_cents: None,
            calculated_cash_cents: 0,
        };
        db.shifts().insert(&shift).await.unwrap();
        let order = velva_core::Order {
            id: "o1".to_string(),
            order_type: velva_core::OrderType::Table,
            table_no: Some(1),
            status: velva_core::OrderStatus::Open,
            kitchen_status: velva_core::KitchenStatus::New,
            opened_at: now,
            closed_at: None,
            shift_id: shift.id,
            subtotal_cents: 0,
            service_charge_cents: 0,
            tax_cents: 0,
            discount_cents: 0,
            total_cents: 0,
        };
        db.orders().create_open_order(&order, &[], &table_id).await.unwrap();

        let table = tracker.get(&table_id).await.unwrap();
        assert!(table.is_occupied());

        tracker.release(&table_id).await.unwrap();
        let table = tracker.get(&table_id).await.unwrap();
        assert!(!table.is_occupied());
        assert_eq!(table.order_id, None);
    }
}
