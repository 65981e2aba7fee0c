//! # Reservation Scheduler
//!
//! Books tables, guards the conflict window, and moves reservations
//! through their lifecycle.
//!
//! The window math lives in `velva_core::reservation`; this manager
//! fetches the candidate rows, runs the check, and only then writes.
//! A conflicting request is rejected before any store write.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::authorize;
use crate::error::{ServiceError, ServiceResult};
use crate::notify::NotificationHub;
use chrono::{DateTime, NaiveDate, Utc};
use velva_core::policy::Action;
use velva_core::validation::{validate_name, validate_party_size};
use velva_core::{reservation, Reservation, ReservationStatus, StaffUser};
use velva_db::Database;

/// A booking request as entered in the reservation form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub table_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub reservation_time: DateTime<Utc>,
    pub party_size: i64,
    pub notes: Option<String>,
}

/// Manager for table bookings.
#[derive(Debug, Clone)]
pub struct ReservationScheduler {
    db: Database,
    hub: NotificationHub,
}

impl ReservationScheduler {
    /// Creates a new ReservationScheduler.
    pub fn new(db: Database, hub: NotificationHub) -> Self {
        ReservationScheduler { db, hub }
    }

    async fn check_request(&self, request: &ReservationRequest) -> ServiceResult<()> {
        validate_name("customer name", &request.customer_name)?;
        validate_party_size(request.party_size)?;

        // The table must exist before we look for conflicts on it
        if self
            .db
            .tables()
            .get_by_id(&request.table_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("Table", &request.table_id));
        }
        Ok(())
    }

    /// Rejects the request when the table is already booked within the
    /// conflict window (exclude_id skips the reservation being edited).
    async fn ensure_no_conflict(
        &self,
        request: &ReservationRequest,
        exclude_id: Option<&str>,
    ) -> ServiceResult<()> {
        let existing = self
            .db
            .reservations()
            .list_for_table(&request.table_id)
            .await?;

        if let Some(blocking) = reservation::find_conflict(
            &existing,
            &request.table_id,
            request.reservation_time,
            exclude_id,
        ) {
            warn!(
                table = %request.table_id,
                requested = %request.reservation_time,
                blocking = %blocking.reservation_time,
                "Reservation conflict"
            );
            return Err(ServiceError::TableConflict {
                table_id: request.table_id.clone(),
            });
        }
        Ok(())
    }

    /// Books a table. New reservations start out `upcoming`.
    pub async fn create(
        &self,
        user: &StaffUser,
        request: ReservationRequest,
    ) -> ServiceResult<Reservation> {
        authorize(user, Action::ManageReservations)?;
        self.check_request(&request).await?;
        self.ensure_no_conflict(&request, None).await?;

        let reservation = Reservation {
            id: Uuid::new_v4().to_string(),
            table_id: request.table_id,
            customer_name: request.customer_name.trim().to_string(),
            customer_phone: request.customer_phone.trim().to_string(),
            reservation_time: request.reservation_time,
            party_size: request.party_size,
            status: ReservationStatus::Upcoming,
            notes: request.notes,
        };
        self.db.reservations().insert(&reservation).await?;

        info!(
            table = %reservation.table_id,
            time = %reservation.reservation_time,
            "Reservation created"
        );
        self.hub.success("Reservation added");
        Ok(reservation)
    }

    /// Edits a reservation's details.
    ///
    /// The reservation being edited is excluded from its own conflict
    /// check, so nudging a booking by a few minutes always works if the
    /// table is otherwise clear. The status is untouched.
    pub async fn update(
        &self,
        user: &StaffUser,
        reservation_id: &str,
        request: ReservationRequest,
    ) -> ServiceResult<Reservation> {
        authorize(user, Action::ManageReservations)?;
        self.check_request(&request).await?;

        let existing = self
            .db
            .reservations()
            .get_by_id(reservation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Reservation", reservation_id))?;

        self.ensure_no_conflict(&request, Some(reservation_id)).await?;

        let updated = Reservation {
            id: existing.id,
            table_id: request.table_id,
            customer_name: request.customer_name.trim().to_string(),
            customer_phone: request.customer_phone.trim().to_string(),
            reservation_time: request.reservation_time,
            party_size: request.party_size,
            status: existing.status,
            notes: request.notes,
        };
        self.db.reservations().update(&updated).await?;

        self.hub.success("Reservation updated");
        Ok(updated)
    }

    /// Moves a reservation to seated, completed, or cancelled.
    ///
    /// `upcoming` is never a legal target, and a cancelled reservation
    /// stays cancelled.
    pub async fn set_status(
        &self,
        user: &StaffUser,
        reservation_id: &str,
        status: ReservationStatus,
    ) -> ServiceResult<Reservation> {
        authorize(user, Action::ManageReservations)?;

        let existing = self
            .db
            .reservations()
            .get_by_id(reservation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Reservation", reservation_id))?;

        reservation::validate_status_transition(&existing, status)?;
        self.db.reservations().set_status(reservation_id, status).await?;

        info!(id = %reservation_id, status = ?status, "Reservation status changed");
        self.hub.success("Reservation updated");

        Ok(Reservation { status, ..existing })
    }

    /// Deletes a reservation outright (admin cleanup of stale rows).
    pub async fn delete(&self, user: &StaffUser, reservation_id: &str) -> ServiceResult<()> {
        authorize(user, Action::ManageReservations)?;
        self.db.reservations().delete(reservation_id).await?;
        Ok(())
    }

    /// The book for one day, soonest first. Read-only.
    pub async fn list_for_day(&self, day: NaiveDate) -> ServiceResult<Vec<Reservation>> {
        Ok(self.db.reservations().list_for_day(day).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use chrono::TimeZone;
    use velva_core::{CafeTable, Role, TableStatus};
    use velva_db::DbConfig;

    struct Fixture {
        scheduler: ReservationScheduler,
        cashier: StaffUser,
        cook: StaffUser,
        table_id: String,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        let cashier = StaffUser {
            id: Uuid::new_v4().to_string(),
            name: "Cashier".to_string(),
            username: "cashier".to_string(),
            password_hash: hash_password("pw").unwrap(),
            role: Role::Cashier,
            active: true,
            created_at: now,
            updated_at: now,
        };
        db.users().insert(&cashier).await.unwrap();

        let cook = StaffUser {
            id: Uuid::new_v4().to_string(),
            name: "Cook".to_string(),
            username: "cook".to_string(),
            password_hash: hash_password("pw").unwrap(),
            role: Role::Kitchen,
            active: true,
            created_at: now,
            updated_at: now,
        };
        db.users().insert(&cook).await.unwrap();

        let table = CafeTable {
            id: Uuid::new_v4().to_string(),
            number: 4,
            status: TableStatus::Available,
            order_id: None,
        };
        db.tables().insert(&table).await.unwrap();

        Fixture {
            scheduler: ReservationScheduler::new(db, NotificationHub::new()),
            cashier,
            cook,
            table_id: table.id,
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, h, m, 0).unwrap()
    }

    fn request(table_id: &str, time: DateTime<Utc>) -> ReservationRequest {
        ReservationRequest {
            table_id: table_id.to_string(),
            customer_name: "Nadia".to_string(),
            customer_phone: "0100000000".to_string(),
            reservation_time: time,
            party_size: 2,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_nineteen_thirty_rejected_twenty_hundred_accepted() {
        let f = fixture().await;

        // 18:00 booking goes in clean
        f.scheduler
            .create(&f.cashier, request(&f.table_id, at(18, 0)))
            .await
            .unwrap();

        // 19:30 on the same table: inside the window, rejected
        let err = f
            .scheduler
            .create(&f.cashier, request(&f.table_id, at(19, 30)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::TableConflict { .. }));

        // 20:00: exactly two hours apart, both stand
        f.scheduler
            .create(&f.cashier, request(&f.table_id, at(20, 0)))
            .await
            .unwrap();

        let day = f.scheduler.list_for_day(at(18, 0).date_naive()).await.unwrap();
        assert_eq!(day.len(), 2);
    }

    #[tokio::test]
    async fn test_edit_excludes_itself_from_the_conflict_check() {
        let f = fixture().await;
        let booked = f
            .scheduler
            .create(&f.cashier, request(&f.table_id, at(18, 0)))
            .await
            .unwrap();

        // Nudge the same booking by 15 minutes: fine
        let moved = f
            .scheduler
            .update(&f.cashier, &booked.id, request(&f.table_id, at(18, 15)))
            .await
            .unwrap();
        assert_eq!(moved.reservation_time, at(18, 15));
        assert_eq!(moved.status, ReservationStatus::Upcoming);
    }

    #[tokio::test]
    async fn test_cancelled_bookings_free_the_slot() {
        let f = fixture().await;
        let booked = f
            .scheduler
            .create(&f.cashier, request(&f.table_id, at(18, 0)))
            .await
            .unwrap();

        f.scheduler
            .set_status(&f.cashier, &booked.id, ReservationStatus::Cancelled)
            .await
            .unwrap();

        // The 18:30 slot opens up once the original booking is cancelled
        f.scheduler
            .create(&f.cashier, request(&f.table_id, at(18, 30)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_status_machine() {
        let f = fixture().await;
        let booked = f
            .scheduler
            .create(&f.cashier, request(&f.table_id, at(18, 0)))
            .await
            .unwrap();

        let seated = f
            .scheduler
            .set_status(&f.cashier, &booked.id, ReservationStatus::Seated)
            .await
            .unwrap();
        assert_eq!(seated.status, ReservationStatus::Seated);

        // No path back to upcoming
        let err = f
            .scheduler
            .set_status(&f.cashier, &booked.id, ReservationStatus::Upcoming)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(_)));

        // Cancelled is terminal
        f.scheduler
            .set_status(&f.cashier, &booked.id, ReservationStatus::Cancelled)
            .await
            .unwrap();
        let err = f
            .scheduler
            .set_status(&f.cashier, &booked.id, ReservationStatus::Seated)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(_)));
    }

    #[tokio::test]
    async fn test_kitchen_role_cannot_manage_reservations() {
        let f = fixture().await;
        let err = f
            .scheduler
            .create(&f.cook, request(&f.table_id, at(18, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_unknown_table_is_rejected_before_conflict_check() {
        let f = fixture().await;
        let err = f
            .scheduler
            .create(&f.cashier, request("no-such-table", at(18, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }
}
