//! # Reservation Rules
//!
//! Conflict detection and status transitions for table bookings.
//!
//! ## The Conflict Window
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   Table 4:      18:00 booking                                           │
//! │                                                                         │
//! │   ──────────────────┬───────────────────┬──────────────────────────►    │
//! │                   18:00               20:00                             │
//! │        ◄── blocked ──►│◄── blocked ──►                                  │
//! │                                                                         │
//! │   A new booking conflicts when |X − Y| < 1h59min.                       │
//! │                                                                         │
//! │   The window is one minute SHORT of two hours so that back-to-back     │
//! │   bookings exactly two hours apart (18:00 → 20:00) are both accepted,  │
//! │   while 18:00 → 19:30 is still rejected.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The check is symmetric and only looks at non-cancelled reservations on
//! the same table; a reservation being edited never conflicts with itself.

use chrono::{DateTime, Duration, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::{Reservation, ReservationStatus};

/// Length of the conflict window: two hours minus one minute.
pub fn conflict_window() -> Duration {
    Duration::minutes(2 * 60 - 1)
}

/// Checks whether two reservation times collide on the same table.
///
/// Strict `<`: a gap of exactly 119 minutes is already out of the window.
pub fn times_conflict(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    let delta = a.signed_duration_since(b);
    let delta = if delta < Duration::zero() { -delta } else { delta };
    delta < conflict_window()
}

/// Finds the first existing reservation that blocks a booking for
/// `table_id` at `time`.
///
/// ## Rules
/// - Only the same table can conflict
/// - Cancelled reservations never block
/// - `exclude_id` (the reservation being edited) is skipped, so an edit
///   never collides with its own previous slot
pub fn find_conflict<'a>(
    existing: &'a [Reservation],
    table_id: &str,
    time: DateTime<Utc>,
    exclude_id: Option<&str>,
) -> Option<&'a Reservation> {
    existing.iter().find(|r| {
        r.table_id == table_id
            && r.status != ReservationStatus::Cancelled
            && exclude_id != Some(r.id.as_str())
            && times_conflict(time, r.reservation_time)
    })
}

/// Returns the soonest upcoming reservation for a table today.
///
/// Used by the floor view to badge available tables. Filters to
/// status `upcoming`, the same calendar day as `now`, and strictly
/// future times; picks the earliest.
pub fn soonest_upcoming_today<'a>(
    reservations: &'a [Reservation],
    table_id: &str,
    now: DateTime<Utc>,
) -> Option<&'a Reservation> {
    reservations
        .iter()
        .filter(|r| {
            r.table_id == table_id
                && r.status == ReservationStatus::Upcoming
                && r.reservation_time.date_naive() == now.date_naive()
                && r.reservation_time > now
        })
        .min_by_key(|r| r.reservation_time)
}

/// Validates a staff-requested status change.
///
/// ## Rules
/// - `upcoming` is never a legal target; nothing un-seats or un-cancels
///   back into the book
/// - A cancelled reservation admits no further transitions
/// - Everything else (seated, completed, cancelled) is a free move
pub fn validate_status_transition(
    reservation: &Reservation,
    next: ReservationStatus,
) -> CoreResult<()> {
    if next == ReservationStatus::Upcoming {
        return Err(CoreError::ReservationRevertsToUpcoming);
    }
    if reservation.status == ReservationStatus::Cancelled {
        return Err(CoreError::ReservationCancelled(reservation.id.clone()));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
