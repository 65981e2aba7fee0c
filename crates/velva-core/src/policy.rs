//! # Authorization Policy
//!
//! One explicit (role, action) → allow/deny table, consulted by every
//! service entry point. Replaces scattered per-screen redirects with a
//! single matrix that can be read — and tested — in one place.
//!
//! ```text
//! ┌───────────────────────┬───────┬─────────┬─────────┐
//! │ Action                │ Admin │ Cashier │ Kitchen │
//! ├───────────────────────┼───────┼─────────┼─────────┤
//! │ Open/close shift      │  ✓    │   ✓     │         │
//! │ Record expense        │  ✓    │   ✓     │         │
//! │ Place/save orders     │  ✓    │   ✓     │         │
//! │ Advance kitchen state │  ✓    │         │   ✓     │
//! │ Manage reservations   │  ✓    │   ✓     │         │
//! │ Manage catalog        │  ✓    │         │         │
//! │ Manage users          │  ✓    │         │         │
//! │ Update settings       │  ✓    │         │         │
//! │ View reports          │  ✓    │         │         │
//! └───────────────────────┴───────┴─────────┴─────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Role;

/// Everything a staff member can ask the system to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    OpenShift,
    CloseShift,
    RecordExpense,
    PlaceOrder,
    SaveOrderToTable,
    AdvanceKitchenStatus,
    ManageReservations,
    ManageCatalog,
    ManageUsers,
    UpdateSettings,
    ViewReports,
}

/// The authorization matrix.
///
/// Admin can do everything; cashiers run the register and the floor;
/// kitchen staff only advance preparation status.
pub fn is_allowed(role: Role, action: Action) -> bool {
    use Action::*;
    match (role, action) {
        (Role::Admin, _) => true,
        (
            Role::Cashier,
            OpenShift | CloseShift | RecordExpense | PlaceOrder | SaveOrderToTable
            | ManageReservations,
        ) => true,
        (Role::Kitchen, AdvanceKitchenStatus) => true,
        _ => false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_is_allowed_everything() {
        for action in [
            Action::OpenShift,
            Action::AdvanceKitchenStatus,
            Action::ManageUsers,
            Action::UpdateSettings,
            Action::ViewReports,
        ] {
            assert!(is_allowed(Role::Admin, action));
        }
    }

    #[test]
    fn test_cashier_runs_register_not_admin_screens() {
        assert!(is_allowed(Role::Cashier, Action::OpenShift));
        assert!(is_allowed(Role::Cashier, Action::PlaceOrder));
        assert!(is_allowed(Role::Cashier, Action::SaveOrderToTable));
        assert!(is_allowed(Role::Cashier, Action::ManageReservations));
        assert!(is_allowed(Role::Cashier, Action::RecordExpense));

        assert!(!is_allowed(Role::Cashier, Action::ManageCatalog));
        assert!(!is_allowed(Role::Cashier, Action::ManageUsers));
        assert!(!is_allowed(Role::Cashier, Action::UpdateSettings));
        assert!(!is_allowed(Role::Cashier, Action::ViewReports));
        assert!(!is_allowed(Role::Cashier, Action::AdvanceKitchenStatus));
    }

    #[test]
    fn test_kitchen_only_advances_status() {
        assert!(is_allowed(Role::Kitchen, Action::AdvanceKitchenStatus));

        assert!(!is_allowed(Role::Kitchen, Action::PlaceOrder));
        assert!(!is_allowed(Role::Kitchen, Action::OpenShift));
        assert!(!is_allowed(Role::Kitchen, Action::ManageReservations));
        assert!(!is_allowed(Role::Kitchen, Action::ViewReports));
    }
}
