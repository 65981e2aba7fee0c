//! # Shift Manager
//!
//! Opens and closes cash shifts, records drawer expenses, and derives
//! the reconciliation numbers.
//!
//! ## Close Flow
//! ```text
//! close_shift(user, counted cash)
//!      │
//!      ├── no open shift ──► NoActiveShift (nothing written)
//!      │
//!      ▼
//! calculated = opening + Σ cash payments − Σ expenses   (velva-core)
//!      │
//!      ▼
//! shifts.close(closed_at, counted, calculated)          (velva-db)
//!      │
//!      ▼
//! ShiftSummary { shift, variance: counted − calculated }
//! ```
//!
//! The variance is handed back for the cashier to acknowledge but is not
//! stored; the stored record keeps both counts so it can always be
//! re-derived.

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::authorize;
use crate::error::{ServiceError, ServiceResult};
use crate::notify::NotificationHub;
use velva_core::policy::Action;
use velva_core::validation::{validate_cash_amount, validate_expense_amount, validate_name};
use velva_core::{shift, Expense, Money, Shift, StaffUser};
use velva_db::Database;

/// What the cashier sees after closing: the stored shift plus the
/// over/short amount.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSummary {
    pub shift: Shift,
    /// closing − calculated; positive = drawer over, negative = short.
    pub variance_cents: i64,
}

/// Manager for the shift lifecycle.
#[derive(Debug, Clone)]
pub struct ShiftManager {
    db: Database,
    hub: NotificationHub,
}

impl ShiftManager {
    /// Creates a new ShiftManager.
    pub fn new(db: Database, hub: NotificationHub) -> Self {
        ShiftManager { db, hub }
    }

    /// Opens a shift with the counted opening cash.
    ///
    /// ## Idempotent by return
    /// If the user already has an open shift, that shift is returned
    /// unchanged — no duplicate is created and no error is raised.
    /// Re-tapping "open shift" after a UI hiccup is harmless.
    pub async fn open_shift(&self, user: &StaffUser, opening_cash: Money) -> ServiceResult<Shift> {
        authorize(user, Action::OpenShift)?;
        validate_cash_amount("opening cash", opening_cash)?;

        if let Some(existing) = self.db.shifts().find_open_by_user(&user.id).await? {
            return Ok(existing);
        }

        let shift = Shift {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            opened_at: Utc::now(),
            closed_at: None,
            opening_cash_cents: opening_cash.cents(),
            closing_cash_cents: None,
            calculated_cash_cents: 0,
        };
        self.db.shifts().insert(&shift).await?;

        info!(user = %user.username, opening = %opening_cash, "Shift opened");
        self.hub.success("Shift opened");
        Ok(shift)
    }

    /// Closes the user's open shift against the counted drawer.
    pub async fn close_shift(
        &self,
        user: &StaffUser,
        closing_cash: Money,
    ) -> ServiceResult<ShiftSummary> {
        authorize(user, Action::CloseShift)?;
        validate_cash_amount("closing cash", closing_cash)?;

        let open = self
            .db
            .shifts()
            .find_open_by_user(&user.id)
            .await?
            .ok_or(ServiceError::NoActiveShift)?;

        let cash_payments =
            Money::from_cents(self.db.orders().cash_total_for_shift(&open.id).await?);
        let expenses =
            Money::from_cents(self.db.shifts().expense_total_for_shift(&open.id).await?);
        let calculated = shift::calculated_cash(open.opening_cash(), cash_payments, expenses);

        let closed_at = Utc::now();
        self.db
            .shifts()
            .close(&open.id, closed_at, closing_cash.cents(), calculated.cents())
            .await?;

        let closed = self
            .db
            .shifts()
            .get_by_id(&open.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Shift", &open.id))?;

        let variance = shift::variance(closing_cash, calculated);
        info!(
            user = %user.username,
            calculated = %calculated,
            counted = %closing_cash,
            variance = %variance,
            "Shift closed"
        );
        self.hub.success("Shift closed");

        Ok(ShiftSummary {
            shift: closed,
            variance_cents: variance.cents(),
        })
    }

    /// The user's open shift, if any.
    pub async fn active_shift(&self, user_id: &str) -> ServiceResult<Option<Shift>> {
        Ok(self.db.shifts().find_open_by_user(user_id).await?)
    }

    /// Pre-fill for the open-shift screen: the last closed shift's
    /// closing count, which is normally what is still in the drawer.
    pub async fn suggested_opening_cash(&self) -> ServiceResult<Option<Money>> {
        let last = self.db.shifts().find_last_closed().await?;
        Ok(last
            .and_then(|s| s.closing_cash_cents)
            .map(Money::from_cents))
    }

    /// Records a drawer expense against the user's open shift.
    pub async fn record_expense(
        &self,
        user: &StaffUser,
        category: &str,
        amount: Money,
        note: &str,
    ) -> ServiceResult<Expense> {
        authorize(user, Action::RecordExpense)?;
        validate_name("category", category)?;
        validate_expense_amount(amount)?;

        let open = self
            .db
            .shifts()
            .find_open_by_user(&user.id)
            .await?
            .ok_or(ServiceError::NoActiveShift)?;

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            shift_id: open.id.clone(),
            category: category.trim().to_string(),
            amount_cents: amount.cents(),
            note: note.trim().to_string(),
            created_at: Utc::now(),
        };
        self.db.shifts().insert_expense(&expense).await?;

        info!(shift = %open.id, amount = %amount, category = %expense.category, "Expense recorded");
        Ok(expense)
    }

    /// Expense history, newest first (admin page).
    pub async fn expense_history(&self, user: &StaffUser) -> ServiceResult<Vec<Expense>> {
        authorize(user, Action::RecordExpense)?;
        Ok(self.db.shifts().list_expenses().await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use velva_core::{Role, ValidationError};
    use velva_db::DbConfig;

    async fn setup() -> (ShiftManager, Database, StaffUser) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let user = StaffUser {
            id: Uuid::new_v4().to_string(),
            name: "Cashier One".to_string(),
            username: "cashier".to_string(),
            password_hash: hash_password("pw").unwrap(),
            role: Role::Cashier,
            active: true,
            created_at: now,
            updated_at: now,
        };
        db.users().insert(&user).await.unwrap();
        let manager = ShiftManager::new(db.clone(), NotificationHub::new());
        (manager, db, user)
    }

    #[tokio::test]
    async fn test_open_shift_is_idempotent_by_return() {
        let (manager, _db, user) = setup().await;

        let first = manager.open_shift(&user, Money::from_cents(20000)).await.unwrap();
        // Second open returns the SAME shift, opening cash unchanged
        let second = manager.open_shift(&user, Money::from_cents(99999)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.opening_cash_cents, 20000);
    }

    #[tokio::test]
    async fn test_negative_opening_cash_rejected() {
        let (manager, _db, user) = setup().await;
        let err = manager.open_shift(&user, Money::from_cents(-1)).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(velva_core::CoreError::Validation(
                ValidationError::MustBeNonNegative { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn test_close_without_open_shift_rejected() {
        let (manager, _db, user) = setup().await;
        let err = manager.close_shift(&user, Money::zero()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NoActiveShift));
    }

    #[tokio::test]
    async fn test_close_reconciles_opening_cash_payments_and_expenses() {
        let (manager, db, user) = setup().await;

        // Opening 200.00
        let shift = manager.open_shift(&user, Money::from_cents(20000)).await.unwrap();

        // One cash payment of 50.00 on an order in this shift
        let now = Utc::now();
        let order = velva_core::Order {
            id: "o1".to_string(),
            order_type: velva_core::OrderType::Takeaway,
            table_no: None,
            status: velva_core::OrderStatus::Paid,
            kitchen_status: velva_core::KitchenStatus::New,
            opened_at: now,
            closed_at: Some(now),
            shift_id: shift.id.clone(),
            subtotal_cents: 5000,
            service_charge_cents: 0,
            tax_cents: 0,
            discount_cents: 0,
            total_cents: 5000,
        };
        let payment = velva_core::Payment {
            id: Uuid::new_v4().to_string(),
            order_id: "o1".to_string(),
            method: velva_core::PaymentMethod::Cash,
            amount_cents: 5000,
            paid_at: now,
        };
        db.orders()
            .create_paid_order(&order, &[], &[payment], None)
            .await
            .unwrap();

        // One expense of 20.00
        manager
            .record_expense(&user, "supplies", Money::from_cents(2000), "milk run")
            .await
            .unwrap();

        // Counted 231.50 → calculated 230.00, variance +1.50
        let summary = manager.close_shift(&user, Money::from_cents(23150)).await.unwrap();
        assert_eq!(summary.shift.calculated_cash_cents, 23000);
        assert_eq!(summary.shift.closing_cash_cents, Some(23150));
        assert_eq!(summary.variance_cents, 150);
        assert!(!summary.shift.is_open());

        // Closed means closed
        let err = manager.close_shift(&user, Money::zero()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NoActiveShift));
    }

    #[tokio::test]
    async fn test_expense_requires_open_shift() {
        let (manager, _db, user) = setup().await;
        let err = manager
            .record_expense(&user, "supplies", Money::from_cents(1000), "")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NoActiveShift));
    }

    #[tokio::test]
    async fn test_suggested_opening_cash_comes_from_last_close() {
        let (manager, _db, user) = setup().await;
        assert!(manager.suggested_opening_cash().await.unwrap().is_none());

        manager.open_shift(&user, Money::from_cents(20000)).await.unwrap();
        manager.close_shift(&user, Money::from_cents(21000)).await.unwrap();

        let suggested = manager.suggested_opening_cash().await.unwrap().unwrap();
        assert_eq!(suggested.cents(), 21000);
    }

    #[tokio::test]
    async fn test_kitchen_role_cannot_touch_shifts() {
        let (manager, db, _user) = setup().await;
        let now = Utc::now();
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

        let err = manager.open_shift(&cook, Money::zero()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized { .. }));
    }
}
