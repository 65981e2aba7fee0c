//! # Shift Reconciliation Math
//!
//! Derives the expected cash-in-drawer for a shift.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Cash Drawer Reconciliation                              │
//! │                                                                         │
//! │  opening cash (counted at open)                 200.00                  │
//! │    + cash payments on the shift's orders       + 50.00                  │
//! │    − expenses paid out of the drawer           − 20.00                  │
//! │  ─────────────────────────────────────────────────────                  │
//! │  calculated cash (expected at close)            230.00                  │
//! │                                                                         │
//! │  variance = closing count − calculated cash                             │
//! │  (surfaced to the cashier, not stored)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Card and mobile payments never touch the drawer and are excluded.

use crate::money::Money;
use crate::types::{Expense, Payment, PaymentMethod};

/// Sums the cash-method payments out of a payment list.
pub fn cash_payments_total(payments: &[Payment]) -> Money {
    payments
        .iter()
        .filter(|p| p.method == PaymentMethod::Cash)
        .map(|p| p.amount())
        .sum()
}

/// Sums a list of drawer expenses.
pub fn expenses_total(expenses: &[Expense]) -> Money {
    expenses.iter().map(|e| e.amount()).sum()
}

/// Expected cash at close: opening + cash payments − expenses.
pub fn calculated_cash(opening: Money, cash_payments: Money, expenses: Money) -> Money {
    opening + cash_payments - expenses
}

/// Over/short against the counted drawer: closing − calculated.
///
/// Positive means the drawer is over; negative means short.
pub fn variance(closing: Money, calculated: Money) -> Money {
    closing - calculated
}

// =============================================================================
// Unit Tests
// =============================================================================
