//! # Domain Types
//!
//! Core domain types used throughout Velva POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    MenuItem     │   │      Order      │   │     Shift       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name / name_ar │   │  status         │   │  user_id        │       │
//! │  │  price_cents    │   │  kitchen_status │   │  opening_cash   │       │
//! │  │  modifier_ids   │   │  total_cents    │   │  calculated_cash│       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   CafeTable     │   │   Reservation   │   │  CafeSettings   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  status         │   │  table_id       │   │  tax_rate_bps   │       │
//! │  │  order_id       │   │  status         │   │  service bps    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `OrderLine` freezes the menu item name, unit price, and selected
//! modifiers at add-to-cart time. Later menu edits never rewrite history.
//!
//! ## Bilingual Fields
//! The café runs an English/Arabic UI; every customer-facing name carries
//! a `name` / `name_ar` pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// Percentage rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000.
/// 1400 bps = 14% (the café's VAT); 1200 bps = 12% service charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Staff
// =============================================================================

/// Staff roles, from widest to narrowest access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access: settings, catalog, users, reports.
    Admin,
    /// Register operations: orders, shifts, reservations.
    Cashier,
    /// Kitchen display only: advances preparation status.
    Kitchen,
}

/// A staff account.
///
/// `password_hash` is an argon2 PHC string; the plaintext never leaves
/// the login call.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StaffUser {
    pub id: String,
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    /// Deactivated accounts keep their history but cannot log in.
    pub active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Menu Catalog
// =============================================================================

/// A menu category ("Hot Drinks", "Desserts").
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub name_ar: String,
}

/// An optional add-on with a price delta ("Extra Shot" +10, "No Sugar" 0).
///
/// The delta may be negative (e.g. "Small Cup" -5).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Modifier {
    pub id: String,
    pub name: String,
    pub name_ar: String,
    pub price_delta_cents: i64,
    pub active: bool,
}

impl Modifier {
    /// Returns the price delta as Money.
    #[inline]
    pub fn price_delta(&self) -> Money {
        Money::from_cents(self.price_delta_cents)
    }
}

/// A sellable menu item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub name_ar: String,
    pub category_id: String,
    /// Base price in minor units (>= 0); modifiers adjust per line.
    pub price_cents: i64,
    /// Inactive items stay referenced by past orders but leave the grid.
    pub active: bool,
    /// Modifiers this item may be ordered with.
    pub modifier_ids: Vec<String>,
}

impl MenuItem {
    /// Returns the base price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Where the order is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Takeaway,
    Table,
}

/// Payment-side lifecycle of an order.
///
/// `open → paid` and `open → cancelled`; both `paid` and `cancelled`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Saved to a table, still being edited/extended.
    Open,
    /// Fully settled; `closed_at` is set.
    Paid,
    /// Abandoned before payment.
    Cancelled,
}

impl OrderStatus {
    /// Paid and cancelled orders never change again.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }
}

/// Preparation-side lifecycle, independent of payment.
///
/// An order can be fully paid while the kitchen still shows `new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum KitchenStatus {
    New,
    Preparing,
    Ready,
}

impl KitchenStatus {
    /// Checks whether `next` is a legal forward move.
    ///
    /// Only `new → preparing → ready`, one hop at a time; there is no
    /// operation to revert (an admin override would be out of band).
    pub fn can_advance_to(&self, next: KitchenStatus) -> bool {
        matches!(
            (self, next),
            (KitchenStatus::New, KitchenStatus::Preparing)
                | (KitchenStatus::Preparing, KitchenStatus::Ready)
        )
    }
}

/// A frozen copy of a modifier as selected on one cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ModifierSnapshot {
    pub modifier_id: String,
    pub name: String,
    pub name_ar: String,
    pub price_delta_cents: i64,
}

impl ModifierSnapshot {
    /// Freezes a catalog modifier for attachment to a cart line.
    pub fn from_modifier(modifier: &Modifier) -> Self {
        ModifierSnapshot {
            modifier_id: modifier.id.clone(),
            name: modifier.name.clone(),
            name_ar: modifier.name_ar.clone(),
            price_delta_cents: modifier.price_delta_cents,
        }
    }
}

/// One line of a cart or order.
///
/// ## Invariant
/// The line total is ALWAYS `unit_price × quantity`, computed on demand
/// by [`OrderLine::line_total`]. It is deliberately not a field, so it
/// can never drift from the formula.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    /// Unique within its cart/order (UUID v4).
    pub id: String,
    pub menu_item_id: String,
    /// Name at time of adding (frozen).
    pub name: String,
    pub name_ar: String,
    /// Always >= 1; dropping below 1 removes the line instead.
    pub quantity: i64,
    /// Item price + selected modifier deltas, frozen at add time.
    /// Immune to later menu price changes.
    pub unit_price_cents: i64,
    /// Frozen modifier selection.
    pub modifiers: Vec<ModifierSnapshot>,
}

impl OrderLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Computes the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Checks whether this line carries the given menu item with exactly
    /// the given modifier selection (order-independent).
    ///
    /// Used by the cart to merge repeat picks into one line.
    pub fn matches_selection(&self, menu_item_id: &str, selection: &[ModifierSnapshot]) -> bool {
        if self.menu_item_id != menu_item_id || self.modifiers.len() != selection.len() {
            return false;
        }
        let mut mine: Vec<&str> = self.modifiers.iter().map(|m| m.modifier_id.as_str()).collect();
        let mut theirs: Vec<&str> = selection.iter().map(|m| m.modifier_id.as_str()).collect();
        mine.sort_unstable();
        theirs.sort_unstable();
        mine == theirs
    }
}

/// An order record.
///
/// Lines and payments live in their own store rows (`order_items`,
/// `payments`) and are fetched alongside the order.
///
/// ## Invariant
/// `total = subtotal − discount + service_charge + tax`, where service
/// charge and tax are computed off `(subtotal − discount)` and tax
/// compounds on top of the service charge. See [`crate::pricing`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub order_type: OrderType,
    /// Set iff `order_type` is `Table`.
    pub table_no: Option<i64>,
    pub status: OrderStatus,
    pub kitchen_status: KitchenStatus,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    /// Set when the order is paid.
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    /// The shift this order was rung up under.
    pub shift_id: String,
    pub subtotal_cents: i64,
    pub service_charge_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

impl Order {
    /// Short human-readable ticket code for displays ("#3fa9c1").
    ///
    /// Ids are UUIDs, so the first six hex chars stand in for the old
    /// numeric ticket counter.
    pub fn display_code(&self) -> String {
        format!("#{}", &self.id[..self.id.len().min(6)])
    }

    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Payments
// =============================================================================

/// How a payment was tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash; the only method that affects drawer reconciliation.
    Cash,
    Card,
    Mobile,
}

/// A payment towards an order.
/// An order can carry multiple payments for split tender.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub method: PaymentMethod,
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Shifts & Expenses
// =============================================================================

/// A cashier's bounded work session, bracketing an opening and closing
/// cash count.
///
/// ## Invariant
/// At most one shift per user may be open (`closed_at` = None) at a time.
/// Closed shifts are immutable.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Shift {
    pub id: String,
    pub user_id: String,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Cash counted into the drawer at open (>= 0).
    pub opening_cash_cents: i64,
    /// Cash counted at close; None while the shift is open.
    pub closing_cash_cents: Option<i64>,
    /// Expected cash derived at close:
    /// opening + cash payments − expenses. Zero while open.
    pub calculated_cash_cents: i64,
}

impl Shift {
    /// A shift is open until `closed_at` is written.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    /// Returns the opening cash as Money.
    #[inline]
    pub fn opening_cash(&self) -> Money {
        Money::from_cents(self.opening_cash_cents)
    }
}

/// Cash taken out of the drawer during a shift (milk run, courier tip).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Expense {
    pub id: String,
    pub shift_id: String,
    pub category: String,
    pub amount_cents: i64,
    pub note: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Returns the expense amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Tables
// =============================================================================

/// Occupancy state of a physical table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Available,
    Occupied,
}

/// A physical table on the floor.
///
/// ## Invariant
/// `status == Occupied ⟺ order_id` points to an order with status `open`.
/// The order lifecycle manager maintains this; the table row never
/// detects violations on its own.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CafeTable {
    pub id: String,
    pub number: i64,
    pub status: TableStatus,
    pub order_id: Option<String>,
}

impl CafeTable {
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.status == TableStatus::Occupied
    }
}

// =============================================================================
// Reservations
// =============================================================================

/// Reservation lifecycle.
///
/// Created `upcoming`; staff move it to `seated`, `completed`, or
/// `cancelled`. Nothing ever returns to `upcoming`, and `cancelled`
/// is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Upcoming,
    Seated,
    Completed,
    Cancelled,
}

/// A table booking.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reservation {
    pub id: String,
    pub table_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    #[ts(as = "String")]
    pub reservation_time: DateTime<Utc>,
    pub party_size: i64,
    pub status: ReservationStatus,
    pub notes: Option<String>,
}

// =============================================================================
// Settings
// =============================================================================

/// Global café configuration. Singleton record, admin-writable only.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CafeSettings {
    /// VAT in basis points (1400 = 14%).
    pub tax_rate_bps: u32,
    /// Service charge in basis points (1200 = 12%).
    pub service_charge_rate_bps: u32,
    /// ISO 4217 code ("EGP").
    pub currency_code: String,
    pub cafe_name: String,
    pub receipt_footer: String,
    pub receipt_footer_ar: String,
    pub logo_url: String,
    /// When true, a discount larger than the subtotal clamps the service
    /// charge and tax at zero instead of letting them go negative.
    pub clamp_negative_charges: bool,
}

impl CafeSettings {
    /// Returns the tax rate.
    #[inline]
    pub fn tax_rate(&self) -> Rate {
        Rate::from_bps(self.tax_rate_bps)
    }

    /// Returns the service charge rate.
    #[inline]
    pub fn service_charge_rate(&self) -> Rate {
        Rate::from_bps(self.service_charge_rate_bps)
    }
}

impl Default for CafeSettings {
    /// The seed configuration: 14% VAT, 12% service charge, EGP.
    fn default() -> Self {
        CafeSettings {
            tax_rate_bps: 1400,
            service_charge_rate_bps: 1200,
            currency_code: "EGP".to_string(),
            cafe_name: "Velva Café".to_string(),
            receipt_footer: "Thank you for visiting!".to_string(),
            receipt_footer_ar: "شكراً لزيارتكم!".to_string(),
            logo_url: String::new(),
            clamp_negative_charges: false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
