//! # Order Manager
//!
//! The order lifecycle: placing paid orders, parking carts on tables,
//! resuming table orders for editing, and the kitchen's view of it all.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Order Lifecycle                                     │
//! │                                                                         │
//! │   TAKEAWAY:  cart ──place_order──► paid (closed_at set)                │
//! │                                                                         │
//! │   TABLE:     cart ──save_to_table──► open, table occupied              │
//! │                │                        │                               │
//! │                │     select_table ◄─────┘  (cart reloaded, edit mode)  │
//! │                │            │                                           │
//! │                │            ▼                                           │
//! │                └──place_order──► paid, closed_at set, TABLE FREED      │
//! │                                                                         │
//! │   KITCHEN (independent):  new ──► preparing ──► ready  (forward only)  │
//! │                                                                         │
//! │   Terminal: paid, cancelled. No operation reopens them.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Preconditions Before Any Write
//! Every mutation checks the role, the non-empty cart, and the active
//! shift BEFORE touching the store; the composite write itself is a
//! single transaction in the order repository.
//!
//! ## Payments Are Recorded, Not Reconciled
//! The payments handed to `place_order` are stored as given; nothing
//! checks that they sum to the order total. Register behavior relies on
//! the payment screen defaulting the tendered amount to the total.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::authorize;
use crate::error::{ServiceError, ServiceResult};
use crate::notify::NotificationHub;
use velva_core::policy::Action;
use velva_core::{
    CafeTable, Cart, CoreError, KitchenStatus, Money, Order, OrderLine, OrderStatus, OrderType,
    Payment, PaymentMethod, PricingRates, Shift, StaffUser,
};
use velva_db::Database;

/// A payment as entered on the payment screen; the manager stamps the
/// id, order id, and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    pub method: PaymentMethod,
    pub amount_cents: i64,
}

/// What the register gets back from tapping a table: either the parked
/// order reloaded into a cart for editing, or a fresh cart bound to the
/// table.
#[derive(Debug, Clone)]
pub struct TableSelection {
    pub table: CafeTable,
    pub cart: Cart,
    pub discount: Money,
    /// Set when the cart was reloaded from an open order (edit mode).
    pub editing_order_id: Option<String>,
}

/// One card on the kitchen display: the order plus its ticket lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KitchenTicket {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Manager for the order lifecycle.
#[derive(Debug, Clone)]
pub struct OrderManager {
    db: Database,
    hub: NotificationHub,
}

impl OrderManager {
    /// Creates a new OrderManager.
    pub fn new(db: Database, hub: NotificationHub) -> Self {
        OrderManager { db, hub }
    }

    /// The caller's open shift, or `NoActiveShift` — checked before any
    /// mutation so a rejected order leaves nothing behind.
    async fn require_active_shift(&self, user: &StaffUser) -> ServiceResult<Shift> {
        self.db
            .shifts()
            .find_open_by_user(&user.id)
            .await?
            .ok_or(ServiceError::NoActiveShift)
    }

    async fn pricing_rates(&self) -> ServiceResult<PricingRates> {
        let settings = self.db.settings().get().await?;
        Ok(PricingRates::from(&settings))
    }

    fn stamp_payments(order_id: &str, drafts: Vec<PaymentDraft>) -> Vec<Payment> {
        let now = Utc::now();
        drafts
            .into_iter()
            .map(|d| Payment {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.to_string(),
                method: d.method,
                amount_cents: d.amount_cents,
                paid_at: now,
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Placing (paying) an order
    // -------------------------------------------------------------------------

    /// Settles the cart as a paid order.
    ///
    /// ## Behavior
    /// - Requires an active shift; rejected with `NoActiveShift` before
    ///   any write otherwise
    /// - `editing_order_id` set: the parked table order is overwritten
    ///   with the cart's lines and the payments, flipped to paid, and its
    ///   table is freed
    /// - Otherwise a new paid order is created (kitchen status `new`,
    ///   `closed_at` = now); for table orders the table is freed
    ///   immediately on payment, whether or not it was tracked as
    ///   occupied
    pub async fn place_order(
        &self,
        user: &StaffUser,
        cart: &Cart,
        discount: Money,
        order_type: OrderType,
        table_id: Option<&str>,
        payments: Vec<PaymentDraft>,
        editing_order_id: Option<&str>,
    ) -> ServiceResult<Order> {
        authorize(user, Action::PlaceOrder)?;
        if cart.is_empty() {
            return Err(ServiceError::EmptyCart);
        }
        let shift = self.require_active_shift(user).await?;

        let rates = self.pricing_rates().await?;
        let totals = cart.totals(discount, &rates);
        let now = Utc::now();

        if let Some(order_id) = editing_order_id {
            let existing = self
                .db
                .orders()
                .get_by_id(order_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Order", order_id))?;
            if existing.status != OrderStatus::Open {
                return Err(CoreError::InvalidOrderStatus {
                    order_id: order_id.to_string(),
                    current_status: existing.status,
                }
                .into());
            }

            let bound_table = self.db.tables().find_by_order(order_id).await?;
            let stamped = Self::stamp_payments(order_id, payments);
            self.db
                .orders()
                .pay_existing_order(
                    order_id,
                    cart.lines(),
                    &stamped,
                    &totals,
                    now,
                    bound_table.as_ref().map(|t| t.id.as_str()),
                )
                .await?;

            let paid = self
                .db
                .orders()
                .get_by_id(order_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Order", order_id))?;

            info!(order = %paid.display_code(), total = %paid.total(), "Table order settled");
            self.hub.success("Order placed");
            return Ok(paid);
        }

        // Fresh order. For table orders, resolve the floor number and
        // free the table in the same transaction as the insert.
        let (table_no, release_table_id) = match (order_type, table_id) {
            (OrderType::Table, Some(id)) => {
                let table = self
                    .db
                    .tables()
                    .get_by_id(id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Table", id))?;
                (Some(table.number), Some(table.id))
            }
            _ => (None, None),
        };

        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_type,
            table_no,
            status: OrderStatus::Paid,
            kitchen_status: KitchenStatus::New,
            opened_at: now,
            closed_at: Some(now),
            shift_id: shift.id.clone(),
            subtotal_cents: totals.subtotal.cents(),
            service_charge_cents: totals.service_charge.cents(),
            tax_cents: totals.tax.cents(),
            discount_cents: totals.discount.cents(),
            total_cents: totals.total.cents(),
        };
        let stamped = Self::stamp_payments(&order.id, payments);

        self.db
            .orders()
            .create_paid_order(&order, cart.lines(), &stamped, release_table_id.as_deref())
            .await?;

        info!(order = %order.display_code(), total = %order.total(), "Order placed");
        self.hub.success("Order placed");
        Ok(order)
    }

    // -------------------------------------------------------------------------
    // Parking an order on a table
    // -------------------------------------------------------------------------

    /// Saves the cart to a table without taking payment.
    ///
    /// ## Behavior
    /// - New: creates an open order (kitchen status `new`, no
    ///   `closed_at`) and marks the table occupied, atomically
    /// - Editing: overwrites the parked order's lines and totals only;
    ///   status, kitchen status, and the table binding stay as they are
    pub async fn save_order_to_table(
        &self,
        user: &StaffUser,
        cart: &Cart,
        discount: Money,
        table_id: &str,
        editing_order_id: Option<&str>,
    ) -> ServiceResult<Order> {
        authorize(user, Action::SaveOrderToTable)?;
        if cart.is_empty() {
            return Err(ServiceError::EmptyCart);
        }
        let shift = self.require_active_shift(user).await?;

        let rates = self.pricing_rates().await?;
        let totals = cart.totals(discount, &rates);

        if let Some(order_id) = editing_order_id {
            self.db
                .orders()
                .update_open_order(order_id, cart.lines(), &totals)
                .await?;

            let order = self
                .db
                .orders()
                .get_by_id(order_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Order", order_id))?;

            debug!(order = %order.display_code(), "Table order updated");
            self.hub.success("Order saved to table");
            return Ok(order);
        }

        let table = self
            .db
            .tables()
            .get_by_id(table_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Table", table_id))?;

        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_type: OrderType::Table,
            table_no: Some(table.number),
            status: OrderStatus::Open,
            kitchen_status: KitchenStatus::New,
            opened_at: Utc::now(),
            closed_at: None,
            shift_id: shift.id.clone(),
            subtotal_cents: totals.subtotal.cents(),
            service_charge_cents: totals.service_charge.cents(),
            tax_cents: totals.tax.cents(),
            discount_cents: totals.discount.cents(),
            total_cents: totals.total.cents(),
        };

        self.db
            .orders()
            .create_open_order(&order, cart.lines(), &table.id)
            .await?;

        info!(order = %order.display_code(), table = table.number, "Order saved to table");
        self.hub.success("Order saved to table");
        Ok(order)
    }

    /// Taps a table on the floor view.
    ///
    /// An occupied table loads its open order back into a cart in edit
    /// mode; a free table yields an empty cart bound to it. Read-only.
    pub async fn select_table(&self, table_id: &str) -> ServiceResult<TableSelection> {
        let table = self
            .db
            .tables()
            .get_by_id(table_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Table", table_id))?;

        if table.is_occupied() {
            if let Some(order_id) = table.order_id.clone() {
                if let Some(order) = self.db.orders().get_by_id(&order_id).await? {
                    if order.status == OrderStatus::Open {
                        let lines = self.db.orders().get_lines(&order_id).await?;
                        return Ok(TableSelection {
                            table,
                            cart: Cart::from_lines(lines),
                            discount: Money::from_cents(order.discount_cents),
                            editing_order_id: Some(order_id),
                        });
                    }
                }
            }
        }

        Ok(TableSelection {
            table,
            cart: Cart::new(),
            discount: Money::zero(),
            editing_order_id: None,
        })
    }

    // -------------------------------------------------------------------------
    // Kitchen
    // -------------------------------------------------------------------------

    /// Advances an order's kitchen status one step forward.
    ///
    /// `new → preparing → ready` only; anything else is rejected with
    /// `KitchenStatusRegression`. There is no revert operation.
    pub async fn advance_kitchen_status(
        &self,
        user: &StaffUser,
        order_id: &str,
        next: KitchenStatus,
    ) -> ServiceResult<Order> {
        authorize(user, Action::AdvanceKitchenStatus)?;

        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", order_id))?;

        if !order.kitchen_status.can_advance_to(next) {
            return Err(CoreError::KitchenStatusRegression {
                from: order.kitchen_status,
                to: next,
            }
            .into());
        }

        self.db.orders().set_kitchen_status(order_id, next).await?;
        info!(order = %order.display_code(), status = ?next, "Kitchen status advanced");

        let updated = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", order_id))?;
        Ok(updated)
    }

    /// The kitchen queue with ticket lines, oldest first.
    ///
    /// Read-only; the display polls this and tolerates reads up to one
    /// poll interval stale.
    pub async fn kitchen_queue(&self) -> ServiceResult<Vec<KitchenTicket>> {
        let orders = self.db.orders().kitchen_queue().await?;
        let mut tickets = Vec::with_capacity(orders.len());
        for order in orders {
            let lines = self.db.orders().get_lines(&order.id).await?;
            tickets.push(KitchenTicket { order, lines });
        }
        Ok(tickets)
    }

    /// The last few finished tickets, newest first.
    pub async fn recently_ready(&self, limit: i64) -> ServiceResult<Vec<Order>> {
        Ok(self.db.orders().recently_ready(limit).await?)
    }

    /// Full order details (receipt view).
    pub async fn order_details(
        &self,
        order_id: &str,
    ) -> ServiceResult<(Order, Vec<OrderLine>, Vec<Payment>)> {
        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", order_id))?;
        let lines = self.db.orders().get_lines(order_id).await?;
        let payments = self.db.orders().get_payments(order_id).await?;
        Ok((order, lines, payments))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
