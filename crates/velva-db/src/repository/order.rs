//! # Order Repository
//!
//! Database operations for orders, their lines, payments, and the table
//! binding that travels with them.
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every composite write is ONE transaction:                              │
//! │                                                                         │
//! │  create_paid_order   = order + lines + payments (+ table release)      │
//! │  pay_existing_order  = totals + lines + payments + status (+ release)  │
//! │  create_open_order   = order + lines + table occupation                │
//! │  update_open_order   = lines + totals                                  │
//! │                                                                         │
//! │  Either all rows land or none do. A paid order with a still-occupied   │
//! │  table can never be observed.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Columns
//! `order_items.modifiers` holds the frozen modifier snapshots as JSON;
//! line totals are recomputed from `unit_price_cents × quantity` on read
//! and never stored.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use velva_core::{
    KitchenStatus, Order, OrderLine, OrderStatus, OrderTotals, OrderType, Payment, PaymentMethod,
    TableStatus,
};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Row mapping
    // -------------------------------------------------------------------------

    fn map_order(row: &SqliteRow) -> DbResult<Order> {
        Ok(Order {
            id: row.try_get("id")?,
            order_type: row.try_get::<OrderType, _>("order_type")?,
            table_no: row.try_get("table_no")?,
            status: row.try_get::<OrderStatus, _>("status")?,
            kitchen_status: row.try_get::<KitchenStatus, _>("kitchen_status")?,
            opened_at: row.try_get::<DateTime<Utc>, _>("opened_at")?,
            closed_at: row.try_get::<Option<DateTime<Utc>>, _>("closed_at")?,
            shift_id: row.try_get("shift_id")?,
            subtotal_cents: row.try_get("subtotal_cents")?,
            service_charge_cents: row.try_get("service_charge_cents")?,
            tax_cents: row.try_get("tax_cents")?,
            discount_cents: row.try_get("discount_cents")?,
            total_cents: row.try_get("total_cents")?,
        })
    }

    fn map_line(row: &SqliteRow) -> DbResult<OrderLine> {
        let modifiers_json: String = row.try_get("modifiers")?;
        let modifiers = serde_json::from_str(&modifiers_json)
            .map_err(|e| DbError::corrupt_column("modifiers", e))?;

        Ok(OrderLine {
            id: row.try_get("id")?,
            menu_item_id: row.try_get("menu_item_id")?,
            name: row.try_get("name")?,
            name_ar: row.try_get("name_ar")?,
            quantity: row.try_get("quantity")?,
            unit_price_cents: row.try_get("unit_price_cents")?,
            modifiers,
        })
    }

    fn map_payment(row: &SqliteRow) -> DbResult<Payment> {
        Ok(Payment {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            method: row.try_get::<PaymentMethod, _>("method")?,
            amount_cents: row.try_get("amount_cents")?,
            paid_at: row.try_get::<DateTime<Utc>, _>("paid_at")?,
        })
    }

    // -------------------------------------------------------------------------
    // Transaction building blocks
    // -------------------------------------------------------------------------

    async fn insert_order_tx(tx: &mut Transaction<'_, Sqlite>, order: &Order) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_type, table_no, status, kitchen_status,
                opened_at, closed_at, shift_id,
                subtotal_cents, service_charge_cents, tax_cents,
                discount_cents, total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&order.id)
        .bind(order.order_type)
        .bind(order.table_no)
        .bind(order.status)
        .bind(order.kitchen_status)
        .bind(order.opened_at)
        .bind(order.closed_at)
        .bind(&order.shift_id)
        .bind(order.subtotal_cents)
        .bind(order.service_charge_cents)
        .bind(order.tax_cents)
        .bind(order.discount_cents)
        .bind(order.total_cents)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Replaces the full line set of an order, preserving cart order via
    /// the position column.
    async fn replace_lines_tx(
        tx: &mut Transaction<'_, Sqlite>,
        order_id: &str,
        lines: &[OrderLine],
    ) -> DbResult<()> {
        sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
            .bind(order_id)
            .execute(&mut **tx)
            .await?;

        for (position, line) in lines.iter().enumerate() {
            let modifiers = serde_json::to_string(&line.modifiers)
                .map_err(|e| DbError::Internal(e.to_string()))?;

            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, menu_item_id, name, name_ar,
                    quantity, unit_price_cents, modifiers, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&line.id)
            .bind(order_id)
            .bind(&line.menu_item_id)
            .bind(&line.name)
            .bind(&line.name_ar)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(modifiers)
            .bind(position as i64)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn replace_payments_tx(
        tx: &mut Transaction<'_, Sqlite>,
        order_id: &str,
        payments: &[Payment],
    ) -> DbResult<()> {
        sqlx::query("DELETE FROM payments WHERE order_id = ?1")
            .bind(order_id)
            .execute(&mut **tx)
            .await?;

        for payment in payments {
            sqlx::query(
                r#"
                INSERT INTO payments (id, order_id, method, amount_cents, paid_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&payment.id)
            .bind(order_id)
            .bind(payment.method)
            .bind(payment.amount_cents)
            .bind(payment.paid_at)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn release_table_tx(tx: &mut Transaction<'_, Sqlite>, table_id: &str) -> DbResult<()> {
        sqlx::query(
            "UPDATE cafe_tables SET status = ?2, order_id = NULL WHERE id = ?1",
        )
        .bind(table_id)
        .bind(TableStatus::Available)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn occupy_table_tx(
        tx: &mut Transaction<'_, Sqlite>,
        table_id: &str,
        order_id: &str,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE cafe_tables SET status = ?2, order_id = ?3 WHERE id = ?1",
        )
        .bind(table_id)
        .bind(TableStatus::Occupied)
        .bind(order_id)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Table", table_id));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Composite writes
    // -------------------------------------------------------------------------

    /// Inserts a brand-new paid order with its lines and payments;
    /// releases the table in the same transaction when one is given.
    pub async fn create_paid_order(
        &self,
        order: &Order,
        lines: &[OrderLine],
        payments: &[Payment],
        release_table_id: Option<&str>,
    ) -> DbResult<()> {
        debug!(id = %order.id, total = order.total_cents, "Creating paid order");

        let mut tx = self.pool.begin().await?;
        Self::insert_order_tx(&mut tx, order).await?;
        Self::replace_lines_tx(&mut tx, &order.id, lines).await?;
        Self::replace_payments_tx(&mut tx, &order.id, payments).await?;
        if let Some(table_id) = release_table_id {
            Self::release_table_tx(&mut tx, table_id).await?;
        }
        tx.commit().await?;

        info!(id = %order.id, total = order.total_cents, "Order paid");
        Ok(())
    }

    /// Settles an existing open order: overwrites lines and payments,
    /// writes the new totals, flips status to paid, stamps `closed_at`,
    /// and releases the table — all in one transaction.
    ///
    /// Fails with NotFound if the order is no longer open.
    pub async fn pay_existing_order(
        &self,
        order_id: &str,
        lines: &[OrderLine],
        payments: &[Payment],
        totals: &OrderTotals,
        closed_at: DateTime<Utc>,
        release_table_id: Option<&str>,
    ) -> DbResult<()> {
        debug!(id = %order_id, "Settling existing table order");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = ?2,
                closed_at = ?3,
                subtotal_cents = ?4,
                service_charge_cents = ?5,
                tax_cents = ?6,
                discount_cents = ?7,
                total_cents = ?8
            WHERE id = ?1 AND status = ?9
            "#,
        )
        .bind(order_id)
        .bind(OrderStatus::Paid)
        .bind(closed_at)
        .bind(totals.subtotal.cents())
        .bind(totals.service_charge.cents())
        .bind(totals.tax.cents())
        .bind(totals.discount.cents())
        .bind(totals.total.cents())
        .bind(OrderStatus::Open)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (open)", order_id));
        }

        Self::replace_lines_tx(&mut tx, order_id, lines).await?;
        Self::replace_payments_tx(&mut tx, order_id, payments).await?;
        if let Some(table_id) = release_table_id {
            Self::release_table_tx(&mut tx, table_id).await?;
        }
        tx.commit().await?;

        info!(id = %order_id, "Order paid");
        Ok(())
    }

    /// Inserts a new open order and binds its table as occupied, in one
    /// transaction.
    pub async fn create_open_order(
        &self,
        order: &Order,
        lines: &[OrderLine],
        occupy_table_id: &str,
    ) -> DbResult<()> {
        debug!(id = %order.id, table = %occupy_table_id, "Saving order to table");

        let mut tx = self.pool.begin().await?;
        Self::insert_order_tx(&mut tx, order).await?;
        Self::replace_lines_tx(&mut tx, &order.id, lines).await?;
        Self::occupy_table_tx(&mut tx, occupy_table_id, &order.id).await?;
        tx.commit().await?;

        info!(id = %order.id, table = %occupy_table_id, "Order saved to table");
        Ok(())
    }

    /// Overwrites the lines and totals of an open order; status, kitchen
    /// status, and table binding stay untouched.
    pub async fn update_open_order(
        &self,
        order_id: &str,
        lines: &[OrderLine],
        totals: &OrderTotals,
    ) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                subtotal_cents = ?2,
                service_charge_cents = ?3,
                tax_cents = ?4,
                discount_cents = ?5,
                total_cents = ?6
            WHERE id = ?1 AND status = ?7
            "#,
        )
        .bind(order_id)
        .bind(totals.subtotal.cents())
        .bind(totals.service_charge.cents())
        .bind(totals.tax.cents())
        .bind(totals.discount.cents())
        .bind(totals.total.cents())
        .bind(OrderStatus::Open)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (open)", order_id));
        }

        Self::replace_lines_tx(&mut tx, order_id, lines).await?;
        tx.commit().await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Gets an order by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::map_order).transpose()
    }

    /// Gets all lines of an order, in ticket order.
    pub async fn get_lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let rows = sqlx::query(
            "SELECT * FROM order_items WHERE order_id = ?1 ORDER BY position",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::map_line).collect()
    }

    /// Gets all payments of an order.
    pub async fn get_payments(&self, order_id: &str) -> DbResult<Vec<Payment>> {
        let rows = sqlx::query(
            "SELECT * FROM payments WHERE order_id = ?1 ORDER BY paid_at",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::map_payment).collect()
    }

    /// Lists all orders rung up under a shift.
    pub async fn list_by_shift(&self, shift_id: &str) -> DbResult<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT * FROM orders WHERE shift_id = ?1 ORDER BY opened_at",
        )
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::map_order).collect()
    }

    /// Lists every order (reporting).
    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let rows = sqlx::query("SELECT * FROM orders ORDER BY opened_at")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::map_order).collect()
    }

    /// Lists every order line in the store (reporting).
    pub async fn list_all_lines(&self) -> DbResult<Vec<OrderLine>> {
        let rows = sqlx::query("SELECT * FROM order_items ORDER BY order_id, position")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::map_line).collect()
    }

    /// Total cash tendered across a shift's orders.
    ///
    /// Card/mobile payments are excluded; only cash lands in the drawer.
    pub async fn cash_total_for_shift(&self, shift_id: &str) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(p.amount_cents), 0)
            FROM payments p
            JOIN orders o ON o.id = p.order_id
            WHERE o.shift_id = ?1 AND p.method = ?2
            "#,
        )
        .bind(shift_id)
        .bind(PaymentMethod::Cash)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    // -------------------------------------------------------------------------
    // Kitchen display
    // -------------------------------------------------------------------------

    /// The kitchen queue: everything not yet ready and not cancelled,
    /// oldest first.
    ///
    /// Payment status is irrelevant here; a paid takeaway still needs
    /// to be made.
    pub async fn kitchen_queue(&self) -> DbResult<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM orders
            WHERE kitchen_status != ?1 AND status != ?2
            ORDER BY opened_at
            "#,
        )
        .bind(KitchenStatus::Ready)
        .bind(OrderStatus::Cancelled)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::map_order).collect()
    }

    /// The most recently finished tickets, newest first.
    pub async fn recently_ready(&self, limit: i64) -> DbResult<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM orders
            WHERE kitchen_status = ?1
            ORDER BY opened_at DESC
            LIMIT ?2
            "#,
        )
        .bind(KitchenStatus::Ready)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::map_order).collect()
    }

    /// Writes a new kitchen status.
    ///
    /// The forward-only rule is enforced by the order manager before
    /// calling this.
    pub async fn set_kitchen_status(
        &self,
        order_id: &str,
        status: KitchenStatus,
    ) -> DbResult<()> {
        let result = sqlx::query("UPDATE orders SET kitchen_status = ?2 WHERE id = ?1")
            .bind(order_id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use uuid::Uuid;
    use velva_core::{CafeTable, ModifierSnapshot, Money, Role, Shift, StaffUser};

    async fn seed_shift(db: &Database) -> String {
        let now = Utc::now();
        let user = StaffUser {
            id: Uuid::new_v4().to_string(),
            name: "Cashier".to_string(),
            username: format!("u-{}", Uuid::new_v4()),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::Cashier,
            active: true,
            created_at: now,
            updated_at: now,
        };
        db.users().insert(&user).await.unwrap();

        let shift = Shift {
            id: Uuid::new_v4().to_string(),
            user_id: user.id,
            opened_at: now,
            closed_at: None,
            opening_cash_cents: 20000,
            closing_cash_cents: None,
            calculated_cash_cents: 0,
        };
        db.shifts().insert(&shift).await.unwrap();
        shift.id
    }

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

    fn line(menu_item_id: &str, quantity: i64, unit_price_cents: i64) -> OrderLine {
        OrderLine {
            id: Uuid::new_v4().to_string(),
            menu_item_id: menu_item_id.to_string(),
            name: menu_item_id.to_string(),
            name_ar: menu_item_id.to_string(),
            quantity,
            unit_price_cents,
            modifiers: vec![ModifierSnapshot {
                modifier_id: "shot".to_string(),
                name: "Extra Shot".to_string(),
                name_ar: "شوت إضافي".to_string(),
                price_delta_cents: 1000,
            }],
        }
    }

    fn order(id: &str, shift_id: &str, status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id: id.to_string(),
            order_type: OrderType::Takeaway,
            table_no: None,
            status,
            kitchen_status: KitchenStatus::New,
            opened_at: now,
            closed_at: if status == OrderStatus::Paid { Some(now) } else { None },
            shift_id: shift_id.to_string(),
            subtotal_cents: 4500,
            service_charge_cents: 540,
            tax_cents: 706,
            discount_cents: 0,
            total_cents: 5746,
        }
    }

    fn payment(order_id: &str, method: PaymentMethod, amount_cents: i64) -> Payment {
        Payment {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            method,
            amount_cents,
            paid_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_paid_order_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shift_id = seed_shift(&db).await;

        let o = order("o1", &shift_id, OrderStatus::Paid);
        let lines = vec![line("latte", 2, 4500)];
        let payments = vec![payment("o1", PaymentMethod::Cash, 5746)];

        db.orders()
            .create_paid_order(&o, &lines, &payments, None)
            .await
            .unwrap();

        let fetched = db.orders().get_by_id("o1").await.unwrap().unwrap();
        assert_eq!(fetched.status, OrderStatus::Paid);
        assert_eq!(fetched.total_cents, 5746);
        assert!(fetched.closed_at.is_some());

        let fetched_lines = db.orders().get_lines("o1").await.unwrap();
        assert_eq!(fetched_lines.len(), 1);
        assert_eq!(fetched_lines[0].modifiers[0].modifier_id, "shot");
        assert_eq!(fetched_lines[0].line_total().cents(), 9000);

        let fetched_payments = db.orders().get_payments("o1").await.unwrap();
        assert_eq!(fetched_payments.len(), 1);
        assert_eq!(fetched_payments[0].method, PaymentMethod::Cash);
    }

    #[tokio::test]
    async fn test_open_order_occupies_and_payment_releases_table() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shift_id = seed_shift(&db).await;
        let table_id = seed_table(&db, 4).await;

        let mut o = order("o1", &shift_id, OrderStatus::Open);
        o.order_type = OrderType::Table;
        o.table_no = Some(4);
        let lines = vec![line("latte", 1, 4500)];

        db.orders().create_open_order(&o, &lines, &table_id).await.unwrap();

        let table = db.tables().get_by_id(&table_id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Occupied);
        assert_eq!(table.order_id.as_deref(), Some("o1"));

        let totals = OrderTotals {
            subtotal: Money::from_cents(4500),
            service_charge: Money::from_cents(540),
            tax: Money::from_cents(706),
            discount: Money::zero(),
            total: Money::from_cents(5746),
        };
        db.orders()
            .pay_existing_order(
                "o1",
                &lines,
                &[payment("o1", PaymentMethod::Card, 5746)],
                &totals,
                Utc::now(),
                Some(&table_id),
            )
            .await
            .unwrap();

        let paid = db.orders().get_by_id("o1").await.unwrap().unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);

        let table = db.tables().get_by_id(&table_id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Available);
        assert_eq!(table.order_id, None);

        // Settling it twice must fail: the order is no longer open
        let err = db
            .orders()
            .pay_existing_order("o1", &lines, &[], &totals, Utc::now(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cash_total_for_shift_ignores_card_and_mobile() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shift_id = seed_shift(&db).await;

        let o1 = order("o1", &shift_id, OrderStatus::Paid);
        db.orders()
            .create_paid_order(
                &o1,
                &[line("a", 1, 5000)],
                &[payment("o1", PaymentMethod::Cash, 5000)],
                None,
            )
            .await
            .unwrap();

        let o2 = order("o2", &shift_id, OrderStatus::Paid);
        db.orders()
            .create_paid_order(
                &o2,
                &[line("b", 1, 12000)],
                &[
                    payment("o2", PaymentMethod::Card, 10000),
                    payment("o2", PaymentMethod::Cash, 2000),
                ],
                None,
            )
            .await
            .unwrap();

        let cash = db.orders().cash_total_for_shift(&shift_id).await.unwrap();
        assert_eq!(cash, 7000);
    }

    #[tokio::test]
    async fn test_kitchen_queue_filters_and_sorts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shift_id = seed_shift(&db).await;

        let mut first = order("o-first", &shift_id, OrderStatus::Paid);
        first.opened_at = Utc::now() - chrono::Duration::minutes(10);
        db.orders().create_paid_order(&first, &[], &[], None).await.unwrap();

        let second = order("o-second", &shift_id, OrderStatus::Paid);
        db.orders().create_paid_order(&second, &[], &[], None).await.unwrap();

        let mut done = order("o-done", &shift_id, OrderStatus::Paid);
        done.kitchen_status = KitchenStatus::Ready;
        db.orders().create_paid_order(&done, &[], &[], None).await.unwrap();

        let queue = db.orders().kitchen_queue().await.unwrap();
        let ids: Vec<&str> = queue.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o-first", "o-second"]);

        let ready = db.orders().recently_ready(10).await.unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].id, "o-done");
    }
}
