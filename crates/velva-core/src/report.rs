//! # Report Aggregation
//!
//! Pure aggregation over already-fetched orders. Chart rendering is the
//! frontend's job; this module only computes the numbers behind it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::types::{MenuItem, Order, OrderLine, OrderStatus};

/// How often and for how much one menu item sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemPopularity {
    pub menu_item_id: String,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
}

/// Revenue booked on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailySales {
    #[ts(as = "String")]
    pub day: NaiveDate,
    pub revenue_cents: i64,
    pub order_count: i64,
}

/// Aggregates quantity and revenue per menu item.
///
/// Every current menu item gets a row (zero-sellers included, so the
/// report shows what is NOT moving); lines referencing items that have
/// since been deleted are skipped.
pub fn item_popularity(menu_items: &[MenuItem], lines: &[OrderLine]) -> Vec<ItemPopularity> {
    let mut by_item: BTreeMap<&str, ItemPopularity> = menu_items
        .iter()
        .map(|mi| {
            (
                mi.id.as_str(),
                ItemPopularity {
                    menu_item_id: mi.id.clone(),
                    name: mi.name.clone(),
                    quantity_sold: 0,
                    revenue_cents: 0,
                },
            )
        })
        .collect();

    for line in lines {
        if let Some(entry) = by_item.get_mut(line.menu_item_id.as_str()) {
            entry.quantity_sold += line.quantity;
            entry.revenue_cents += line.line_total().cents();
        }
    }

    by_item.into_values().collect()
}

/// Top N sellers by unit count.
pub fn top_by_quantity(mut popularity: Vec<ItemPopularity>, n: usize) -> Vec<ItemPopularity> {
    popularity.sort_by(|a, b| b.quantity_sold.cmp(&a.quantity_sold));
    popularity.truncate(n);
    popularity
}

/// Top N sellers by revenue.
pub fn top_by_revenue(mut popularity: Vec<ItemPopularity>, n: usize) -> Vec<ItemPopularity> {
    popularity.sort_by(|a, b| b.revenue_cents.cmp(&a.revenue_cents));
    popularity.truncate(n);
    popularity
}

/// Revenue per calendar day, paid orders only, ascending by day.
///
/// Days are taken from `closed_at` (the moment money changed hands);
/// open and cancelled orders contribute nothing.
pub fn daily_sales(orders: &[Order]) -> Vec<DailySales> {
    let mut by_day: BTreeMap<NaiveDate, DailySales> = BTreeMap::new();

    for order in orders {
        if order.status != OrderStatus::Paid {
            continue;
        }
        let Some(closed_at) = order.closed_at else {
            continue;
        };
        let day = closed_at.date_naive();
        let entry = by_day.entry(day).or_insert(DailySales {
            day,
            revenue_cents: 0,
            order_count: 0,
        });
        entry.revenue_cents += order.total_cents;
        entry.order_count += 1;
    }

    by_day.into_values().collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KitchenStatus, OrderType};
    use chrono::{TimeZone, Utc};

    fn menu_item(id: &str, name: &str) -> MenuItem {
        MenuItem {
            id: id.to_string(),
            name: name.to_string(),
            name_ar: name.to_string(),
            category_id: "cat".to_string(),
            price_cents: 2500,
            active: true,
            modifier_ids: vec![],
        }
    }

    fn line(menu_item_id: &str, quantity: i64, unit_price_cents: i64) -> OrderLine {
        OrderLine {
            id: format!("line-{menu_item_id}-{quantity}"),
            menu_item_id: menu_item_id.to_string(),
            name: menu_item_id.to_string(),
            name_ar: menu_item_id.to_string(),
            quantity,
            unit_price_cents,
            modifiers: vec![],
        }
    }

    fn paid_order(total_cents: i64, day: u32) -> Order {
        let ts = Utc.with_ymd_and_hms(2026, 8, day, 15, 0, 0).unwrap();
        Order {
            id: format!("o-{day}-{total_cents}"),
            order_type: OrderType::Takeaway,
            table_no: None,
            status: OrderStatus::Paid,
            kitchen_status: KitchenStatus::Ready,
            opened_at: ts,
            closed_at: Some(ts),
            shift_id: "s1".to_string(),
            subtotal_cents: total_cents,
            service_charge_cents: 0,
            tax_cents: 0,
            discount_cents: 0,
            total_cents,
        }
    }

    #[test]
    fn test_item_popularity_counts_and_revenue() {
        let menu = vec![menu_item("espresso", "Espresso"), menu_item("latte", "Latte")];
        let lines = vec![
            line("espresso", 2, 2500),
            line("espresso", 1, 3500), // with a modifier delta baked in
            line("latte", 3, 3500),
            line("deleted-item", 9, 100), // no longer on the menu
        ];

        let popularity = item_popularity(&menu, &lines);
        assert_eq!(popularity.len(), 2);

        let espresso = popularity.iter().find(|p| p.menu_item_id == "espresso").unwrap();
        assert_eq!(espresso.quantity_sold, 3);
        assert_eq!(espresso.revenue_cents, 2 * 2500 + 3500);

        let latte = popularity.iter().find(|p| p.menu_item_id == "latte").unwrap();
        assert_eq!(latte.quantity_sold, 3);
        assert_eq!(latte.revenue_cents, 10500);
    }

    #[test]
    fn test_zero_sellers_are_reported() {
        let menu = vec![menu_item("mojito", "Mojito")];
        let popularity = item_popularity(&menu, &[]);
        assert_eq!(popularity.len(), 1);
        assert_eq!(popularity[0].quantity_sold, 0);
    }

    #[test]
    fn test_top_by_quantity_and_revenue() {
        let menu = vec![
            menu_item("a", "A"),
            menu_item("b", "B"),
            menu_item("c", "C"),
        ];
        let lines = vec![
            line("a", 10, 100), // qty 10, revenue 1000
            line("b", 2, 5000), // qty 2, revenue 10000
            line("c", 5, 500),  // qty 5, revenue 2500
        ];
        let popularity = item_popularity(&menu, &lines);

        let by_qty = top_by_quantity(popularity.clone(), 2);
        assert_eq!(by_qty[0].menu_item_id, "a");
        assert_eq!(by_qty[1].menu_item_id, "c");

        let by_revenue = top_by_revenue(popularity, 2);
        assert_eq!(by_revenue[0].menu_item_id, "b");
        assert_eq!(by_revenue[1].menu_item_id, "c");
    }

    #[test]
    fn test_daily_sales_groups_paid_orders() {
        let mut open_order = paid_order(9999, 3);
        open_order.status = OrderStatus::Open;
        open_order.closed_at = None;

        let orders = vec![
            paid_order(10000, 3),
            paid_order(5000, 3),
            paid_order(2500, 4),
            open_order,
        ];

        let days = daily_sales(&orders);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, Utc.with_ymd_and_hms(2026, 8, 3, 0, 0, 0).unwrap().date_naive());
        assert_eq!(days[0].revenue_cents, 15000);
        assert_eq!(days[0].order_count, 2);
        assert_eq!(days[1].revenue_cents, 2500);
    }
}
