//! # Seed Data Generator
//!
//! Populates a fresh database with the demo café dataset: three staff
//! accounts, the starter menu, twelve tables. Settings are seeded by the
//! initial migration itself.
//!
//! ## Usage
//! ```bash
//! # Seed ./velva.db (created if missing)
//! cargo run -p velva-pos --bin seed
//!
//! # Specify database path
//! cargo run -p velva-pos --bin seed -- --db ./data/velva.db
//! ```
//!
//! Staff accounts (all with the password printed at the end):
//! - `admin`   (admin)
//! - `cashier` (cashier)
//! - `kitchen` (kitchen)
//!
//! Running against an already-seeded database is a no-op.

use chrono::Utc;
use std::env;
use uuid::Uuid;

use velva_core::{CafeTable, Category, MenuItem, Modifier, Role, StaffUser, TableStatus};
use velva_db::{Database, DbConfig};
use velva_pos::auth::hash_password;

/// Every demo account logs in with this until an admin resets it.
const DEMO_PASSWORD: &str = "velva123";

const STAFF: &[(&str, &str, Role)] = &[
    ("Admin User", "admin", Role::Admin),
    ("Cashier One", "cashier", Role::Cashier),
    ("Kitchen Staff", "kitchen", Role::Kitchen),
];

const CATEGORIES: &[(&str, &str)] = &[
    ("Hot Drinks", "مشروبات ساخنة"),
    ("Cold Drinks", "مشروبات باردة"),
    ("Desserts", "حلويات"),
];

/// (name, name_ar, price delta in minor units)
const MODIFIERS: &[(&str, &str, i64)] = &[
    ("Extra Shot", "شوت إضافي", 1000),
    ("Soy Milk", "حليب صويا", 500),
    ("Whipped Cream", "كريمة مخفوقة", 700),
    ("Caramel Syrup", "شراب الكراميل", 800),
];

/// (name, name_ar, category index, price in minor units, modifier indexes)
const MENU: &[(&str, &str, usize, i64, &[usize])] = &[
    ("Espresso", "اسبريسو", 0, 2500, &[0, 1]),
    ("Latte", "لاتيه", 0, 3500, &[0, 1, 3]),
    ("Cappuccino", "كابتشينو", 0, 3500, &[0, 1]),
    ("Iced Coffee", "قهوة مثلجة", 1, 4000, &[0, 3]),
    ("Mojito", "موهيتو", 1, 4500, &[]),
    ("Cheesecake", "تشيز كيك", 2, 5000, &[2]),
    ("Brownie", "براوني", 2, 4500, &[2]),
];

const TABLE_COUNT: i64 = 12;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_path = parse_db_path().unwrap_or_else(|| "velva.db".to_string());
    tracing::info!(path = %db_path, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    if !db.users().list().await?.is_empty() {
        tracing::info!("Database already seeded, nothing to do");
        return Ok(());
    }

    let now = Utc::now();

    for (name, username, role) in STAFF {
        db.users()
            .insert(&StaffUser {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                username: username.to_string(),
                password_hash: hash_password(DEMO_PASSWORD)
                    .map_err(|e| format!("hashing seed password: {e}"))?,
                role: *role,
                active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }
    tracing::info!(count = STAFF.len(), "Staff accounts created");

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, name_ar) in CATEGORIES {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            name_ar: name_ar.to_string(),
        };
        db.catalog().insert_category(&category).await?;
        category_ids.push(category.id);
    }

    let mut modifier_ids = Vec::with_capacity(MODIFIERS.len());
    for (name, name_ar, delta) in MODIFIERS {
        let modifier = Modifier {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            name_ar: name_ar.to_string(),
            price_delta_cents: *delta,
            active: true,
        };
        db.catalog().insert_modifier(&modifier).await?;
        modifier_ids.push(modifier.id);
    }

    for (name, name_ar, category_idx, price, modifier_idxs) in MENU {
        db.catalog()
            .insert_menu_item(&MenuItem {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                name_ar: name_ar.to_string(),
                category_id: category_ids[*category_idx].clone(),
                price_cents: *price,
                active: true,
                modifier_ids: modifier_idxs
                    .iter()
                    .map(|i| modifier_ids[*i].clone())
                    .collect(),
            })
            .await?;
    }
    tracing::info!(items = MENU.len(), "Menu seeded");

    for number in 1..=TABLE_COUNT {
        db.tables()
            .insert(&CafeTable {
                id: Uuid::new_v4().to_string(),
                number,
                status: TableStatus::Available,
                order_id: None,
            })
            .await?;
    }
    tracing::info!(tables = TABLE_COUNT, "Floor seeded");

    tracing::info!(
        password = DEMO_PASSWORD,
        "Done. Log in as admin/cashier/kitchen"
    );
    Ok(())
}

fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
}
