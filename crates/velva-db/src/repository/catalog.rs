//! # Catalog Repository
//!
//! Database operations for the menu: categories, modifiers, menu items.
//!
//! `menu_items.modifier_ids` is a JSON text column; the eligible-modifier
//! list is only ever read as a whole, never joined against.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use velva_core::{Category, MenuItem, Modifier};

/// Repository for menu catalog operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    fn map_category(row: &SqliteRow) -> DbResult<Category> {
        Ok(Category {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            name_ar: row.try_get("name_ar")?,
        })
    }

    /// Inserts a category.
    pub async fn insert_category(&self, category: &Category) -> DbResult<()> {
        sqlx::query("INSERT INTO categories (id, name, name_ar) VALUES (?1, ?2, ?3)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.name_ar)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Updates a category.
    pub async fn update_category(&self, category: &Category) -> DbResult<()> {
        let result = sqlx::query("UPDATE categories SET name = ?2, name_ar = ?3 WHERE id = ?1")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.name_ar)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", &category.id));
        }
        Ok(())
    }

    /// Deletes a category. Its menu items go with it (FK cascade).
    pub async fn delete_category(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category and its items");
        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }
        Ok(())
    }

    /// Lists all categories.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let rows = sqlx::query("SELECT * FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::map_category).collect()
    }

    // -------------------------------------------------------------------------
    // Modifiers
    // -------------------------------------------------------------------------

    fn map_modifier(row: &SqliteRow) -> DbResult<Modifier> {
        Ok(Modifier {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            name_ar: row.try_get("name_ar")?,
            price_delta_cents: row.try_get("price_delta_cents")?,
            active: row.try_get("active")?,
        })
    }

    /// Inserts a modifier.
    pub async fn insert_modifier(&self, modifier: &Modifier) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO modifiers (id, name, name_ar, price_delta_cents, active)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&modifier.id)
        .bind(&modifier.name)
        .bind(&modifier.name_ar)
        .bind(modifier.price_delta_cents)
        .bind(modifier.active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Updates a modifier.
    pub async fn update_modifier(&self, modifier: &Modifier) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE modifiers SET
                name = ?2, name_ar = ?3, price_delta_cents = ?4, active = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&modifier.id)
        .bind(&modifier.name)
        .bind(&modifier.name_ar)
        .bind(modifier.price_delta_cents)
        .bind(modifier.active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Modifier", &modifier.id));
        }
        Ok(())
    }

    /// Deletes a modifier.
    ///
    /// Past order lines keep their snapshots; menu items keep a dangling
    /// id that the service layer filters out when offering modifiers.
    pub async fn delete_modifier(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM modifiers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Modifier", id));
        }
        Ok(())
    }

    /// Lists all modifiers.
    pub async fn list_modifiers(&self) -> DbResult<Vec<Modifier>> {
        let rows = sqlx::query("SELECT * FROM modifiers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::map_modifier).collect()
    }

    // -------------------------------------------------------------------------
    // Menu items
    // -------------------------------------------------------------------------

    fn map_menu_item(row: &SqliteRow) -> DbResult<MenuItem> {
        let modifier_ids_json: String = row.try_get("modifier_ids")?;
        let modifier_ids = serde_json::from_str(&modifier_ids_json)
            .map_err(|e| DbError::corrupt_column("modifier_ids", e))?;

        Ok(MenuItem {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            name_ar: row.try_get("name_ar")?,
            category_id: row.try_get("category_id")?,
            price_cents: row.try_get("price_cents")?,
            active: row.try_get("active")?,
            modifier_ids,
        })
    }

    /// Inserts a menu item.
    pub async fn insert_menu_item(&self, item: &MenuItem) -> DbResult<()> {
        debug!(id = %item.id, name = %item.name, "Inserting menu item");

        let modifier_ids = serde_json::to_string(&item.modifier_ids)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO menu_items (
                id, name, name_ar, category_id, price_cents, active, modifier_ids
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.name_ar)
        .bind(&item.category_id)
        .bind(item.price_cents)
        .bind(item.active)
        .bind(modifier_ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Updates a menu item.
    pub async fn update_menu_item(&self, item: &MenuItem) -> DbResult<()> {
        let modifier_ids = serde_json::to_string(&item.modifier_ids)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE menu_items SET
                name = ?2, name_ar = ?3, category_id = ?4,
                price_cents = ?5, active = ?6, modifier_ids = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.name_ar)
        .bind(&item.category_id)
        .bind(item.price_cents)
        .bind(item.active)
        .bind(modifier_ids)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Menu item", &item.id));
        }
        Ok(())
    }

    /// Deletes a menu item.
    pub async fn delete_menu_item(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Menu item", id));
        }
        Ok(())
    }

    /// Gets a menu item by id.
    pub async fn get_menu_item(&self, id: &str) -> DbResult<Option<MenuItem>> {
        let row = sqlx::query("SELECT * FROM menu_items WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::map_menu_item).transpose()
    }

    /// Lists every menu item, active or not (admin view).
    pub async fn list_menu_items(&self) -> DbResult<Vec<MenuItem>> {
        let rows = sqlx::query("SELECT * FROM menu_items ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::map_menu_item).collect()
    }

    /// Lists only active menu items (the POS grid).
    pub async fn list_active_menu_items(&self) -> DbResult<Vec<MenuItem>> {
        let rows = sqlx::query("SELECT * FROM menu_items WHERE active = 1 ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::map_menu_item).collect()
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

    fn category(name: &str) -> Category {
        Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            name_ar: name.to_string(),
        }
    }

    fn menu_item(name: &str, category_id: &str, modifier_ids: Vec<String>) -> MenuItem {
        MenuItem {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            name_ar: name.to_string(),
            category_id: category_id.to_string(),
            price_cents: 3500,
            active: true,
            modifier_ids,
        }
    }

    #[tokio::test]
    async fn test_menu_item_round_trip_with_modifier_ids() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cat = category("Hot Drinks");
        db.catalog().insert_category(&cat).await.unwrap();

        let item = menu_item("Latte", &cat.id, vec!["m1".to_string(), "m2".to_string()]);
        db.catalog().insert_menu_item(&item).await.unwrap();

        let found = db.catalog().get_menu_item(&item.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Latte");
        assert_eq!(found.modifier_ids, vec!["m1", "m2"]);
    }

    #[tokio::test]
    async fn test_deleting_category_cascades_to_items() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cat = category("Desserts");
        db.catalog().insert_category(&cat).await.unwrap();
        db.catalog()
            .insert_menu_item(&menu_item("Brownie", &cat.id, vec![]))
            .await
            .unwrap();

        db.catalog().delete_category(&cat.id).await.unwrap();
        assert!(db.catalog().list_menu_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_active_filter() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cat = category("Cold Drinks");
        db.catalog().insert_category(&cat).await.unwrap();

        let mut retired = menu_item("Old Special", &cat.id, vec![]);
        retired.active = false;
        db.catalog().insert_menu_item(&retired).await.unwrap();
        db.catalog()
            .insert_menu_item(&menu_item("Mojito", &cat.id, vec![]))
            .await
            .unwrap();

        let active = db.catalog().list_active_menu_items().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Mojito");
        assert_eq!(db.catalog().list_menu_items().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_modifier_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut modifier = Modifier {
            id: Uuid::new_v4().to_string(),
            name: "Extra Shot".to_string(),
            name_ar: "شوت إضافي".to_string(),
            price_delta_cents: 1000,
            active: true,
        };
        db.catalog().insert_modifier(&modifier).await.unwrap();

        modifier.price_delta_cents = 1200;
        db.catalog().update_modifier(&modifier).await.unwrap();

        let listed = db.catalog().list_modifiers().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].price_delta_cents, 1200);

        db.catalog().delete_modifier(&modifier.id).await.unwrap();
        assert!(db.catalog().list_modifiers().await.unwrap().is_empty());
    }
}
