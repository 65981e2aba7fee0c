//! # Catalog Manager
//!
//! Menu administration (categories, modifiers, items) and the
//! register-facing menu reads.
//!
//! Mutations are admin-gated; reads are open to the register. The
//! modifier-snapshot builder is the bridge between "ids ticked in the
//! modifier dialog" and the frozen [`ModifierSnapshot`]s a cart line
//! carries.

use tracing::info;
use uuid::Uuid;

use crate::auth::authorize;
use crate::error::{ServiceError, ServiceResult};
use velva_core::policy::Action;
use velva_core::validation::{validate_name, validate_price_cents};
use velva_core::{Category, MenuItem, Modifier, ModifierSnapshot, StaffUser};
use velva_db::Database;

/// Manager for the menu catalog.
#[derive(Debug, Clone)]
pub struct CatalogManager {
    db: Database,
}

impl CatalogManager {
    /// Creates a new CatalogManager.
    pub fn new(db: Database) -> Self {
        CatalogManager { db }
    }

    // -------------------------------------------------------------------------
    // Register-facing reads
    // -------------------------------------------------------------------------

    /// Everything the register grid needs: categories, active items,
    /// and all modifiers (for snapshot building).
    pub async fn register_menu(
        &self,
    ) -> ServiceResult<(Vec<Category>, Vec<MenuItem>, Vec<Modifier>)> {
        let categories = self.db.catalog().list_categories().await?;
        let items = self.db.catalog().list_active_menu_items().await?;
        let modifiers = self.db.catalog().list_modifiers().await?;
        Ok((categories, items, modifiers))
    }

    /// The modifiers a given item may be ordered with, active only.
    pub fn eligible_modifiers<'a>(
        item: &MenuItem,
        all_modifiers: &'a [Modifier],
    ) -> Vec<&'a Modifier> {
        all_modifiers
            .iter()
            .filter(|m| m.active && item.modifier_ids.contains(&m.id))
            .collect()
    }

    /// Freezes the ticked modifier ids into snapshots for a cart line.
    ///
    /// Every id must be eligible for the item and currently active;
    /// a stale dialog selection (modifier deleted or deactivated since)
    /// is rejected rather than silently dropped.
    pub fn snapshots_for_selection(
        item: &MenuItem,
        selected_ids: &[String],
        all_modifiers: &[Modifier],
    ) -> ServiceResult<Vec<ModifierSnapshot>> {
        let eligible = Self::eligible_modifiers(item, all_modifiers);

        selected_ids
            .iter()
            .map(|id| {
                eligible
                    .iter()
                    .find(|m| &m.id == id)
                    .map(|m| ModifierSnapshot::from_modifier(m))
                    .ok_or_else(|| ServiceError::not_found("Modifier", id.clone()))
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Admin mutations
    // -------------------------------------------------------------------------

    /// Creates a category.
    pub async fn create_category(
        &self,
        acting: &StaffUser,
        name: &str,
        name_ar: &str,
    ) -> ServiceResult<Category> {
        authorize(acting, Action::ManageCatalog)?;
        validate_name("category name", name)?;

        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            name_ar: name_ar.trim().to_string(),
        };
        self.db.catalog().insert_category(&category).await?;
        Ok(category)
    }

    /// Updates a category.
    pub async fn update_category(
        &self,
        acting: &StaffUser,
        category: Category,
    ) -> ServiceResult<()> {
        authorize(acting, Action::ManageCatalog)?;
        validate_name("category name", &category.name)?;
        self.db.catalog().update_category(&category).await?;
        Ok(())
    }

    /// Deletes a category and, with it, its menu items.
    pub async fn delete_category(&self, acting: &StaffUser, id: &str) -> ServiceResult<()> {
        authorize(acting, Action::ManageCatalog)?;
        self.db.catalog().delete_category(id).await?;
        info!(id = %id, "Category deleted");
        Ok(())
    }

    /// Creates a modifier.
    pub async fn create_modifier(
        &self,
        acting: &StaffUser,
        name: &str,
        name_ar: &str,
        price_delta_cents: i64,
    ) -> ServiceResult<Modifier> {
        authorize(acting, Action::ManageCatalog)?;
        validate_name("modifier name", name)?;

        let modifier = Modifier {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            name_ar: name_ar.trim().to_string(),
            price_delta_cents,
            active: true,
        };
        self.db.catalog().insert_modifier(&modifier).await?;
        Ok(modifier)
    }

    /// Updates a modifier. Existing order lines keep their snapshots.
    pub async fn update_modifier(
        &self,
        acting: &StaffUser,
        modifier: Modifier,
    ) -> ServiceResult<()> {
        authorize(acting, Action::ManageCatalog)?;
        validate_name("modifier name", &modifier.name)?;
        self.db.catalog().update_modifier(&modifier).await?;
        Ok(())
    }

    /// Deletes a modifier.
    pub async fn delete_modifier(&self, acting: &StaffUser, id: &str) -> ServiceResult<()> {
        authorize(acting, Action::ManageCatalog)?;
        self.db.catalog().delete_modifier(id).await?;
        Ok(())
    }

    /// Creates a menu item.
    pub async fn create_menu_item(
        &self,
        acting: &StaffUser,
        item: MenuItem,
    ) -> ServiceResult<MenuItem> {
        authorize(acting, Action::ManageCatalog)?;
        validate_name("item name", &item.name)?;
        validate_price_cents(item.price_cents)?;

        self.db.catalog().insert_menu_item(&item).await?;
        info!(id = %item.id, name = %item.name, "Menu item created");
        Ok(item)
    }

    /// Updates a menu item. Unit prices already frozen on cart lines and
    /// past orders are unaffected.
    pub async fn update_menu_item(&self, acting: &StaffUser, item: MenuItem) -> ServiceResult<()> {
        authorize(acting, Action::ManageCatalog)?;
        validate_name("item name", &item.name)?;
        validate_price_cents(item.price_cents)?;
        self.db.catalog().update_menu_item(&item).await?;
        Ok(())
    }

    /// Deletes a menu item.
    pub async fn delete_menu_item(&self, acting: &StaffUser, id: &str) -> ServiceResult<()> {
        authorize(acting, Action::ManageCatalog)?;
        self.db.catalog().delete_menu_item(id).await?;
        Ok(())
    }

    /// The full catalog, for the admin screens.
    pub async fn admin_catalog(
        &self,
        acting: &StaffUser,
    ) -> ServiceResult<(Vec<Category>, Vec<MenuItem>, Vec<Modifier>)> {
        authorize(acting, Action::ManageCatalog)?;
        let categories = self.db.catalog().list_categories().await?;
        let items = self.db.catalog().list_menu_items().await?;
        let modifiers = self.db.catalog().list_modifiers().await?;
        Ok((categories, items, modifiers))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
