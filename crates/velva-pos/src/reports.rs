//! # Report Service
//!
//! Fetches order history and delegates to `velva_core::report` for the
//! aggregation. A pure consumer of already-computed order data; nothing
//! here renders charts.

use crate::auth::authorize;
use crate::error::ServiceResult;
use velva_core::policy::Action;
use velva_core::report::{self, DailySales, ItemPopularity};
use velva_core::StaffUser;
use velva_db::Database;

/// Manager for the reports screens.
#[derive(Debug, Clone)]
pub struct ReportService {
    db: Database,
}

impl ReportService {
    /// Creates a new ReportService.
    pub fn new(db: Database) -> Self {
        ReportService { db }
    }

    /// Quantity and revenue per menu item, zero-sellers included.
    pub async fn item_popularity(&self, acting: &StaffUser) -> ServiceResult<Vec<ItemPopularity>> {
        authorize(acting, Action::ViewReports)?;
        let menu = self.db.catalog().list_menu_items().await?;
        let lines = self.db.orders().list_all_lines().await?;
        Ok(report::item_popularity(&menu, &lines))
    }

    /// Top sellers by unit count.
    pub async fn top_items_by_quantity(
        &self,
        acting: &StaffUser,
        n: usize,
    ) -> ServiceResult<Vec<ItemPopularity>> {
        Ok(report::top_by_quantity(self.item_popularity(acting).await?, n))
    }

    /// Top sellers by revenue.
    pub async fn top_items_by_revenue(
        &self,
        acting: &StaffUser,
        n: usize,
    ) -> ServiceResult<Vec<ItemPopularity>> {
        Ok(report::top_by_revenue(self.item_popularity(acting).await?, n))
    }

    /// Paid revenue per calendar day, ascending.
    pub async fn daily_sales(&self, acting: &StaffUser) -> ServiceResult<Vec<DailySales>> {
        authorize(acting, Action::ViewReports)?;
        let orders = self.db.orders().list_all().await?;
        Ok(report::daily_sales(&orders))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
