//! # Settings Repository
//!
//! The settings singleton (row id fixed at 1). The initial migration
//! inserts the row, so `get` never comes back empty on a migrated
//! database.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::error::DbResult;
use velva_core::CafeSettings;

/// Repository for the settings singleton.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    fn map_settings(row: &SqliteRow) -> DbResult<CafeSettings> {
        Ok(CafeSettings {
            tax_rate_bps: row.try_get::<i64, _>("tax_rate_bps")? as u32,
            service_charge_rate_bps: row.try_get::<i64, _>("service_charge_rate_bps")? as u32,
            currency_code: row.try_get("currency_code")?,
            cafe_name: row.try_get("cafe_name")?,
            receipt_footer: row.try_get("receipt_footer")?,
            receipt_footer_ar: row.try_get("receipt_footer_ar")?,
            logo_url: row.try_get("logo_url")?,
            clamp_negative_charges: row.try_get("clamp_negative_charges")?,
        })
    }

    /// Reads the settings.
    pub async fn get(&self) -> DbResult<CafeSettings> {
        let row = sqlx::query("SELECT * FROM settings WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Self::map_settings(&row)
    }

    /// Overwrites the settings.
    pub async fn update(&self, settings: &CafeSettings) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE settings SET
                tax_rate_bps = ?1,
                service_charge_rate_bps = ?2,
                currency_code = ?3,
                cafe_name = ?4,
                receipt_footer = ?5,
                receipt_footer_ar = ?6,
                logo_url = ?7,
                clamp_negative_charges = ?8
            WHERE id = 1
            "#,
        )
        .bind(settings.tax_rate_bps as i64)
        .bind(settings.service_charge_rate_bps as i64)
        .bind(&settings.currency_code)
        .bind(&settings.cafe_name)
        .bind(&settings.receipt_footer)
        .bind(&settings.receipt_footer_ar)
        .bind(&settings.logo_url)
        .bind(settings.clamp_negative_charges)
        .execute(&self.pool)
        .await?;

        info!(
            tax_bps = settings.tax_rate_bps,
            service_bps = settings.service_charge_rate_bps,
            "Settings updated"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
