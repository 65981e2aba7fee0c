//! # Settings Manager
//!
//! The settings singleton: readable by every screen (the register needs
//! the rates, the header needs the branding), writable only by admin.

use tracing::info;

use crate::auth::authorize;
use crate::error::ServiceResult;
use velva_core::policy::Action;
use velva_core::validation::validate_rate_bps;
use velva_core::{CafeSettings, StaffUser};
use velva_db::Database;

/// Manager for the settings singleton.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    db: Database,
}

impl SettingsManager {
    /// Creates a new SettingsManager.
    pub fn new(db: Database) -> Self {
        SettingsManager { db }
    }

    /// Reads the settings. Open to every role.
    pub async fn get(&self) -> ServiceResult<CafeSettings> {
        Ok(self.db.settings().get().await?)
    }

    /// Overwrites the settings. Admin only; rates are validated to
    /// 0..=100% before the write.
    pub async fn update(
        &self,
        acting: &StaffUser,
        settings: CafeSettings,
    ) -> ServiceResult<CafeSettings> {
        authorize(acting, Action::UpdateSettings)?;
        validate_rate_bps("tax rate", settings.tax_rate_bps)?;
        validate_rate_bps("service charge rate", settings.service_charge_rate_bps)?;

        self.db.settings().update(&settings).await?;
        info!(
            tax_bps = settings.tax_rate_bps,
            service_bps = settings.service_charge_rate_bps,
            "Settings updated by admin"
        );
        Ok(settings)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::error::ServiceError;
    use chrono::Utc;
    use uuid::Uuid;
    use velva_core::{Role, StaffUser};
    use velva_db::DbConfig;

    fn user(role: Role) -> StaffUser {
        let now = Utc::now();
        StaffUser {
            id: Uuid::new_v4().to_string(),
            name: "Staff".to_string(),
            username: format!("u-{}", Uuid::new_v4()),
            password_hash: hash_password("pw").unwrap(),
            role,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_everyone_reads_only_admin_writes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let manager = SettingsManager::new(db);

        let mut settings = manager.get().await.unwrap();
        settings.tax_rate_bps = 1000;

        let err = manager
            .update(&user(Role::Cashier), settings.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized { .. }));

        manager.update(&user(Role::Admin), settings).await.unwrap();
        assert_eq!(manager.get().await.unwrap().tax_rate_bps, 1000);
    }

    #[tokio::test]
    async fn test_rates_above_100_percent_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let manager = SettingsManager::new(db);

        let mut settings = manager.get().await.unwrap();
        settings.service_charge_rate_bps = 10_001;
        assert!(manager.update(&user(Role::Admin), settings).await.is_err());
    }
}
