//! # Auth Gate
//!
//! Credential verification, role gating, and staff account
//! administration.
//!
//! ## Trust Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login(username, password)                                              │
//! │       │                                                                 │
//! │       ├── unknown username ───────────► InvalidCredentials              │
//! │       ├── argon2 verify fails ────────► InvalidCredentials              │
//! │       ├── account deactivated ────────► AccountInactive (distinct!)     │
//! │       └── ok ─────────────────────────► StaffUser                       │
//! │                                                                         │
//! │  logout(user)                                                           │
//! │       ├── open shift ─────────────────► ActiveShiftOpen                 │
//! │       └── ok                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Passwords are hashed with argon2id (PHC string format). Session
//! storage and transport are the embedding shell's concern; this gate
//! stops at verifying who is standing at the register.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use velva_core::policy::{self, Action};
use velva_core::validation::{validate_name, validate_username};
use velva_core::{Role, StaffUser};
use velva_db::Database;

/// Checks the policy matrix, turning a deny into `Unauthorized`.
///
/// Every manager entry point calls this before touching the store.
pub fn authorize(user: &StaffUser, action: Action) -> ServiceResult<()> {
    if policy::is_allowed(user.role, action) {
        Ok(())
    } else {
        warn!(user = %user.username, role = ?user.role, action = ?action, "Denied by policy");
        Err(ServiceError::Unauthorized {
            role: user.role,
            action,
        })
    }
}

/// Hashes a password for storage (argon2id, random salt).
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::PasswordHash(e.to_string()))
}

/// Verifies a password against a stored PHC hash string.
///
/// A malformed stored hash counts as a failed verification, not a crash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// The credential/role gate plus staff administration.
#[derive(Debug, Clone)]
pub struct AuthGate {
    db: Database,
}

impl AuthGate {
    /// Creates a new AuthGate.
    pub fn new(db: Database) -> Self {
        AuthGate { db }
    }

    // -------------------------------------------------------------------------
    // Login / logout
    // -------------------------------------------------------------------------

    /// Verifies credentials and returns the staff account.
    ///
    /// Wrong username and wrong password both come back as
    /// `InvalidCredentials`; only a correct password against a
    /// deactivated account yields `AccountInactive`.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<StaffUser> {
        validate_username(username)?;

        let Some(user) = self.db.users().get_by_username(username.trim()).await? else {
            return Err(ServiceError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash) {
            warn!(username = %username, "Failed login attempt");
            return Err(ServiceError::InvalidCredentials);
        }

        if !user.active {
            warn!(username = %username, "Login attempt on inactive account");
            return Err(ServiceError::AccountInactive);
        }

        info!(username = %username, role = ?user.role, "Staff member logged in");
        Ok(user)
    }

    /// Clears the way for logout.
    ///
    /// A cashier with an open shift must reconcile the drawer first;
    /// the caller is pointed back to the shift screen by the distinct
    /// `ActiveShiftOpen` signal.
    pub async fn logout(&self, user: &StaffUser) -> ServiceResult<()> {
        if self.db.shifts().find_open_by_user(&user.id).await?.is_some() {
            return Err(ServiceError::ActiveShiftOpen);
        }
        info!(username = %user.username, "Staff member logged out");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Staff administration (admin-gated)
    // -------------------------------------------------------------------------

    /// Creates a staff account with a freshly hashed password.
    pub async fn create_user(
        &self,
        acting: &StaffUser,
        name: &str,
        username: &str,
        password: &str,
        role: Role,
    ) -> ServiceResult<StaffUser> {
        authorize(acting, Action::ManageUsers)?;
        validate_name("name", name)?;
        validate_username(username)?;

        let now = Utc::now();
        let user = StaffUser {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            username: username.trim().to_string(),
            password_hash: hash_password(password)?,
            role,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.db.users().insert(&user).await?;

        info!(username = %user.username, role = ?role, "Staff account created");
        Ok(user)
    }

    /// Updates name, username, and role of an account.
    pub async fn update_user(
        &self,
        acting: &StaffUser,
        user_id: &str,
        name: &str,
        username: &str,
        role: Role,
    ) -> ServiceResult<StaffUser> {
        authorize(acting, Action::ManageUsers)?;
        validate_name("name", name)?;
        validate_username(username)?;

        let mut user = self
            .db
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;

        user.name = name.trim().to_string();
        user.username = username.trim().to_string();
        user.role = role;
        user.updated_at = Utc::now();
        self.db.users().update(&user).await?;
        Ok(user)
    }

    /// Resets an account's password.
    pub async fn set_password(
        &self,
        acting: &StaffUser,
        user_id: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        authorize(acting, Action::ManageUsers)?;

        let mut user = self
            .db
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;

        user.password_hash = hash_password(new_password)?;
        user.updated_at = Utc::now();
        self.db.users().update(&user).await?;

        info!(username = %user.username, "Password reset");
        Ok(())
    }

    /// Activates or deactivates an account.
    ///
    /// Deactivation keeps the account's shift/order history intact while
    /// blocking future logins.
    pub async fn set_user_active(
        &self,
        acting: &StaffUser,
        user_id: &str,
        active: bool,
    ) -> ServiceResult<StaffUser> {
        authorize(acting, Action::ManageUsers)?;

        let mut user = self
            .db
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;

        user.active = active;
        user.updated_at = Utc::now();
        self.db.users().update(&user).await?;
        Ok(user)
    }

    /// Lists all staff accounts.
    pub async fn list_users(&self, acting: &StaffUser) -> ServiceResult<Vec<StaffUser>> {
        authorize(acting, Action::ManageUsers)?;
        Ok(self.db.users().list().await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use velva_db::DbConfig;

    async fn gate() -> (AuthGate, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        (AuthGate::new(db.clone()), db)
    }

    async fn seed_admin(gate: &AuthGate, db: &Database) -> StaffUser {
        // Bootstrap: insert the first admin directly, then use the gate
        let now = Utc::now();
        let admin = StaffUser {
            id: Uuid::new_v4().to_string(),
            name: "Admin".to_string(),
            username: "admin".to_string(),
            password_hash: hash_password("admin-pass").unwrap(),
            role: Role::Admin,
            active: true,
            created_at: now,
            updated_at: now,
        };
        db.users().insert(&admin).await.unwrap();
        gate.login("admin", "admin-pass").await.unwrap()
    }

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("espresso-machine").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("espresso-machine", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("espresso-machine", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn test_wrong_password_and_inactive_are_distinct() {
        let (gate, db) = gate().await;
        let admin = seed_admin(&gate, &db).await;

        let cashier = gate
            .create_user(&admin, "Cashier One", "cashier", "pw1", Role::Cashier)
            .await
            .unwrap();

        // Wrong password
        let err = gate.login("cashier", "nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));

        // Unknown user looks the same as a wrong password
        let err = gate.login("nobody", "pw1").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));

        // Deactivated account with the RIGHT password is a different signal
        gate.set_user_active(&admin, &cashier.id, false).await.unwrap();
        let err = gate.login("cashier", "pw1").await.unwrap_err();
        assert!(matches!(err, ServiceError::AccountInactive));
    }

    #[tokio::test]
    async fn test_user_admin_requires_admin_role() {
        let (gate, db) = gate().await;
        let admin = seed_admin(&gate, &db).await;

        let cashier = gate
            .create_user(&admin, "Cashier One", "cashier", "pw1", Role::Cashier)
            .await
            .unwrap();

        let err = gate
            .create_user(&cashier, "Sneaky", "sneaky", "pw", Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized { .. }));

        let err = gate.list_users(&cashier).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_logout_blocked_by_open_shift() {
        let (gate, db) = gate().await;
        let admin = seed_admin(&gate, &db).await;

        let shift = velva_core::Shift {
            id: Uuid::new_v4().to_string(),
            user_id: admin.id.clone(),
            opened_at: Utc::now(),
            closed_at: None,
            opening_cash_cents: 10000,
            closing_cash_cents: None,
            calculated_cash_cents: 0,
        };
        db.shifts().insert(&shift).await.unwrap();

        let err = gate.logout(&admin).await.unwrap_err();
        assert!(matches!(err, ServiceError::ActiveShiftOpen));

        db.shifts().close(&shift.id, Utc::now(), 10000, 10000).await.unwrap();
        gate.logout(&admin).await.unwrap();
    }

    #[tokio::test]
    async fn test_password_reset() {
        let (gate, db) = gate().await;
        let admin = seed_admin(&gate, &db).await;
        let user = gate
            .create_user(&admin, "Kitchen", "kitchen", "old-pw", Role::Kitchen)
            .await
            .unwrap();

        gate.set_password(&admin, &user.id, "new-pw").await.unwrap();
        assert!(gate.login("kitchen", "old-pw").await.is_err());
        gate.login("kitchen", "new-pw").await.unwrap();
    }
}
