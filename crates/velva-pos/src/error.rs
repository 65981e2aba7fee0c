//! # Service Error Type
//!
//! Unified error type for service-layer operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  velva-core CoreError ──┐                                               │
//! │  velva-core Validation ─┼──► ServiceError ──► ErrorPayload (JSON)      │
//! │  velva-db   DbError ────┘         │                                     │
//! │                                   ▼                                     │
//! │                    { "code": "NO_ACTIVE_SHIFT",                         │
//! │                      "message": "No active shift; open one first" }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is recoverable: it reaches the caller as a value and is
//! rendered as a toast or form error, never a crash.

use serde::Serialize;
use thiserror::Error;

use velva_core::policy::Action;
use velva_core::{CoreError, Role, ValidationError};
use velva_db::DbError;

/// Service-layer errors: everything a UI call can come back with.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The acting role may not perform this action.
    #[error("{role:?} is not allowed to perform {action:?}")]
    Unauthorized { role: Role, action: Action },

    /// Correct credentials, deactivated account. Distinct from
    /// `InvalidCredentials` so the UI can say why login failed.
    #[error("Account is inactive")]
    AccountInactive,

    /// Unknown username or wrong password (deliberately not saying which).
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Order/payment/expense attempted with no open shift.
    #[error("No active shift; open a shift first")]
    NoActiveShift,

    /// Logout attempted while a shift is still open.
    #[error("A shift is still open; close it before logging out")]
    ActiveShiftOpen,

    /// Reservation overlaps an existing one on the same table.
    #[error("Table already has a reservation within the conflict window")]
    TableConflict { table_id: String },

    /// Placing or saving an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Entity lookup came back empty at the service level.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Password hashing/verification infrastructure failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// Business rule violation from velva-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Persistence failure from velva-db.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

impl ServiceError {
    /// Shorthand for a service-level NotFound.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Machine-readable code for the frontend.
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::Unauthorized { .. } => ErrorCode::Unauthorized,
            ServiceError::AccountInactive => ErrorCode::AccountInactive,
            ServiceError::InvalidCredentials => ErrorCode::InvalidCredentials,
            ServiceError::NoActiveShift => ErrorCode::NoActiveShift,
            ServiceError::ActiveShiftOpen => ErrorCode::ActiveShiftOpen,
            ServiceError::TableConflict { .. } => ErrorCode::TableConflict,
            ServiceError::EmptyCart => ErrorCode::ValidationError,
            ServiceError::NotFound { .. } => ErrorCode::NotFound,
            ServiceError::PasswordHash(_) => ErrorCode::Internal,
            ServiceError::Core(CoreError::Validation(_)) => ErrorCode::ValidationError,
            ServiceError::Core(_) => ErrorCode::BusinessLogic,
            ServiceError::Db(DbError::NotFound { .. }) => ErrorCode::NotFound,
            ServiceError::Db(DbError::UniqueViolation { .. }) => ErrorCode::ValidationError,
            ServiceError::Db(_) => ErrorCode::DatabaseError,
        }
    }

    /// Serializable payload for the frontend.
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unauthorized,
    AccountInactive,
    InvalidCredentials,
    NoActiveShift,
    ActiveShiftOpen,
    TableConflict,
    ValidationError,
    NotFound,
    BusinessLogic,
    DatabaseError,
    Internal,
}

/// What the frontend receives when a service call fails.
///
/// ```json
/// { "code": "TABLE_CONFLICT", "message": "Table already has a reservation..." }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_for_the_auth_failures() {
        assert_eq!(ServiceError::AccountInactive.code(), ErrorCode::AccountInactive);
        assert_eq!(ServiceError::InvalidCredentials.code(), ErrorCode::InvalidCredentials);
        assert_ne!(
            ServiceError::AccountInactive.code(),
            ServiceError::InvalidCredentials.code()
        );
    }

    #[test]
    fn test_validation_flows_through_core() {
        let err: ServiceError = ValidationError::MustBeNonNegative {
            field: "opening cash".to_string(),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[test]
    fn test_payload_serializes_screaming_snake() {
        let payload = ServiceError::NoActiveShift.to_payload();
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("NO_ACTIVE_SHIFT"));
    }
}
