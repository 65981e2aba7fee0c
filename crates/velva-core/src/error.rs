//! # Error Types
//!
//! Domain-specific error types for velva-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  velva-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  velva-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  velva-pos errors (service layer)                                      │
//! │  └── ServiceError     - What the UI sees (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → Frontend           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, statuses)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::types::{KitchenStatus, OrderStatus};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations. They are caught by the
/// service layer and translated to user-facing signals.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Menu item cannot be found (deleted or deactivated mid-order).
    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),

    /// A cart line id does not exist in the cart.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// Kitchen status only moves forward (new → preparing → ready).
    #[error("Kitchen status cannot move from {from:?} to {to:?}")]
    KitchenStatusRegression {
        from: KitchenStatus,
        to: KitchenStatus,
    },

    /// The order is not in a state that allows the requested operation.
    ///
    /// Raised when editing a paid order, paying a cancelled one, etc.
    #[error("Order {order_id} is {current_status:?}, cannot perform operation")]
    InvalidOrderStatus {
        order_id: String,
        current_status: OrderStatus,
    },

    /// Cancelled reservations admit no further transitions.
    #[error("Reservation {0} is cancelled and cannot change status")]
    ReservationCancelled(String),

    /// No path leads back to `upcoming`.
    #[error("A reservation cannot be moved back to upcoming")]
    ReservationRevertsToUpcoming,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input does not meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater (cash counts, prices).
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g. non-numeric amount, invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. duplicate username).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
