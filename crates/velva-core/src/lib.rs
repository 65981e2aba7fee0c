//! # velva-core: Pure Business Logic for Velva POS
//!
//! This crate is the **heart** of Velva POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Velva POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (TypeScript)                        │   │
//! │  │    Menu Grid ──► Cart ──► Payment ──► Kitchen Display           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    velva-pos (Service Layer)                    │   │
//! │  │    OrderManager, ShiftManager, ReservationScheduler, AuthGate   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ velva-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │  policy   │  │   │
//! │  │   │  Order    │  │   Money   │  │   Cart    │  │ role gate │  │   │
//! │  │   │  Shift    │  │   Rate    │  │  totals   │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                 │   │
//! │  │   │reservation│  │   shift   │  │  report   │                 │   │
//! │  │   │ conflicts │  │ cash math │  │aggregates │                 │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    velva-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (MenuItem, Order, Shift, Reservation, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Cart semantics and order total computation
//! - [`reservation`] - Table booking conflict rules
//! - [`shift`] - Cash drawer reconciliation math
//! - [`policy`] - Role-based authorization matrix
//! - [`report`] - Sales/popularity aggregation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in minor units (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod policy;
pub mod pricing;
pub mod report;
pub mod reservation;
pub mod shift;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use velva_core::Money` instead of
// `use velva_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use pricing::{Cart, OrderTotals, PricingRates};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart
///
/// Prevents runaway carts and keeps tickets printable.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line
///
/// Guards against fat-finger entry (e.g. typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
