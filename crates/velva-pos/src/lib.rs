//! # velva-pos: Service Layer for Velva POS
//!
//! The managers a UI drives. Each one validates input, authorizes the
//! acting staff member against the core policy matrix, computes with
//! velva-core, and persists through velva-db — in that order, so a
//! rejected call never leaves a partial write behind.
//!
//! ## Managers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Service Layer Map                                 │
//! │                                                                         │
//! │  AuthGate              login/logout, password hashing, user admin      │
//! │  ShiftManager          open/close shifts, expenses, reconciliation     │
//! │  OrderManager          place/save orders, table edit flow, kitchen     │
//! │  ReservationScheduler  bookings with conflict detection                │
//! │  TableTracker          occupancy + floor view                          │
//! │  CatalogManager        categories, modifiers, menu items               │
//! │  SettingsManager       the admin-gated settings singleton              │
//! │  ReportService         popularity and daily sales aggregates           │
//! │  NotificationHub       injectable pub/sub for UI toasts                │
//! │                                                                         │
//! │  Every manager clones cheaply: they share the Database pool and the    │
//! │  NotificationHub sender.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod catalog;
pub mod error;
pub mod notify;
pub mod orders;
pub mod reports;
pub mod reservations;
pub mod settings;
pub mod shifts;
pub mod tables;

pub use auth::AuthGate;
pub use catalog::CatalogManager;
pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use notify::{Notice, NoticeLevel, NotificationHub};
pub use orders::{KitchenTicket, OrderManager, PaymentDraft, TableSelection};
pub use reports::ReportService;
pub use reservations::{ReservationRequest, ReservationScheduler};
pub use settings::SettingsManager;
pub use shifts::{ShiftManager, ShiftSummary};
pub use tables::{FloorTable, TableTracker};
