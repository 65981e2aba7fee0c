//! # Repository Module
//!
//! Database repository implementations for Velva POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service call                                                           │
//! │       │                                                                 │
//! │       │  db.orders().create_paid_order(...)                             │
//! │       ▼                                                                 │
//! │  OrderRepository                                                        │
//! │  ├── SQL isolated in one place                                          │
//! │  └── composite writes run inside ONE transaction, so an order, its     │
//! │      lines, its payments, and the table binding commit or roll back    │
//! │      together                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Staff accounts
//! - [`catalog::CatalogRepository`] - Categories, modifiers, menu items
//! - [`order::OrderRepository`] - Orders, lines, payments, kitchen queue
//! - [`shift::ShiftRepository`] - Shifts and drawer expenses
//! - [`table::TableRepository`] - Floor tables and occupancy
//! - [`reservation::ReservationRepository`] - Bookings
//! - [`settings::SettingsRepository`] - The settings singleton

pub mod catalog;
pub mod order;
pub mod reservation;
pub mod settings;
pub mod shift;
pub mod table;
pub mod user;
