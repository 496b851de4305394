//! Domain layer for the food delivery backend.
//!
//! - Models and request/response types for accounts, catalog, cart, orders,
//!   driver schedules and back-office records
//! - Role-based access decisions
//! - Checkout draft construction and dashboard time windows

pub mod models;
pub mod services;
