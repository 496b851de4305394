//! Shared utilities for the food delivery backend.
//!
//! - JWT issuance and validation (RS256)
//! - Password hashing with Argon2id
//! - SHA-256 helpers for session token storage
//! - Reusable field validators

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
