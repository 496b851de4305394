//! Application services.

pub mod auth;
pub mod media;

pub use auth::{AuthError, AuthService, Registration};
pub use media::{LocalMediaStorage, MediaError, MediaStorage};
