//! Domain services.

pub mod access;
pub mod calendar;
pub mod checkout;

pub use access::{authorize, AccessError, Action, Caller, CatalogScope, OrderScope, Resource};
pub use checkout::{build_order_draft, CheckoutError, CheckoutLine, OrderDraft};
