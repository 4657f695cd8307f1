//! Business logic services for the marketplace.
//!
//! # Services
//!
//! - `auth` - Registration and login
//! - `catalog` - Offer listing, search, and creation
//! - `cart` - Per-user cart mutation and resolution
//! - `checkout` - Cart-to-payment-session orchestration
//! - `images` - Offer image storage
//!
//! Services borrow the connection pool and are constructed per request;
//! handlers receive identity explicitly through extractors, never through
//! request-global state.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod images;
