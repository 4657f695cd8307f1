//! Domain models for the marketplace.

pub mod cart;
pub mod offer;
pub mod session;
pub mod user;

pub use cart::{CartSnapshot, CartView};
pub use offer::Offer;
pub use session::{CurrentUser, session_keys};
pub use user::User;
