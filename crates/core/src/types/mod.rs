//! Validated newtypes for the marketplace domain.

pub mod email;
pub mod id;
pub mod price;
pub mod role;
pub mod username;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use role::{Role, RoleError};
pub use username::{Username, UsernameError};
