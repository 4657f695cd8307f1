//! User domain type.

use chrono::{DateTime, Utc};

use tradepost_core::{Email, Role, UserId, Username};

/// A marketplace account.
///
/// Validated on read from storage. The password hash never leaves the
/// repository layer, so this type is safe to hand to handlers and views.
#[derive(Debug, Clone)]
pub struct User {
    /// Account id.
    pub id: UserId,
    /// Unique display name.
    pub username: Username,
    /// Unique email address, the login identifier.
    pub email: Email,
    /// Buyer or seller.
    pub role: Role,
    /// When the account was registered.
    pub created_at: DateTime<Utc>,
}
