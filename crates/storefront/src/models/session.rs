//! Session-stored identity.

use serde::{Deserialize, Serialize};

use tradepost_core::{Role, UserId, Username};

/// The compact identity record a session carries.
///
/// Just enough to authorize requests without a user-table read; the full
/// account row stays in the repository layer. Reaches handlers through the
/// `RequireAuth` / `OptionalAuth` extractors only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account id.
    pub id: UserId,
    /// Display name, shown in page chrome and used as offer owner.
    pub username: Username,
    /// Buyer or seller; gates the listing form.
    pub role: Role,
}

/// Keys under which authentication state lives in the session.
pub mod session_keys {
    /// The logged-in user's [`CurrentUser`](super::CurrentUser) record.
    pub const CURRENT_USER: &str = "current_user";
}
