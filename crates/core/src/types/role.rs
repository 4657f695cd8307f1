//! Marketplace roles.

use serde::{Deserialize, Serialize};

/// Error returned when a role code or name cannot be interpreted.
#[derive(thiserror::Error, Debug, Clone)]
#[error("invalid role: {0}")]
pub struct RoleError(pub String);

/// The role a user holds in the marketplace.
///
/// Stored in the database as an integer code (1 = buyer, 2 = seller). The
/// enum is closed: every permission gate matches on it exhaustively rather
/// than comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Can browse, fill a cart, and check out.
    Buyer,
    /// Can additionally list offers for sale.
    Seller,
}

impl Role {
    /// The integer code stored in the database.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Buyer => 1,
            Self::Seller => 2,
        }
    }

    /// Interpret a stored integer code.
    ///
    /// # Errors
    ///
    /// Returns `RoleError` for any code other than 1 or 2.
    pub fn from_code(code: i64) -> Result<Self, RoleError> {
        match code {
            1 => Ok(Self::Buyer),
            2 => Ok(Self::Seller),
            other => Err(RoleError(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buyer => write!(f, "buyer"),
            Self::Seller => write!(f, "seller"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            other => Err(RoleError(other.to_owned())),
        }
    }
}

#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Role {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Role {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let code = <i64 as sqlx::Decode<'r, sqlx::Sqlite>>::decode(value)?;
        Ok(Self::from_code(code)?)
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Role {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&self.code(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        assert_eq!(Role::from_code(Role::Buyer.code()).unwrap(), Role::Buyer);
        assert_eq!(Role::from_code(Role::Seller.code()).unwrap(), Role::Seller);
    }

    #[test]
    fn test_from_code_rejects_unknown() {
        assert!(Role::from_code(0).is_err());
        assert!(Role::from_code(3).is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("buyer".parse::<Role>().unwrap(), Role::Buyer);
        assert_eq!("seller".parse::<Role>().unwrap(), Role::Seller);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Role::Buyer).unwrap(), "\"buyer\"");
        assert_eq!(serde_json::to_string(&Role::Seller).unwrap(), "\"seller\"");
    }
}
