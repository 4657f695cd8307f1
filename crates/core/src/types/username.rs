//! Username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors from [`Username::parse`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum UsernameError {
    /// Nothing was entered.
    #[error("username cannot be empty")]
    Empty,
    /// Longer than the allowed maximum.
    #[error("username is longer than {limit} characters")]
    TooLong {
        /// The enforced limit.
        limit: usize,
    },
    /// Contains a character outside the allowed set.
    #[error("username may only contain letters, digits, '_', '.' and '-'")]
    InvalidCharacter,
}

/// The display name that identifies a user across the marketplace.
///
/// Usernames are unique per account and appear verbatim as the owner on
/// offer listings, so the character set is kept to `[A-Za-z0-9_.-]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Longest accepted username.
    pub const MAX_LENGTH: usize = 32;

    /// Validate and wrap a username.
    ///
    /// # Errors
    ///
    /// Returns [`UsernameError`] when the input is empty, over
    /// [`Self::MAX_LENGTH`], or uses characters outside `[A-Za-z0-9_.-]`.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        if s.is_empty() {
            return Err(UsernameError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                limit: Self::MAX_LENGTH,
            });
        }

        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-');
        if !s.chars().all(allowed) {
            return Err(UsernameError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the owned name string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_allowed_characters() {
        for ok in ["alice", "bob-the.seller_2", "X9"] {
            assert!(Username::parse(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(Username::parse(""), Err(UsernameError::Empty)));
    }

    #[test]
    fn test_rejects_over_limit() {
        let name = "n".repeat(Username::MAX_LENGTH + 1);
        assert!(matches!(
            Username::parse(&name),
            Err(UsernameError::TooLong { .. })
        ));
    }

    #[test]
    fn test_rejects_disallowed_characters() {
        for bad in ["alice smith", "alice@home", "emoji🦀"] {
            assert!(
                matches!(Username::parse(bad), Err(UsernameError::InvalidCharacter)),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_display_roundtrip() {
        assert_eq!(Username::parse("alice").unwrap().to_string(), "alice");
    }
}
