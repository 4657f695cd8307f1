//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors from [`Email::parse`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum EmailError {
    /// Nothing was entered.
    #[error("email cannot be empty")]
    Empty,
    /// Longer than the RFC 5321 address limit.
    #[error("email is longer than {limit} characters")]
    TooLong {
        /// The enforced limit.
        limit: usize,
    },
    /// Structurally not an address: no `@`, nothing on one side of it, or
    /// embedded whitespace.
    #[error("not a valid email address")]
    Malformed,
}

/// A structurally valid email address.
///
/// Validation here is deliberately shallow: a non-empty local part and
/// domain around an `@`, no whitespace, length within the RFC 5321 limit.
/// Deliverability is the mail system's problem; the type exists so the rest
/// of the codebase can assume the shape.
///
/// ```
/// use tradepost_core::Email;
///
/// assert!(Email::parse("buyer@example.com").is_ok());
/// assert!(Email::parse("no-at-sign").is_err());
/// assert!(Email::parse("two words@example.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// RFC 5321 address length limit.
    pub const MAX_LENGTH: usize = 254;

    /// Validate and wrap an address.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] when the input is empty, too long, or not of
    /// the form `local@domain`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                limit: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::Malformed);
        }

        match s.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(s.to_owned()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    /// The address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the owned address string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ordinary_addresses() {
        for ok in [
            "buyer@example.com",
            "seller.two@shop.example",
            "tagged+cart@mail.co.uk",
            "x@y.z",
        ] {
            assert!(Email::parse(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(Email::parse(""), Err(EmailError::Empty)));
    }

    #[test]
    fn test_rejects_over_limit() {
        let address = format!("{}@long.example", "x".repeat(Email::MAX_LENGTH));
        assert!(matches!(
            Email::parse(&address),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_shapes() {
        for bad in ["plain-text", "@no-local.com", "no-domain@", "a b@c.d"] {
            assert!(
                matches!(Email::parse(bad), Err(EmailError::Malformed)),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_display_and_from_str() {
        let email: Email = "buyer@example.com".parse().unwrap();
        assert_eq!(email.to_string(), "buyer@example.com");
        assert_eq!(email.as_str(), "buyer@example.com");
    }

    #[test]
    fn test_serializes_as_bare_string() {
        let email = Email::parse("buyer@example.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"buyer@example.com\"");
        let back: Email = serde_json::from_str(&json).unwrap();
        assert_eq!(back, email);
    }
}
