//! Provider-issued user identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Uid`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum UidError {
    /// The input string is empty.
    #[error("uid cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("uid must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains characters outside the identity provider's alphabet.
    #[error("uid contains invalid character '{0}'")]
    InvalidCharacter(char),
}

/// A user id issued by the hosted identity provider.
///
/// Firebase uids are opaque strings of ASCII alphanumerics (plus `-` and `_`),
/// up to 128 characters. The uid doubles as the key of the user's profile
/// record at `users/{uid}`, so it must never be empty or contain path
/// separators.
///
/// ## Examples
///
/// ```
/// use sentryline_core::Uid;
///
/// assert!(Uid::parse("hnJ2PkT9R3WqXb81uG7f0dYcM5A2").is_ok());
/// assert!(Uid::parse("").is_err());
/// assert!(Uid::parse("bad/uid").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Maximum length of a uid (Firebase limit).
    pub const MAX_LENGTH: usize = 128;

    /// Parse a `Uid` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 128 characters, or
    /// contains characters outside `[A-Za-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, UidError> {
        if s.is_empty() {
            return Err(UidError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(UidError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
        {
            return Err(UidError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the uid as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Uid` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Uid::parse("hnJ2PkT9R3WqXb81uG7f0dYcM5A2").is_ok());
        assert!(Uid::parse("a").is_ok());
        assert!(Uid::parse("user_1-x").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Uid::parse(""), Err(UidError::Empty)));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(129);
        assert!(matches!(Uid::parse(&long), Err(UidError::TooLong { .. })));
    }

    #[test]
    fn test_parse_rejects_path_separators() {
        assert!(matches!(
            Uid::parse("users/abc"),
            Err(UidError::InvalidCharacter('/'))
        ));
        assert!(Uid::parse("a.b").is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let uid = Uid::parse("abc123").expect("valid uid");
        let json = serde_json::to_string(&uid).expect("serialize");
        assert_eq!(json, "\"abc123\"");
    }
}
