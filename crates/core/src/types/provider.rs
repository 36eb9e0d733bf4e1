//! Authentication provider enum.

use core::fmt;

use serde::{Deserialize, Serialize};

/// How a user account was created.
///
/// Stored on the profile record and consulted on Google sign-in: a returning
/// Google login only refreshes name/email/photo when the stored provider is
/// `Google`, so an email-password account is never silently rewritten by a
/// federated login with the same address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    /// Google federated sign-in.
    Google,
    /// Email and password sign-up.
    Email,
    /// Phone-number sign-in.
    Phone,
}

impl AuthProvider {
    /// Returns the provider's wire string (`"google"`, `"email"`, `"phone"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&AuthProvider::Google).expect("serialize");
        assert_eq!(json, "\"google\"");

        let parsed: AuthProvider = serde_json::from_str("\"email\"").expect("deserialize");
        assert_eq!(parsed, AuthProvider::Email);
    }

    #[test]
    fn test_display_matches_wire_format() {
        assert_eq!(AuthProvider::Phone.to_string(), "phone");
    }
}
