//! Google Cloud credential resolution and OAuth2 token acquisition.
//!
//! Credentials are resolved once at startup into a tagged [`CredentialSource`]
//! and handed to a [`TokenProvider`] that exchanges them for short-lived
//! access tokens. Failure kinds are carried in the error enums, so callers
//! classify by type rather than by matching error-message text.

mod credentials;
mod token;

pub use credentials::{CredentialError, CredentialSource, ServiceAccountKey};
pub use token::{TokenError, TokenProvider};
