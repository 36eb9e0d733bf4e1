//! Firebase REST clients.
//!
//! Two thin clients over Google's hosted services:
//!
//! - [`FirebaseAuthClient`] - Identity Toolkit (sign-up, sign-in, Google
//!   federated sign-in, password-reset dispatch), authorized by web API key.
//! - [`RealtimeDbClient`] - Realtime Database access to `users/{uid}`,
//!   authorized by the signed-in user's id token, including the SSE change
//!   stream that feeds the profile mirror.
//!
//! Neither client retries; every failure is terminal for its request.

mod auth;
mod database;
mod error;

pub use auth::{AuthSession, FirebaseAuthClient, GoogleSignIn};
pub use database::{ProfileEvent, RealtimeDbClient};
pub use error::{AuthApiError, FirebaseError};
