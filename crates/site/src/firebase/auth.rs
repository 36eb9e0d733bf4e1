//! Identity Toolkit REST client.
//!
//! All operations are direct pass-throughs to the hosted provider; there is
//! no local session, token refresh, or validation logic here beyond decoding
//! the provider's error codes.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use sentryline_core::{Email, Uid};

use crate::config::FirebaseConfig;

use super::error::{AuthApiError, FirebaseError};

const IDENTITY_TOOLKIT_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

/// A signed-in session as reported by the provider.
#[derive(Clone)]
pub struct AuthSession {
    /// Provider-issued user id.
    pub uid: Uid,
    /// Email on the account, when known.
    pub email: Option<String>,
    /// Short-lived id token; authorizes database access.
    pub id_token: SecretString,
    /// Long-lived refresh token.
    pub refresh_token: SecretString,
    /// Id-token lifetime in seconds.
    pub expires_in: i64,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("id_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Result of a Google federated sign-in.
#[derive(Debug, Clone)]
pub struct GoogleSignIn {
    /// The created session.
    pub session: AuthSession,
    /// Whether this is the first-ever login for the account.
    pub is_new_user: bool,
    /// Display name asserted by Google.
    pub display_name: String,
    /// Email asserted by Google.
    pub email: String,
    /// Avatar URL asserted by Google.
    pub photo_url: String,
}

/// Identity Toolkit client.
#[derive(Clone)]
pub struct FirebaseAuthClient {
    inner: Arc<FirebaseAuthClientInner>,
}

struct FirebaseAuthClientInner {
    client: reqwest::Client,
    api_key: SecretString,
}

impl FirebaseAuthClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: &FirebaseConfig, client: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(FirebaseAuthClientInner {
                client,
                api_key: config.web_api_key.clone(),
            }),
        }
    }

    /// Create a new email/password account.
    ///
    /// # Errors
    ///
    /// Returns `FirebaseError::Auth(AuthApiError::EmailExists)` when the
    /// address is already registered, `WeakPassword` when the password fails
    /// the provider policy.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthSession, FirebaseError> {
        let body = serde_json::json!({
            "email": email.as_str(),
            "password": password,
            "returnSecureToken": true,
        });
        let response: SessionResponse = self.call("accounts:signUp", &body).await?;
        response.into_session()
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `FirebaseError::Auth(AuthApiError::InvalidLoginCredentials)`
    /// for a wrong email/password pair.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthSession, FirebaseError> {
        let body = serde_json::json!({
            "email": email.as_str(),
            "password": password,
            "returnSecureToken": true,
        });
        let response: SessionResponse = self.call("accounts:signInWithPassword", &body).await?;
        response.into_session()
    }

    /// Sign in with a Google id token.
    ///
    /// # Errors
    ///
    /// Returns `FirebaseError::Auth` when the provider rejects the token.
    #[instrument(skip(self, google_id_token))]
    pub async fn sign_in_with_google(
        &self,
        google_id_token: &str,
        request_uri: &str,
    ) -> Result<GoogleSignIn, FirebaseError> {
        let body = serde_json::json!({
            "postBody": format!(
                "id_token={}&providerId=google.com",
                urlencoding::encode(google_id_token)
            ),
            "requestUri": request_uri,
            "returnSecureToken": true,
            "returnIdpCredential": true,
        });
        let response: IdpSessionResponse = self.call("accounts:signInWithIdp", &body).await?;
        response.into_google_sign_in()
    }

    /// Dispatch a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns `FirebaseError::Auth(AuthApiError::UserNotFound)` when no
    /// account exists for the address.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn send_password_reset(&self, email: &Email) -> Result<(), FirebaseError> {
        let body = serde_json::json!({
            "requestType": "PASSWORD_RESET",
            "email": email.as_str(),
        });
        let _: serde_json::Value = self.call("accounts:sendOobCode", &body).await?;
        Ok(())
    }

    /// POST an Identity Toolkit method and decode the response.
    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, FirebaseError> {
        let url = format!(
            "{IDENTITY_TOOLKIT_BASE}/{method}?key={}",
            urlencoding::encode(self.inner.api_key.expose_secret())
        );

        let response = self.inner.client.post(&url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
                return Err(FirebaseError::Auth(AuthApiError::from_message(
                    &envelope.error.message,
                )));
            }
            return Err(FirebaseError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FirebaseError::Parse(e.to_string()))
    }
}

impl std::fmt::Debug for FirebaseAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseAuthClient").finish_non_exhaustive()
    }
}

// =============================================================================
// Wire types
// =============================================================================

/// Error envelope from the Identity Toolkit.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Session fields common to signUp/signInWithPassword.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
    refresh_token: String,
    /// Reported as a decimal string by the REST API.
    expires_in: String,
}

impl SessionResponse {
    fn into_session(self) -> Result<AuthSession, FirebaseError> {
        let uid = Uid::parse(&self.local_id)
            .map_err(|e| FirebaseError::Parse(format!("invalid uid in response: {e}")))?;
        let expires_in = self
            .expires_in
            .parse::<i64>()
            .map_err(|e| FirebaseError::Parse(format!("invalid expiresIn: {e}")))?;

        Ok(AuthSession {
            uid,
            email: self.email,
            id_token: SecretString::from(self.id_token),
            refresh_token: SecretString::from(self.refresh_token),
            expires_in,
        })
    }
}

/// Response from signInWithIdp.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdpSessionResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
    #[serde(default)]
    is_new_user: bool,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    photo_url: String,
}

impl IdpSessionResponse {
    fn into_google_sign_in(self) -> Result<GoogleSignIn, FirebaseError> {
        let email = self.email.clone().unwrap_or_default();
        let session = SessionResponse {
            local_id: self.local_id,
            email: self.email,
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_in: self.expires_in,
        }
        .into_session()?;

        Ok(GoogleSignIn {
            session,
            is_new_user: self.is_new_user,
            display_name: self.display_name,
            email,
            photo_url: self.photo_url,
        })
    }
}
