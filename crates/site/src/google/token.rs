//! OAuth2 access-token acquisition for Google APIs.
//!
//! Explicit service-account keys go through the JWT-bearer exchange; ambient
//! credentials are fetched from the GCE/Cloud Run metadata server. Tokens are
//! cached until shortly before expiry.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

use super::credentials::{CredentialSource, ServiceAccountKey};

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const JWT_LIFETIME_SECS: i64 = 3600;

/// Refresh this long before the reported expiry.
const EXPIRY_SLACK_SECS: i64 = 60;

/// Errors that can occur acquiring an access token.
///
/// Variants are split so callers can tell configuration problems (bad key,
/// unreachable metadata server) from transient transport failures without
/// inspecting message text.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The service-account private key could not be used for signing.
    #[error("invalid service-account key: {0}")]
    InvalidKey(#[from] jsonwebtoken::errors::Error),

    /// The token endpoint rejected the exchange.
    #[error("token exchange rejected ({status}): {message}")]
    ExchangeRejected { status: u16, message: String },

    /// The metadata server is unreachable (not running on GCP, or no
    /// credentials configured at all).
    #[error("metadata server unreachable: {0}")]
    MetadataUnreachable(String),

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token response could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
}

impl TokenError {
    /// Whether this failure points at deployment setup rather than a
    /// transient fault. Used to attach a remediation hint to 500 responses.
    #[must_use]
    pub const fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidKey(_) | Self::ExchangeRejected { .. } | Self::MetadataUnreachable(_)
        )
    }
}

/// JWT claims for the service-account bearer grant.
#[derive(Debug, Serialize)]
struct BearerClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

/// Cached access-token provider for Google APIs.
#[derive(Clone)]
pub struct TokenProvider {
    inner: Arc<TokenProviderInner>,
}

struct TokenProviderInner {
    source: CredentialSource,
    client: reqwest::Client,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenProvider {
    /// Create a provider for the given credential source.
    #[must_use]
    pub fn new(source: CredentialSource, client: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(TokenProviderInner {
                source,
                client,
                cached: RwLock::new(None),
            }),
        }
    }

    /// Get a valid access token, refreshing if the cached one is near expiry.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the exchange or metadata fetch fails.
    #[instrument(skip(self))]
    pub async fn access_token(&self) -> Result<SecretString, TokenError> {
        {
            let cached = self.inner.cached.read().await;
            if let Some(entry) = cached.as_ref()
                && entry.expires_at - Duration::seconds(EXPIRY_SLACK_SECS) > Utc::now()
            {
                return Ok(entry.token.clone());
            }
        }

        let mut cached = self.inner.cached.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(entry) = cached.as_ref()
            && entry.expires_at - Duration::seconds(EXPIRY_SLACK_SECS) > Utc::now()
        {
            return Ok(entry.token.clone());
        }

        let response = match &self.inner.source {
            CredentialSource::Explicit(key) => self.exchange_service_account(key).await?,
            CredentialSource::Ambient => self.fetch_metadata_token().await?,
        };

        let token = SecretString::from(response.access_token);
        let expires_at = Utc::now() + Duration::seconds(response.expires_in);
        *cached = Some(CachedToken {
            token: token.clone(),
            expires_at,
        });

        Ok(token)
    }

    /// JWT-bearer exchange for an explicit service-account key.
    async fn exchange_service_account(
        &self,
        key: &ServiceAccountKey,
    ) -> Result<TokenResponse, TokenError> {
        let now = Utc::now().timestamp();
        let claims = BearerClaims {
            iss: &key.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &key.token_uri,
            iat: now,
            exp: now + JWT_LIFETIME_SECS,
        };

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?;

        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];

        let response = self
            .inner
            .client
            .post(&key.token_uri)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TokenError::ExchangeRejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| TokenError::Parse(e.to_string()))
    }

    /// Fetch a token from the platform metadata server.
    async fn fetch_metadata_token(&self) -> Result<TokenResponse, TokenError> {
        let response = self
            .inner
            .client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| TokenError::MetadataUnreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TokenError::MetadataUnreachable(format!(
                "metadata server returned {status}"
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| TokenError::Parse(e.to_string()))
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("source", &self.inner.source)
            .finish_non_exhaustive()
    }
}
