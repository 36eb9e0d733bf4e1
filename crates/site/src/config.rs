//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SITE_BASE_URL` - Public URL for the site
//! - `GEMINI_API_KEY` - Generative Language API key
//! - `GOOGLE_CLOUD_PROJECT_ID` - Google Cloud project for reCAPTCHA assessments
//! - `FIREBASE_WEB_API_KEY` - Firebase Identity Toolkit web API key
//! - `FIREBASE_DATABASE_URL` - Realtime Database base URL
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `GEMINI_MODEL` - Model name (default: gemini-2.0-flash)
//! - `RECAPTCHA_SITE_KEY` - Site key (falls back to the deployed site's key)
//! - `RECAPTCHA_SCORE_THRESHOLD` - Minimum passing score (default: 0.3)
//! - `GOOGLE_APPLICATION_CREDENTIALS_JSON` - Service account key as raw JSON
//! - `GOOGLE_APPLICATION_CREDENTIALS_BASE64` - Service account key, base64-encoded JSON
//! - `FIREBASE_GOOGLE_CLIENT_ID` - OAuth client id for Google sign-in
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use crate::google::{CredentialError, CredentialSource};

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Site key used by the production deployment when no override is configured.
const DEFAULT_RECAPTCHA_SITE_KEY: &str = "6LdH2vIqAAAAAKx3rQ8mWcT5yBn0uEjZfL4oNpVs";

/// Default minimum passing risk score.
const DEFAULT_SCORE_THRESHOLD: f64 = 0.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
    #[error("Credential resolution failed: {0}")]
    Credentials(#[from] CredentialError),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Generative model configuration
    pub gemini: GeminiConfig,
    /// reCAPTCHA Enterprise configuration
    pub recaptcha: RecaptchaConfig,
    /// Firebase Auth and Realtime Database configuration
    pub firebase: FirebaseConfig,
    /// Google credentials, resolved once at startup
    pub google_credentials: CredentialSource,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Generative Language API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key for the Generative Language API
    pub api_key: SecretString,
    /// Model name (e.g., gemini-2.0-flash)
    pub model: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

/// reCAPTCHA Enterprise configuration.
#[derive(Debug, Clone)]
pub struct RecaptchaConfig {
    /// Google Cloud project that owns the site key
    pub project_id: String,
    /// Site key the frontend renders with
    pub site_key: String,
    /// Minimum passing risk score; strictly lower scores are rejected
    pub score_threshold: f64,
}

/// Firebase configuration.
///
/// Implements `Debug` manually to redact the web API key.
#[derive(Clone)]
pub struct FirebaseConfig {
    /// Identity Toolkit web API key
    pub web_api_key: SecretString,
    /// Realtime Database base URL (e.g., https://<project>.firebaseio.com)
    pub database_url: String,
    /// OAuth client id used for Google sign-in, if enabled
    pub google_client_id: Option<String>,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("web_api_key", &"[REDACTED]")
            .field("database_url", &self.database_url)
            .field("google_client_id", &self.google_client_id)
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    /// Credential material is parsed eagerly so a malformed service-account
    /// key fails startup instead of the first verification request.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SITE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SITE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("SITE_BASE_URL")?;

        let gemini = GeminiConfig::from_env()?;
        let recaptcha = RecaptchaConfig::from_env()?;
        let firebase = FirebaseConfig::from_env()?;
        let google_credentials = CredentialSource::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            base_url,
            gemini,
            recaptcha,
            firebase,
            google_credentials,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl GeminiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_validated_secret("GEMINI_API_KEY")?,
            model: get_env_or_default("GEMINI_MODEL", "gemini-2.0-flash"),
        })
    }
}

impl RecaptchaConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let score_threshold = match get_optional_env("RECAPTCHA_SCORE_THRESHOLD") {
            Some(raw) => {
                let value = raw.parse::<f64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("RECAPTCHA_SCORE_THRESHOLD".to_string(), e.to_string())
                })?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::InvalidEnvVar(
                        "RECAPTCHA_SCORE_THRESHOLD".to_string(),
                        format!("must be in [0, 1], got {value}"),
                    ));
                }
                value
            }
            None => DEFAULT_SCORE_THRESHOLD,
        };

        Ok(Self {
            project_id: get_required_env("GOOGLE_CLOUD_PROJECT_ID")?,
            site_key: get_env_or_default("RECAPTCHA_SITE_KEY", DEFAULT_RECAPTCHA_SITE_KEY),
            score_threshold,
        })
    }
}

impl FirebaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            web_api_key: get_validated_secret("FIREBASE_WEB_API_KEY")?,
            database_url: get_required_env("FIREBASE_DATABASE_URL")?,
            google_client_id: get_optional_env("FIREBASE_GOOGLE_CLIENT_ID"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the real provider key."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
