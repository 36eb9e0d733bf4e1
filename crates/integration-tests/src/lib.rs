//! Integration tests for the Sentryline site.
//!
//! # Test Categories
//!
//! - `site_api` - Router-level tests via `tower::ServiceExt::oneshot`; no
//!   network access, exercising validation and auth extraction paths.
//! - `recaptcha_verdict` - Verdict logic over synthetic assessments.
//! - `profile_semantics` - Profile merge rules and wire formats.
//!
//! Tests that would require live provider credentials (Gemini, reCAPTCHA
//! assessments, Firebase) stop at the request-validation boundary; the
//! provider clients themselves are covered by their in-crate unit tests.

use std::net::IpAddr;

use secrecy::SecretString;

use sentryline_site::config::{FirebaseConfig, GeminiConfig, RecaptchaConfig, SiteConfig};
use sentryline_site::google::CredentialSource;
use sentryline_site::state::AppState;

/// A configuration pointing at nowhere; requests must be rejected before any
/// external call for tests using it to pass.
#[must_use]
pub fn test_config() -> SiteConfig {
    SiteConfig {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        gemini: GeminiConfig {
            api_key: SecretString::from("test-key"),
            model: "gemini-2.0-flash".to_string(),
        },
        recaptcha: RecaptchaConfig {
            project_id: "sentryline-test".to_string(),
            site_key: "test-site-key".to_string(),
            score_threshold: 0.3,
        },
        firebase: FirebaseConfig {
            web_api_key: SecretString::from("test-key"),
            database_url: "https://sentryline-test.firebaseio.com".to_string(),
            google_client_id: None,
        },
        google_credentials: CredentialSource::Ambient,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Build the full application router over a test configuration.
///
/// # Panics
///
/// Panics if the HTTP client cannot be constructed.
#[must_use]
pub fn test_app() -> axum::Router {
    let http = reqwest::Client::new();
    let state = AppState::new(test_config(), http);

    axum::Router::new()
        .route("/health", axum::routing::get(|| async { "ok" }))
        .merge(sentryline_site::routes::routes())
        .with_state(state)
}
