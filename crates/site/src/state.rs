//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::firebase::{FirebaseAuthClient, RealtimeDbClient};
use crate::gemini::GeminiClient;
use crate::google::TokenProvider;
use crate::recaptcha::RecaptchaClient;
use crate::services::{Assistant, ProfileService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the external-service clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    assistant: Assistant,
    recaptcha: RecaptchaClient,
    profiles: ProfileService,
}

impl AppState {
    /// Create a new application state, wiring every client off one HTTP
    /// connection pool.
    #[must_use]
    pub fn new(config: SiteConfig, http: reqwest::Client) -> Self {
        // The Gemini client builds its own pool so the API key can ride in
        // default headers.
        let gemini = GeminiClient::new(&config.gemini);
        let assistant = Assistant::new(gemini);

        let tokens = TokenProvider::new(config.google_credentials.clone(), http.clone());
        let recaptcha = RecaptchaClient::new(&config.recaptcha, tokens, http.clone());

        let auth = FirebaseAuthClient::new(&config.firebase, http.clone());
        let db = RealtimeDbClient::new(&config.firebase, http);
        let profiles = ProfileService::new(auth, db, config.base_url.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                assistant,
                recaptcha,
                profiles,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the assistant service.
    #[must_use]
    pub fn assistant(&self) -> &Assistant {
        &self.inner.assistant
    }

    /// Get a reference to the reCAPTCHA Enterprise client.
    #[must_use]
    pub fn recaptcha(&self) -> &RecaptchaClient {
        &self.inner.recaptcha
    }

    /// Get a reference to the auth/profile service.
    #[must_use]
    pub fn profiles(&self) -> &ProfileService {
        &self.inner.profiles
    }
}
