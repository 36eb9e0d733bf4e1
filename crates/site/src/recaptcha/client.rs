//! reCAPTCHA Enterprise assessments client.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::RecaptchaConfig;
use crate::google::TokenProvider;

use super::error::RecaptchaError;
use super::types::{Assessment, AssessmentEvent, AssessmentRequest};

const RECAPTCHA_API_BASE: &str = "https://recaptchaenterprise.googleapis.com/v1";

/// reCAPTCHA Enterprise client.
///
/// Creates assessments against a fixed project and site key. Authorization
/// uses OAuth2 bearer tokens from the shared [`TokenProvider`].
#[derive(Clone)]
pub struct RecaptchaClient {
    inner: Arc<RecaptchaClientInner>,
}

struct RecaptchaClientInner {
    client: reqwest::Client,
    tokens: TokenProvider,
    project_id: String,
    site_key: String,
}

impl RecaptchaClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: &RecaptchaConfig, tokens: TokenProvider, client: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(RecaptchaClientInner {
                client,
                tokens,
                project_id: config.project_id.clone(),
                site_key: config.site_key.clone(),
            }),
        }
    }

    /// The site key assessments are created against.
    #[must_use]
    pub fn site_key(&self) -> &str {
        &self.inner.site_key
    }

    /// Create an assessment for a frontend token.
    ///
    /// # Errors
    ///
    /// Returns `RecaptchaError::Token` when no access token could be
    /// acquired (a setup problem) and `RecaptchaError::Api` when the
    /// assessment API rejects the call.
    #[instrument(skip(self, token), fields(project = %self.inner.project_id, action = %expected_action))]
    pub async fn create_assessment(
        &self,
        token: &str,
        expected_action: &str,
    ) -> Result<Assessment, RecaptchaError> {
        let access_token = self.inner.tokens.access_token().await?;

        let request = AssessmentRequest {
            event: AssessmentEvent {
                token: token.to_string(),
                site_key: self.inner.site_key.clone(),
                expected_action: expected_action.to_string(),
            },
        };

        let url = format!(
            "{RECAPTCHA_API_BASE}/projects/{}/assessments",
            self.inner.project_id
        );

        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(access_token.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RecaptchaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Assessment>()
            .await
            .map_err(|e| RecaptchaError::Parse(e.to_string()))
    }
}

impl std::fmt::Debug for RecaptchaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecaptchaClient")
            .field("project_id", &self.inner.project_id)
            .field("site_key", &self.inner.site_key)
            .finish_non_exhaustive()
    }
}
