//! reCAPTCHA verification endpoint.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::recaptcha::{Verdict, evaluate};
use crate::state::AppState;

/// Request body for `POST /api/verify-recaptcha`.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// Token produced by the frontend widget.
    #[serde(default)]
    pub token: String,
    /// Action the frontend claims the token was minted for.
    #[serde(default)]
    pub action: String,
}

/// Response body for a verification request.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// `POST /api/verify-recaptcha`
///
/// Blank fields are rejected before any external call is made.
pub async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>> {
    let token = request.token.trim();
    let action = request.action.trim();
    if token.is_empty() {
        return Err(AppError::BadRequest("Missing reCAPTCHA token".to_string()));
    }
    if action.is_empty() {
        return Err(AppError::BadRequest("Missing expected action".to_string()));
    }

    let assessment = state.recaptcha().create_assessment(token, action).await?;
    let threshold = state.config().recaptcha.score_threshold;

    match evaluate(&assessment, action, threshold) {
        Verdict::Passed {
            score,
            reasons,
            action,
        } => Ok(Json(VerifyResponse {
            success: true,
            score: Some(score),
            reasons,
            action: Some(action),
        })),
        Verdict::InvalidToken { reason } => Err(AppError::BadRequest(format!(
            "Invalid reCAPTCHA token: {reason}"
        ))),
        Verdict::ActionMismatch { expected, recorded } => Err(AppError::BadRequest(format!(
            "Action mismatch: expected '{expected}', token was for '{recorded}'"
        ))),
        Verdict::LowScore { score, threshold } => Err(AppError::BadRequest(format!(
            "Low reCAPTCHA score: {score:.2} (threshold {threshold:.2})"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_request_tolerates_missing_fields() {
        // Missing fields deserialize to empty strings and are rejected by the
        // handler, not by a serde error.
        let request: VerifyRequest = serde_json::from_str("{}").expect("deserialize");
        assert!(request.token.is_empty());
        assert!(request.action.is_empty());
    }

    #[test]
    fn test_success_response_shape() {
        let response = VerifyResponse {
            success: true,
            score: Some(0.9),
            reasons: vec![],
            action: Some("login".to_string()),
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["success"], true);
        assert_eq!(json["action"], "login");
        // A clean pass still carries an explicit empty reasons list.
        assert_eq!(json["reasons"], serde_json::json!([]));
    }
}
