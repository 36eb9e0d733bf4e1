//! Types for the reCAPTCHA Enterprise assessments API.

use serde::{Deserialize, Serialize};

/// Request body for `projects/{project}/assessments`.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentRequest {
    /// The event under assessment.
    pub event: AssessmentEvent,
}

/// The event being assessed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentEvent {
    /// The token from the frontend widget.
    pub token: String,
    /// The site key the widget was rendered with.
    pub site_key: String,
    /// The action the caller claims the user performed.
    pub expected_action: String,
}

/// An assessment returned by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// Resource name of the assessment.
    pub name: Option<String>,
    /// Properties of the submitted token.
    #[serde(default)]
    pub token_properties: TokenProperties,
    /// Risk analysis for the event.
    #[serde(default)]
    pub risk_analysis: RiskAnalysis,
}

/// Properties of the assessed token.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenProperties {
    /// Whether the token is valid (unexpired, unconsumed, well-formed).
    #[serde(default)]
    pub valid: bool,
    /// Why the token is invalid, when it is.
    pub invalid_reason: Option<String>,
    /// The action recorded when the token was minted.
    pub action: Option<String>,
    /// Hostname the token was generated on.
    pub hostname: Option<String>,
}

/// Risk analysis for the assessed event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
    /// Risk score in [0, 1]; lower means more bot-like.
    #[serde(default)]
    pub score: f64,
    /// Reason codes contributing to the score.
    #[serde(default)]
    pub reasons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_camel_case() {
        let request = AssessmentRequest {
            event: AssessmentEvent {
                token: "tok".to_string(),
                site_key: "key".to_string(),
                expected_action: "contact".to_string(),
            },
        };

        let json = serde_json::to_string(&request).expect("serialize");
        assert!(json.contains("\"siteKey\":\"key\""));
        assert!(json.contains("\"expectedAction\":\"contact\""));
    }

    #[test]
    fn test_assessment_deserialization() {
        let json = r#"{
            "name": "projects/p/assessments/abc",
            "tokenProperties": {
                "valid": true,
                "action": "login",
                "hostname": "sentryline.io"
            },
            "riskAnalysis": {
                "score": 0.9,
                "reasons": ["LOW_CONFIDENCE_SCORE"]
            }
        }"#;

        let assessment: Assessment = serde_json::from_str(json).expect("deserialize");
        assert!(assessment.token_properties.valid);
        assert_eq!(assessment.token_properties.action.as_deref(), Some("login"));
        assert!((assessment.risk_analysis.score - 0.9).abs() < f64::EPSILON);
        assert_eq!(assessment.risk_analysis.reasons.len(), 1);
    }

    #[test]
    fn test_assessment_deserialization_defaults() {
        // The API omits sections it did not evaluate.
        let assessment: Assessment = serde_json::from_str("{}").expect("deserialize");
        assert!(!assessment.token_properties.valid);
        assert!(assessment.risk_analysis.reasons.is_empty());
    }
}
