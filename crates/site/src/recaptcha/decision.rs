//! Verdict logic over a completed assessment.
//!
//! Checks run in a fixed order: token validity, action match, score
//! threshold. The comparison is strict-less-than, so a score exactly at the
//! threshold passes.

use sentryline_core::RiskScore;

use super::types::Assessment;

/// Outcome of evaluating an assessment against the caller's expectations.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The token passed every check.
    Passed {
        /// Reported risk score.
        score: f64,
        /// Reason codes from the risk analysis.
        reasons: Vec<String>,
        /// The action recorded on the token.
        action: String,
    },
    /// The token itself is invalid (expired, duplicate, malformed).
    InvalidToken {
        /// The reason reported by the assessment, if any.
        reason: String,
    },
    /// The token was minted for a different action than the caller claims.
    ActionMismatch {
        /// Action the caller expected.
        expected: String,
        /// Action recorded on the token.
        recorded: String,
    },
    /// The risk score fell strictly below the threshold.
    LowScore {
        /// Reported risk score.
        score: f64,
        /// The threshold it failed to clear.
        threshold: f64,
    },
}

/// Evaluate an assessment for the expected action and score threshold.
#[must_use]
pub fn evaluate(assessment: &Assessment, expected_action: &str, threshold: f64) -> Verdict {
    let props = &assessment.token_properties;

    if !props.valid {
        return Verdict::InvalidToken {
            reason: props
                .invalid_reason
                .clone()
                .unwrap_or_else(|| "INVALID_REASON_UNSPECIFIED".to_string()),
        };
    }

    let recorded = props.action.clone().unwrap_or_default();
    if recorded != expected_action {
        return Verdict::ActionMismatch {
            expected: expected_action.to_string(),
            recorded,
        };
    }

    // A score the type rejects (NaN, out of range) fails closed; a raw
    // float comparison would let NaN through.
    let raw = assessment.risk_analysis.score;
    match RiskScore::new(raw) {
        Ok(score) if score.passes(threshold) => Verdict::Passed {
            score: score.value(),
            reasons: assessment.risk_analysis.reasons.clone(),
            action: recorded,
        },
        Ok(score) => Verdict::LowScore {
            score: score.value(),
            threshold,
        },
        Err(_) => Verdict::LowScore {
            score: raw,
            threshold,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recaptcha::types::{RiskAnalysis, TokenProperties};

    fn assessment(valid: bool, action: Option<&str>, score: f64) -> Assessment {
        Assessment {
            name: Some("projects/p/assessments/a".to_string()),
            token_properties: TokenProperties {
                valid,
                invalid_reason: if valid {
                    None
                } else {
                    Some("EXPIRED".to_string())
                },
                action: action.map(str::to_string),
                hostname: None,
            },
            risk_analysis: RiskAnalysis {
                score,
                reasons: vec![],
            },
        }
    }

    #[test]
    fn test_valid_matching_high_score_passes() {
        let verdict = evaluate(&assessment(true, Some("login"), 0.9), "login", 0.3);
        assert!(matches!(verdict, Verdict::Passed { score, .. } if (score - 0.9).abs() < f64::EPSILON));
    }

    #[test]
    fn test_score_exactly_at_threshold_passes() {
        let verdict = evaluate(&assessment(true, Some("login"), 0.3), "login", 0.3);
        assert!(matches!(verdict, Verdict::Passed { .. }));
    }

    #[test]
    fn test_score_just_below_threshold_rejected() {
        let verdict = evaluate(&assessment(true, Some("login"), 0.29999), "login", 0.3);
        assert!(matches!(verdict, Verdict::LowScore { .. }));
    }

    #[test]
    fn test_invalid_token_rejected_first() {
        // Invalid token wins even with a perfect score and matching action.
        let verdict = evaluate(&assessment(false, Some("login"), 1.0), "login", 0.3);
        assert!(matches!(
            verdict,
            Verdict::InvalidToken { reason } if reason == "EXPIRED"
        ));
    }

    #[test]
    fn test_action_mismatch_rejected_regardless_of_score() {
        let verdict = evaluate(&assessment(true, Some("signup"), 1.0), "login", 0.3);
        assert_eq!(
            verdict,
            Verdict::ActionMismatch {
                expected: "login".to_string(),
                recorded: "signup".to_string(),
            }
        );
    }

    #[test]
    fn test_non_finite_score_fails_closed() {
        let verdict = evaluate(&assessment(true, Some("login"), f64::NAN), "login", 0.3);
        assert!(matches!(verdict, Verdict::LowScore { .. }));
    }

    #[test]
    fn test_missing_recorded_action_is_a_mismatch() {
        let verdict = evaluate(&assessment(true, None, 0.9), "login", 0.3);
        assert!(matches!(verdict, Verdict::ActionMismatch { recorded, .. } if recorded.is_empty()));
    }

    #[test]
    fn test_invalid_reason_defaults_when_unreported() {
        let mut a = assessment(false, None, 0.0);
        a.token_properties.invalid_reason = None;
        let verdict = evaluate(&a, "login", 0.3);
        assert!(matches!(
            verdict,
            Verdict::InvalidToken { reason } if reason == "INVALID_REASON_UNSPECIFIED"
        ));
    }
}
