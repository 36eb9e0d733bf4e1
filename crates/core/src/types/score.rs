//! Fraud-risk score type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`RiskScore`].
#[derive(thiserror::Error, Debug, Clone, Copy)]
pub enum RiskScoreError {
    /// The value is NaN or infinite.
    #[error("risk score must be finite, got {0}")]
    NotFinite(f64),
    /// The value is outside the unit interval.
    #[error("risk score must be in [0, 1], got {0}")]
    OutOfRange(f64),
}

/// A fraud-risk score in `[0, 1]`.
///
/// Reported by the assessment service; lower means more bot-like. The
/// verification endpoint rejects tokens whose score falls strictly below the
/// configured threshold, so a score exactly at the threshold passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskScore(f64);

impl RiskScore {
    /// Construct a `RiskScore` from a raw value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is NaN, infinite, or outside `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, RiskScoreError> {
        if !value.is_finite() {
            return Err(RiskScoreError::NotFinite(value));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(RiskScoreError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Whether this score clears the given threshold (strict `<` rejects).
    #[must_use]
    pub fn passes(self, threshold: f64) -> bool {
        self.0 >= threshold
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_bounds() {
        assert!(RiskScore::new(0.0).is_ok());
        assert!(RiskScore::new(1.0).is_ok());
        assert!(RiskScore::new(0.5).is_ok());
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(matches!(
            RiskScore::new(-0.1),
            Err(RiskScoreError::OutOfRange(_))
        ));
        assert!(matches!(
            RiskScore::new(1.1),
            Err(RiskScoreError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_new_rejects_nan_and_infinity() {
        assert!(matches!(
            RiskScore::new(f64::NAN),
            Err(RiskScoreError::NotFinite(_))
        ));
        assert!(matches!(
            RiskScore::new(f64::INFINITY),
            Err(RiskScoreError::NotFinite(_))
        ));
    }

    #[test]
    fn test_passes_is_inclusive_at_threshold() {
        let at = RiskScore::new(0.3).expect("valid score");
        let below = RiskScore::new(0.29999).expect("valid score");
        assert!(at.passes(0.3));
        assert!(!below.passes(0.3));
    }

    #[test]
    fn test_display_two_decimals() {
        let score = RiskScore::new(0.875).expect("valid score");
        assert_eq!(score.to_string(), "0.88");
    }
}
