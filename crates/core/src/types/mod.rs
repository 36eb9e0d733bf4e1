//! Core types for Sentryline.
//!
//! This module provides type-safe wrappers for common domain concepts.

mod email;
mod provider;
mod score;
mod uid;

pub use email::{Email, EmailError};
pub use provider::AuthProvider;
pub use score::{RiskScore, RiskScoreError};
pub use uid::{Uid, UidError};
