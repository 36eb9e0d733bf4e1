//! reCAPTCHA Enterprise assessment client and verdict logic.
//!
//! The endpoint forwards a frontend token to the assessment API and applies
//! a fixed decision order: token validity, action match, then score
//! threshold. The decision itself is a pure function over the assessment so
//! it can be tested without network access.

mod client;
mod decision;
mod error;
mod types;

pub use client::RecaptchaClient;
pub use decision::{Verdict, evaluate};
pub use error::RecaptchaError;
pub use types::{Assessment, RiskAnalysis, TokenProperties};
