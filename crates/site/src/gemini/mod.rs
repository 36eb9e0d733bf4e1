//! Gemini API client for structured generation.
//!
//! The assistant flows constrain the model to a JSON response schema and
//! decode its output into typed results; this module owns the wire types and
//! the HTTP client for the Generative Language API.

mod client;
mod error;
mod types;

pub use client::GeminiClient;
pub use error::{ApiErrorResponse, GeminiError};
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    UsageMetadata,
};
