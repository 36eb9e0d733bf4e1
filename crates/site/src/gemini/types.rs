//! Types for the Gemini API.
//!
//! These types match the Generative Language API `generateContent` format
//! with JSON-schema-constrained output.

use serde::{Deserialize, Serialize};

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns; a single user turn for one-shot flows.
    pub contents: Vec<Content>,
    /// Output constraints.
    pub generation_config: GenerationConfig,
}

/// A content turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// The role of the turn ("user" or "model").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// The parts of the turn.
    pub parts: Vec<Part>,
}

impl Content {
    /// A single-part user turn.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// A text part within a content turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// The text content.
    pub text: String,
}

/// Generation configuration constraining the model output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// MIME type of the response; `application/json` for structured output.
    pub response_mime_type: String,
    /// JSON schema the response must conform to.
    pub response_schema: serde_json::Value,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerationConfig {
    /// Structured-output config for the given response schema.
    #[must_use]
    pub fn json(response_schema: serde_json::Value) -> Self {
        Self {
            response_mime_type: "application/json".to_string(),
            response_schema,
            temperature: None,
        }
    }
}

/// Response from `generateContent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates; the first is used.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Token accounting.
    pub usage_metadata: Option<UsageMetadata>,
}

/// A generated candidate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The candidate's content; absent when generation was blocked.
    pub content: Option<Content>,
    /// Why generation stopped (e.g., `STOP`, `MAX_TOKENS`, `SAFETY`).
    pub finish_reason: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Number of prompt tokens.
    pub prompt_token_count: Option<u32>,
    /// Number of generated tokens.
    pub candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// The first text part of the first candidate, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.first())
            .map(|part| part.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content::user("hello")],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: serde_json::json!({"type": "object"}),
                temperature: None,
            },
        };

        let json = serde_json::to_string(&request).expect("serialize");
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"responseMimeType\""));
        assert!(json.contains("\"responseSchema\""));
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn test_response_first_text() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "{\"answer\":\"hi\"}"}]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 5}
        }"#;

        let response: GenerateContentResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(response.first_text(), Some("{\"answer\":\"hi\"}"));
    }

    #[test]
    fn test_response_first_text_absent_when_blocked() {
        let json = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(response.first_text(), None);
    }

    #[test]
    fn test_response_no_candidates() {
        let json = "{}";
        let response: GenerateContentResponse = serde_json::from_str(json).expect("deserialize");
        assert!(response.candidates.is_empty());
        assert_eq!(response.first_text(), None);
    }
}
