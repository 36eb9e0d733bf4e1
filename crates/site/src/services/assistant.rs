//! Assistant flows: chat answers and semantic search.
//!
//! Both flows are single-shot template-filling calls to the hosted model.
//! The chat prompt carries a literal retrieval placeholder - there is no
//! retrieval index here, and the contract is to pass the query through and
//! return the model's structured output. Relevance ranking for search is
//! wholly delegated to the model as well.

use askama::Template;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::gemini::{GeminiClient, GeminiError};
use crate::models::chat::Transcript;

/// A visitor's chat question.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatQuery {
    /// The question text.
    pub query: String,
    /// Prior turns from the widget session, oldest first.
    #[serde(default)]
    pub history: Transcript,
}

/// The assistant's structured answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnswer {
    /// The answer text.
    pub answer: String,
    /// Pages the answer drew from.
    pub sources: Vec<String>,
    /// Model-reported confidence in [0, 1] (documented, not enforced).
    pub confidence: f64,
}

/// A semantic search request with caller-supplied context corpora.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// The search text.
    pub query: String,
    /// Product catalog entries, when the caller has them.
    #[serde(default)]
    pub product_catalog: Option<Vec<String>>,
    /// Service descriptions.
    #[serde(default)]
    pub service_list: Option<Vec<String>>,
    /// Resource library entries.
    #[serde(default)]
    pub resource_library: Option<Vec<String>>,
    /// Blog post summaries.
    #[serde(default)]
    pub blog_content: Option<Vec<String>>,
}

/// Ranked search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Matching entries, best first.
    pub search_results: Vec<String>,
}

/// Errors that can occur in the assistant flows.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// The query was empty or whitespace.
    #[error("query must not be empty")]
    EmptyQuery,

    /// Prompt template rendering failed.
    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    /// The model call failed or its output failed schema validation.
    #[error("model error: {0}")]
    Gemini(#[from] GeminiError),
}

/// Chat prompt with the retrieval placeholder.
#[derive(Template)]
#[template(path = "prompts/chat_prompt.txt")]
struct ChatPromptTemplate<'a> {
    query: &'a str,
    history: &'a Transcript,
}

/// Search prompt; absent corpora render their fallback lines.
#[derive(Template)]
#[template(path = "prompts/search_prompt.txt")]
struct SearchPromptTemplate<'a> {
    query: &'a str,
    product_catalog: &'a Option<Vec<String>>,
    service_list: &'a Option<Vec<String>>,
    resource_library: &'a Option<Vec<String>>,
    blog_content: &'a Option<Vec<String>>,
}

/// Response schema for the chat flow.
fn chat_answer_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "answer": { "type": "string" },
            "sources": { "type": "array", "items": { "type": "string" } },
            "confidence": { "type": "number" }
        },
        "required": ["answer", "sources", "confidence"]
    })
}

/// Response schema for the search flow.
fn search_result_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "searchResults": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["searchResults"]
    })
}

/// Assistant service over the Gemini client.
#[derive(Clone)]
pub struct Assistant {
    gemini: GeminiClient,
}

impl Assistant {
    /// Create a new assistant.
    #[must_use]
    pub const fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }

    /// Answer a chat question.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::EmptyQuery` for a blank question and
    /// `AssistantError::Gemini` when the model call fails or its output
    /// does not match the answer schema.
    #[instrument(skip(self, request))]
    pub async fn answer(&self, request: &ChatQuery) -> Result<ChatAnswer, AssistantError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(AssistantError::EmptyQuery);
        }

        let prompt = ChatPromptTemplate {
            query,
            history: &request.history,
        }
        .render()?;
        let answer = self
            .gemini
            .generate_structured::<ChatAnswer>(&prompt, chat_answer_schema())
            .await?;

        Ok(answer)
    }

    /// Rank caller-supplied content against a search query.
    ///
    /// Absent context arrays are rendered as fixed fallback lines; calling
    /// with no context at all is valid and must not fail.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::EmptyQuery` for a blank query and
    /// `AssistantError::Gemini` for model failures.
    #[instrument(skip(self, request))]
    pub async fn search(&self, request: &SearchQuery) -> Result<SearchResult, AssistantError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(AssistantError::EmptyQuery);
        }

        let prompt = SearchPromptTemplate {
            query,
            product_catalog: &request.product_catalog,
            service_list: &request.service_list,
            resource_library: &request.resource_library,
            blog_content: &request.blog_content,
        }
        .render()?;

        let result = self
            .gemini
            .generate_structured::<SearchResult>(&prompt, search_result_schema())
            .await?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_prompt_contains_query_and_placeholder() {
        let prompt = ChatPromptTemplate {
            query: "Do you offer red-team engagements?",
            history: &Transcript::new(),
        }
        .render()
        .expect("render");

        assert!(prompt.contains("Do you offer red-team engagements?"));
        // The retrieval step is intentionally unimplemented; the placeholder
        // must survive verbatim.
        assert!(prompt.contains("[Website Content Placeholder"));
        assert!(!prompt.contains("Conversation so far:"));
    }

    #[test]
    fn test_chat_prompt_inlines_history() {
        use crate::models::chat::ChatMessage;

        let mut history = Transcript::new();
        history.push(ChatMessage::user("Do you sell EDR?"));
        history.push(ChatMessage::bot("Yes, ThreatLens EDR."));

        let prompt = ChatPromptTemplate {
            query: "What does it cost?",
            history: &history,
        }
        .render()
        .expect("render");

        assert!(prompt.contains("Conversation so far:"));
        assert!(prompt.contains("user: Do you sell EDR?"));
        assert!(prompt.contains("bot: Yes, ThreatLens EDR."));
        assert!(prompt.contains("Question: What does it cost?"));
    }

    #[test]
    fn test_search_prompt_renders_fallbacks_when_no_context() {
        let prompt = SearchPromptTemplate {
            query: "incident response",
            product_catalog: &None,
            service_list: &None,
            resource_library: &None,
            blog_content: &None,
        }
        .render()
        .expect("render");

        assert!(prompt.contains("No product catalog provided."));
        assert!(prompt.contains("No service list provided."));
        assert!(prompt.contains("No resource library provided."));
        assert!(prompt.contains("No blog content provided."));
    }

    #[test]
    fn test_search_prompt_inlines_supplied_context() {
        let catalog = Some(vec![
            "ThreatLens EDR".to_string(),
            "PerimeterWatch NDR".to_string(),
        ]);
        let prompt = SearchPromptTemplate {
            query: "endpoint detection",
            product_catalog: &catalog,
            service_list: &None,
            resource_library: &None,
            blog_content: &None,
        }
        .render()
        .expect("render");

        assert!(prompt.contains("- ThreatLens EDR"));
        assert!(prompt.contains("- PerimeterWatch NDR"));
        assert!(!prompt.contains("No product catalog provided."));
        assert!(prompt.contains("No service list provided."));
    }

    #[test]
    fn test_search_query_accepts_minimal_body() {
        // The wire contract allows a bare query with every corpus omitted.
        let query: SearchQuery = serde_json::from_str(r#"{"query":"x"}"#).expect("deserialize");
        assert_eq!(query.query, "x");
        assert!(query.product_catalog.is_none());
    }

    #[test]
    fn test_search_result_wire_casing() {
        let result = SearchResult {
            search_results: vec!["a".to_string()],
        };
        let json = serde_json::to_string(&result).expect("serialize");
        assert_eq!(json, r#"{"searchResults":["a"]}"#);
    }

    #[test]
    fn test_chat_answer_round_trip() {
        let json = r#"{"answer":"Yes.","sources":["/services/red-team"],"confidence":0.82}"#;
        let answer: ChatAnswer = serde_json::from_str(json).expect("deserialize");
        assert_eq!(answer.sources.len(), 1);
        assert!((answer.confidence - 0.82).abs() < f64::EPSILON);
    }

    #[test]
    fn test_schemas_require_all_fields() {
        let chat = chat_answer_schema();
        assert_eq!(chat["required"].as_array().expect("array").len(), 3);

        let search = search_result_schema();
        assert_eq!(search["required"][0], "searchResults");
    }
}
