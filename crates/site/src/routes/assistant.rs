//! Assistant endpoints: chat and semantic search.

use axum::{Json, extract::State};

use crate::error::Result;
use crate::services::assistant::{ChatAnswer, ChatQuery, SearchQuery, SearchResult};
use crate::state::AppState;

/// `POST /api/assistant/chat`
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatQuery>,
) -> Result<Json<ChatAnswer>> {
    let answer = state.assistant().answer(&request).await?;
    Ok(Json(answer))
}

/// `POST /api/assistant/search`
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchQuery>,
) -> Result<Json<SearchResult>> {
    let result = state.assistant().search(&request).await?;
    Ok(Json(result))
}
