// handlers/public/questions/search.rs - GET /api/questions/search handler

use axum::extract::State;
use serde::Deserialize;

use crate::app::AppState;
use crate::handlers::extract::ValidatedQuery;
use crate::database::models::QuestionView;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/questions/search?q=keyword - Keyword search over text, company and topic
pub async fn questions_search(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> ApiResult<Vec<QuestionView>> {
    let questions = state.questions.search(&query.q).await?;

    let message = if questions.is_empty() {
        "No questions found"
    } else {
        "Questions fetched successfully"
    };
    let count = questions.len();
    Ok(ApiResponse::success(questions).message(message).meta("count", count))
}
