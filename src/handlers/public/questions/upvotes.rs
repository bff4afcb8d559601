// handlers/public/questions/upvotes.rs - GET /api/questions/:id/upvotes handler

use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::handlers::extract::parse_question_id;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/questions/:id/upvotes - Current upvote count
pub async fn question_upvotes(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_question_id(&id)?;
    let upvotes = state.questions.upvotes(id).await?;
    Ok(ApiResponse::success(json!({ "upvotes": upvotes })).message("Upvotes fetched successfully"))
}
