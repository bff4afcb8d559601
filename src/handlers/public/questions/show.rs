// handlers/public/questions/show.rs - GET /api/questions/:id handler

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::database::models::QuestionView;
use crate::handlers::extract::parse_question_id;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/questions/:id - Single question with submitter name
pub async fn question_show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<QuestionView> {
    let id = parse_question_id(&id)?;
    let question = state.questions.get(id).await?;
    Ok(ApiResponse::success(question).message("Question fetched successfully"))
}
