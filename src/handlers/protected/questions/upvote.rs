// handlers/protected/questions/upvote.rs - POST /api/questions/:id/upvote handler

use axum::extract::{Extension, Path, State};

use crate::app::AppState;
use crate::handlers::extract::parse_question_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::UpvoteSummary;

/// POST /api/questions/:id/upvote - Toggle the caller's upvote
pub async fn question_upvote(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<UpvoteSummary> {
    let id = parse_question_id(&id)?;
    let summary = state.questions.toggle_upvote(id, &user).await?;

    let message = if summary.upvoted { "Question upvoted" } else { "Upvote removed" };
    Ok(ApiResponse::success(summary).message(message))
}
