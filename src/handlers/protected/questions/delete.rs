// handlers/protected/questions/delete.rs - DELETE /api/questions/:id handler

use axum::extract::{Extension, Path, State};

use crate::app::AppState;
use crate::handlers::extract::parse_question_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// DELETE /api/questions/:id - Owner or admin removal
pub async fn question_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_question_id(&id)?;
    state.questions.delete(id, &user).await?;
    Ok(ApiResponse::message_only("Question deleted"))
}
