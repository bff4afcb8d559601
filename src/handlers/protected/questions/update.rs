// handlers/protected/questions/update.rs - PUT /api/questions/:id handler

use axum::extract::{Extension, Path, State};
use serde::Deserialize;
use validator::Validate;

use crate::app::AppState;
use crate::database::models::{QuestionChanges, QuestionView};
use crate::handlers::extract::{parse_difficulty, parse_question_id, trimmed_opt, ValidatedJson};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// Only these three fields are editable; anything else in the body is ignored
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 10, message = "Question must be at least 10 characters"))]
    pub question_text: Option<String>,

    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, message = "Topic cannot be empty"))]
    pub topic: Option<String>,

    #[serde(default, deserialize_with = "trimmed_opt")]
    pub difficulty: Option<String>,
}

/// PUT /api/questions/:id - Owner or admin edit
pub async fn question_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateQuestionRequest>,
) -> ApiResult<QuestionView> {
    let id = parse_question_id(&id)?;
    let changes = QuestionChanges {
        question_text: body.question_text,
        topic: body.topic,
        difficulty: body.difficulty.as_deref().map(parse_difficulty).transpose()?,
    };

    let question = state.questions.update(id, changes, &user).await?;
    Ok(ApiResponse::success(question).message("Question updated successfully"))
}
