// handlers/protected/questions/create.rs - POST /api/questions handler

use axum::extract::{Extension, State};
use serde::Deserialize;
use validator::Validate;

use crate::app::AppState;
use crate::database::models::{NewQuestion, QuestionView};
use crate::handlers::extract::{parse_difficulty, trimmed, ValidatedJson};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 10, message = "Question must be at least 10 characters"))]
    pub question_text: String,

    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Company is required"))]
    pub company: String,

    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Topic is required"))]
    pub topic: String,

    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,

    #[serde(deserialize_with = "trimmed")]
    pub difficulty: String,
}

/// POST /api/questions - Submit a question owned by the caller
pub async fn question_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<CreateQuestionRequest>,
) -> ApiResult<QuestionView> {
    let difficulty = parse_difficulty(&body.difficulty)?;
    let question = state
        .questions
        .create(
            NewQuestion {
                question_text: body.question_text,
                company: body.company,
                topic: body.topic,
                role: body.role,
                difficulty,
                submitted_by: None,
            },
            &user,
        )
        .await?;

    Ok(ApiResponse::created(question).message("Question created successfully"))
}
