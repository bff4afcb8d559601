// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::extract::State;
use serde::Deserialize;
use validator::Validate;

use crate::app::AppState;
use crate::handlers::extract::{trimmed, ValidatedJson};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AuthSession;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// POST /api/auth/login - Exchange credentials for a token
///
/// Unknown email and wrong password produce the same 401.
pub async fn login_post(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> ApiResult<AuthSession> {
    let session = state.auth.login(&body.email, &body.password).await?;
    Ok(ApiResponse::success(session).message("Login successful"))
}
