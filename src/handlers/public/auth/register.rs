// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::extract::State;
use serde::Deserialize;
use validator::Validate;

use crate::app::AppState;
use crate::handlers::extract::{trimmed, ValidatedJson};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AuthSession, Registration};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,

    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// POST /api/auth/register - Create an account and receive a token
pub async fn register_post(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> ApiResult<AuthSession> {
    let session = state
        .auth
        .register(Registration {
            name: body.name,
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(ApiResponse::created(session).message("User registered successfully"))
}
