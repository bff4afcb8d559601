// handlers/protected/auth/profile.rs - GET /api/auth/profile handler

use axum::extract::{Extension, State};

use crate::app::AppState;
use crate::database::models::PublicUser;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/auth/profile - The caller's own identity
pub async fn profile_get(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<PublicUser> {
    let profile = state.auth.profile(user.id).await?;
    Ok(ApiResponse::success(profile))
}
