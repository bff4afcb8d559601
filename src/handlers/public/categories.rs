// handlers/public/categories.rs - GET /api/categories handler

use axum::extract::State;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Categories;

/// GET /api/categories - Distinct topics, companies and roles, sorted
pub async fn categories_get(State(state): State<AppState>) -> ApiResult<Categories> {
    let categories = state.questions.categories().await?;
    Ok(ApiResponse::success(categories))
}
