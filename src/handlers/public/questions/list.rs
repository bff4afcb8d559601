// handlers/public/questions/list.rs - GET /api/questions handler

use axum::extract::State;

use crate::app::AppState;
use crate::handlers::extract::ValidatedQuery;
use crate::database::models::QuestionView;
use crate::filter::FilterData;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/questions - Filtered, sorted, paginated listing
///
/// Query: company, topic, role, difficulty, sort, fromDate, toDate, page, limit.
/// `count` is the size of the whole filtered set, `pages` the page count at this limit.
pub async fn questions_list(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<FilterData>,
) -> ApiResult<Vec<QuestionView>> {
    let page = state.questions.list(params).await?;

    Ok(ApiResponse::success(page.items)
        .meta("count", page.total)
        .meta("page", page.page)
        .meta("pages", page.pages))
}
