//! `/stats/*` handlers

use axum::extract::State;
use axum::Json;

use crate::dto::AssignmentStatsResponse;
use crate::error::ApiResult;
use crate::routes::AppState;

/// `GET /stats/assignments`
pub async fn assignments(
    State(state): State<AppState>,
) -> ApiResult<Json<AssignmentStatsResponse>> {
    let stats = state.services.pull_requests.assignment_stats().await?;
    Ok(Json(stats.into()))
}
