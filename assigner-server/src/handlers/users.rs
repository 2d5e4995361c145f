//! `/users/*` handlers

use axum::extract::State;
use axum::Json;

use crate::dto::{
    PullRequestShortDto, SetActiveRequest, UserQuery, UserResponse, UserReviewsResponse,
};
use crate::error::{ApiError, ApiJson, ApiQuery, ApiResult};
use crate::routes::AppState;

/// `POST /users/setIsActive`
pub async fn set_is_active(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SetActiveRequest>,
) -> ApiResult<Json<UserResponse>> {
    if body.user_id.is_empty() {
        return Err(ApiError::invalid("user_id is required"));
    }

    let detail = state
        .services
        .users
        .set_active(&body.user_id, body.is_active)
        .await?;

    Ok(Json(UserResponse {
        user: detail.into(),
    }))
}

/// `GET /users/getReview?user_id=`
pub async fn get_review(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> ApiResult<Json<UserReviewsResponse>> {
    if query.user_id.is_empty() {
        return Err(ApiError::invalid("user_id query parameter is required"));
    }

    let reviews = state.services.users.reviews(&query.user_id).await?;
    Ok(Json(UserReviewsResponse {
        user_id: query.user_id,
        pull_requests: reviews.into_iter().map(PullRequestShortDto::from).collect(),
    }))
}
