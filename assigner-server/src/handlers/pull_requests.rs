//! `/pullRequest/*` handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::dto::{
    CreatePrRequest, MergeRequest, PullRequestResponse, ReassignRequest, ReassignResponse,
};
use crate::error::{ApiJson, ApiResult};
use crate::routes::AppState;

/// `POST /pullRequest/create`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreatePrRequest>,
) -> ApiResult<(StatusCode, Json<PullRequestResponse>)> {
    let pr = state
        .services
        .pull_requests
        .create_pr(&body.pull_request_id, &body.pull_request_name, &body.author_id)
        .await?;

    Ok((StatusCode::CREATED, Json(PullRequestResponse { pr: pr.into() })))
}

/// `POST /pullRequest/merge`
pub async fn merge(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<MergeRequest>,
) -> ApiResult<Json<PullRequestResponse>> {
    let pr = state
        .services
        .pull_requests
        .merge(&body.pull_request_id)
        .await?;

    Ok(Json(PullRequestResponse { pr: pr.into() }))
}

/// `POST /pullRequest/reassign`
pub async fn reassign(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ReassignRequest>,
) -> ApiResult<Json<ReassignResponse>> {
    let outcome = state
        .services
        .pull_requests
        .reassign_reviewer(&body.pull_request_id, &body.old_reviewer_id)
        .await?;

    Ok(Json(outcome.into()))
}
