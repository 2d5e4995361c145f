//! `/team/*` handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::dto::{TeamDto, TeamQuery, TeamResponse};
use crate::error::{ApiError, ApiJson, ApiQuery, ApiResult};
use crate::routes::AppState;

/// `POST /team/add`
pub async fn add_team(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TeamDto>,
) -> ApiResult<(StatusCode, Json<TeamResponse>)> {
    if !body.is_valid() {
        return Err(ApiError::invalid("team_name and members are required"));
    }

    let team = state.services.teams.create_team(body.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(TeamResponse {
            team: TeamDto::from(&team),
        }),
    ))
}

/// `GET /team/get?team_name=`
pub async fn get_team(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TeamQuery>,
) -> ApiResult<Json<TeamDto>> {
    if query.team_name.is_empty() {
        return Err(ApiError::invalid("team_name query parameter is required"));
    }

    let team = state.services.teams.get_team(&query.team_name).await?;
    Ok(Json(TeamDto::from(&team)))
}
