use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use storage::{Database, dto::match_up::MatchContext, models::MatchUp};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::session::MatchCoordinator;

use super::services;

/// Acknowledgement for a registered match-up
#[derive(Debug, Serialize, ToSchema)]
pub struct MatchRecorded {
    pub status: String,
    pub match_up_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/matches",
    responses(
        (status = 200, description = "Recorded match-ups, oldest first", body = Vec<MatchUp>)
    ),
    tag = "matches"
)]
pub async fn list_matches(State(db): State<Database>) -> Result<Response, WebError> {
    let match_ups = services::list_match_ups(db.pool()).await?;

    Ok(Json(match_ups).into_response())
}

#[utoipa::path(
    get,
    path = "/api/matches/{id}",
    params(
        ("id" = Uuid, Path, description = "Match-up ID")
    ),
    responses(
        (status = 200, description = "Match-up found", body = MatchUp),
        (status = 404, description = "Match-up not found")
    ),
    tag = "matches"
)]
pub async fn get_match(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let match_up = services::get_match_up(db.pool(), id).await?;

    Ok(Json(match_up).into_response())
}

#[utoipa::path(
    post,
    path = "/api/matches",
    request_body = MatchContext,
    responses(
        (status = 200, description = "Match-up registered and pushed to viewers", body = MatchRecorded),
        (status = 400, description = "Validation error")
    ),
    tag = "matches"
)]
pub async fn record_match(
    State(coordinator): State<MatchCoordinator>,
    Json(context): Json<MatchContext>,
) -> Result<Response, WebError> {
    context.validate()?;

    let match_up = coordinator.record_match(context).await?;

    Ok(Json(MatchRecorded {
        status: "ok".to_string(),
        match_up_id: match_up.match_up_id,
    })
    .into_response())
}

#[utoipa::path(
    delete,
    path = "/api/matches/{id}",
    params(
        ("id" = Uuid, Path, description = "Match-up ID")
    ),
    responses(
        (status = 204, description = "Match-up deleted"),
        (status = 404, description = "Match-up not found")
    ),
    tag = "matches"
)]
pub async fn delete_match(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_match_up(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
