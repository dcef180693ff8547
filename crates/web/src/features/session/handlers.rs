use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use storage::dto::match_up::MatchContext;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::WebError;
use crate::session::{MatchCoordinator, SessionSnapshot};
use crate::sse::Broadcaster;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TimerCommand {
    #[serde(alias = "remainingSeconds")]
    pub remaining_seconds: u32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordWinnerRequest {
    #[validate(length(min = 1, max = 255, message = "winner is required"))]
    pub winner: String,

    #[serde(rename = "match", alias = "matchContext")]
    #[validate(nested)]
    pub match_context: MatchContext,
}

/// Acknowledgement returned by every operator command
#[derive(Debug, Serialize, ToSchema)]
pub struct CommandAck {
    pub status: String,
}

impl CommandAck {
    fn ok() -> Json<Self> {
        Json(Self {
            status: "ok".to_string(),
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Current timer and pending match-up", body = SessionSnapshot)
    ),
    tag = "session"
)]
pub async fn get_session(State(coordinator): State<MatchCoordinator>) -> Json<SessionSnapshot> {
    Json(coordinator.snapshot().await)
}

#[utoipa::path(
    post,
    path = "/api/session/start",
    request_body = TimerCommand,
    responses(
        (status = 200, description = "Countdown started", body = CommandAck)
    ),
    tag = "session"
)]
pub async fn start_session(
    State(coordinator): State<MatchCoordinator>,
    Json(command): Json<TimerCommand>,
) -> Json<CommandAck> {
    coordinator.start(command.remaining_seconds).await;
    CommandAck::ok()
}

#[utoipa::path(
    post,
    path = "/api/session/pause",
    request_body = TimerCommand,
    responses(
        (status = 200, description = "Countdown paused at the given value", body = CommandAck)
    ),
    tag = "session"
)]
pub async fn pause_session(
    State(coordinator): State<MatchCoordinator>,
    Json(command): Json<TimerCommand>,
) -> Json<CommandAck> {
    coordinator.pause(command.remaining_seconds).await;
    CommandAck::ok()
}

#[utoipa::path(
    post,
    path = "/api/session/resume",
    request_body = TimerCommand,
    responses(
        (status = 200, description = "Countdown resumed from the given value", body = CommandAck)
    ),
    tag = "session"
)]
pub async fn resume_session(
    State(coordinator): State<MatchCoordinator>,
    Json(command): Json<TimerCommand>,
) -> Json<CommandAck> {
    coordinator.resume(command.remaining_seconds).await;
    CommandAck::ok()
}

#[utoipa::path(
    post,
    path = "/api/session/winner",
    request_body = RecordWinnerRequest,
    responses(
        (status = 200, description = "Winner recorded and session finished", body = CommandAck),
        (status = 400, description = "Validation error"),
        (status = 409, description = "A winner was already recorded for this match-up")
    ),
    tag = "session"
)]
pub async fn record_winner(
    State(coordinator): State<MatchCoordinator>,
    Json(req): Json<RecordWinnerRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    coordinator
        .record_winner(req.winner.trim(), &req.match_context)
        .await?;

    Ok(CommandAck::ok().into_response())
}

#[utoipa::path(
    get,
    path = "/api/topics/{topic}/events",
    params(
        ("topic" = String, Path, description = "Broadcast topic name")
    ),
    responses(
        (status = 200, description = "Server-sent event stream of session events", content_type = "text/event-stream"),
        (status = 404, description = "Unknown topic")
    ),
    tag = "session"
)]
pub async fn subscribe_events(
    State(broadcaster): State<Broadcaster>,
    Path(topic): Path<String>,
) -> Result<Response, WebError> {
    if topic != broadcaster.topic() {
        return Err(WebError::NotFound(format!("Unknown topic '{}'", topic)));
    }

    Ok(broadcaster.sse_response().into_response())
}
