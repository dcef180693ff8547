use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{
    get_session, pause_session, record_winner, resume_session, start_session, subscribe_events,
};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/start", post(start_session))
        .route("/session/pause", post(pause_session))
        .route("/session/resume", post(resume_session))
        .route("/session/winner", post(record_winner))
        .route("/topics/:topic/events", get(subscribe_events))
}
