//! Tournament HTTP API: roster management, divisions and pairings, and the
//! live match session broadcast to viewer screens.

pub mod config;
pub mod error;
pub mod features;
pub mod session;
pub mod sse;

use axum::{Json, Router, extract::FromRef, routing::get};
use std::sync::Arc;
use storage::Database;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use session::MatchCoordinator;
use sse::Broadcaster;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::competitors::handlers::list_competitors,
        features::competitors::handlers::get_competitor,
        features::competitors::handlers::create_competitor,
        features::competitors::handlers::update_competitor,
        features::competitors::handlers::delete_competitor,
        features::competitors::handlers::import_roster,
        features::divisions::handlers::get_divisions,
        features::divisions::handlers::get_pairings,
        features::matches::handlers::list_matches,
        features::matches::handlers::get_match,
        features::matches::handlers::record_match,
        features::matches::handlers::delete_match,
        features::session::handlers::get_session,
        features::session::handlers::start_session,
        features::session::handlers::pause_session,
        features::session::handlers::resume_session,
        features::session::handlers::record_winner,
        features::session::handlers::subscribe_events,
    ),
    components(
        schemas(
            storage::dto::competitor::CompetitorResponse,
            storage::dto::competitor::CreateCompetitorRequest,
            storage::dto::competitor::UpdateCompetitorRequest,
            storage::dto::match_up::MatchContext,
            storage::models::Category,
            storage::models::Gender,
            storage::models::MatchUp,
            storage::services::division::DivisionTree,
            storage::services::pairing::PairingPlan,
            features::competitors::handlers::ImportResponse,
            features::matches::handlers::MatchRecorded,
            features::session::handlers::TimerCommand,
            features::session::handlers::RecordWinnerRequest,
            features::session::handlers::CommandAck,
            session::SessionSnapshot,
            session::SessionPhase,
        )
    ),
    tags(
        (name = "competitors", description = "Roster management"),
        (name = "divisions", description = "Division classification and pairing"),
        (name = "matches", description = "Match-up history"),
        (name = "session", description = "Live match session and viewer stream"),
    )
)]
pub struct ApiDoc;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub coordinator: MatchCoordinator,
    pub broadcaster: Broadcaster,
}

impl AppState {
    pub fn new(db: Database, broadcaster: Broadcaster) -> Self {
        let coordinator = MatchCoordinator::new(broadcaster.clone(), Arc::new(db.clone()));
        Self {
            db,
            coordinator,
            broadcaster,
        }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for MatchCoordinator {
    fn from_ref(state: &AppState) -> Self {
        state.coordinator.clone()
    }
}

impl FromRef<AppState> for Broadcaster {
    fn from_ref(state: &AppState) -> Self {
        state.broadcaster.clone()
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/competitors", features::competitors::routes())
        .nest("/matches", features::matches::routes())
        .merge(features::divisions::routes())
        .merge(features::session::routes());

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
