use axum::{Router, routing::get};

use super::handlers::{get_divisions, get_pairings};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/divisions/:category", get(get_divisions))
        .route("/pairings/:category", get(get_pairings))
}
