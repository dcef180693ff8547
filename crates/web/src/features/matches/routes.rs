use axum::{Router, routing::get};

use super::handlers::{delete_match, get_match, list_matches, record_match};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_matches).post(record_match))
        .route("/:id", get(get_match).delete(delete_match))
}
