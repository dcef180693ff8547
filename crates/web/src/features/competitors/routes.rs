use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{
    create_competitor, delete_competitor, get_competitor, import_roster, list_competitors,
    update_competitor,
};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_competitors).post(create_competitor))
        .route("/import", post(import_roster))
        .route(
            "/:id",
            get(get_competitor)
                .put(update_competitor)
                .delete(delete_competitor),
        )
}
