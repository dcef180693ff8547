use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    models::Category,
    services::{division::DivisionTree, pairing::PairingPlan},
};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/divisions/{category}",
    params(
        ("category" = String, Path, description = "Roster to classify: minor or adult")
    ),
    responses(
        (status = 200, description = "Competitors grouped by gender, group, discipline and subgroup", body = DivisionTree),
        (status = 400, description = "Unknown category")
    ),
    tag = "divisions"
)]
pub async fn get_divisions(
    State(db): State<Database>,
    Path(category): Path<String>,
) -> Result<Response, WebError> {
    let category: Category = category.parse()?;

    let tree = services::divisions_for(db.pool(), category).await?;

    Ok(Json(tree).into_response())
}

#[utoipa::path(
    get,
    path = "/api/pairings/{category}",
    params(
        ("category" = String, Path, description = "Roster to pair: minor or adult")
    ),
    responses(
        (status = 200, description = "Proposed match-ups and competitors left without a partner", body = PairingPlan),
        (status = 400, description = "Unknown category")
    ),
    tag = "divisions"
)]
pub async fn get_pairings(
    State(db): State<Database>,
    Path(category): Path<String>,
) -> Result<Response, WebError> {
    let category: Category = category.parse()?;

    let plan = services::pairings_for(db.pool(), category).await?;

    Ok(Json(plan).into_response())
}
