use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use storage::{
    Database,
    dto::competitor::{CompetitorResponse, CreateCompetitorRequest, UpdateCompetitorRequest},
    models::Category,
};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompetitorFilter {
    /// Restrict to one roster: `minor` or `adult`
    pub category: Option<String>,
}

impl CompetitorFilter {
    fn category(&self) -> Result<Option<Category>, WebError> {
        Ok(self.category.as_deref().map(str::parse::<Category>).transpose()?)
    }
}

/// Outcome of a roster upload
#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    pub imported: usize,
    pub skipped: usize,
    pub warnings: Vec<String>,
}

impl From<importer::ImportReport> for ImportResponse {
    fn from(report: importer::ImportReport) -> Self {
        Self {
            imported: report.imported,
            skipped: report.skipped,
            warnings: report.warnings,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/competitors",
    params(CompetitorFilter),
    responses(
        (status = 200, description = "List competitors in insertion order", body = Vec<CompetitorResponse>),
        (status = 400, description = "Unknown category")
    ),
    tag = "competitors"
)]
pub async fn list_competitors(
    State(db): State<Database>,
    Query(filter): Query<CompetitorFilter>,
) -> Result<Response, WebError> {
    let competitors = services::list_competitors(db.pool(), filter.category()?).await?;

    let response: Vec<CompetitorResponse> = competitors
        .into_iter()
        .map(CompetitorResponse::from)
        .collect();

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitors/{id}",
    params(
        ("id" = Uuid, Path, description = "Competitor ID")
    ),
    responses(
        (status = 200, description = "Competitor found", body = CompetitorResponse),
        (status = 404, description = "Competitor not found")
    ),
    tag = "competitors"
)]
pub async fn get_competitor(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let competitor = services::get_competitor(db.pool(), id).await?;

    Ok(Json(CompetitorResponse::from(competitor)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitors",
    request_body = CreateCompetitorRequest,
    responses(
        (status = 201, description = "Competitor created; the name may carry a suffix if it was taken", body = CompetitorResponse),
        (status = 400, description = "Validation error")
    ),
    tag = "competitors"
)]
pub async fn create_competitor(
    State(db): State<Database>,
    Json(req): Json<CreateCompetitorRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let competitor = services::create_competitor(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(CompetitorResponse::from(competitor))).into_response())
}

#[utoipa::path(
    put,
    path = "/api/competitors/{id}",
    params(
        ("id" = Uuid, Path, description = "Competitor ID")
    ),
    request_body = UpdateCompetitorRequest,
    responses(
        (status = 200, description = "Competitor updated successfully", body = CompetitorResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Competitor not found")
    ),
    tag = "competitors"
)]
pub async fn update_competitor(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(update_req): Json<UpdateCompetitorRequest>,
) -> Result<Response, WebError> {
    update_req.validate()?;

    let updated = services::update_competitor(db.pool(), id, &update_req).await?;

    Ok(Json(CompetitorResponse::from(updated)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/competitors/{id}",
    params(
        ("id" = Uuid, Path, description = "Competitor ID")
    ),
    responses(
        (status = 204, description = "Competitor deleted successfully"),
        (status = 404, description = "Competitor not found")
    ),
    tag = "competitors"
)]
pub async fn delete_competitor(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_competitor(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitors/import",
    request_body(content = String, content_type = "text/csv", description = "Roster export with a header row"),
    responses(
        (status = 200, description = "Roster imported", body = ImportResponse),
        (status = 400, description = "Unreadable file or missing required column")
    ),
    tag = "competitors"
)]
pub async fn import_roster(
    State(db): State<Database>,
    body: Bytes,
) -> Result<Response, WebError> {
    if body.is_empty() {
        return Err(WebError::BadRequest("Roster file is empty".to_string()));
    }

    let report = services::import_roster(db.pool(), &body).await?;

    Ok(Json(ImportResponse::from(report)).into_response())
}
