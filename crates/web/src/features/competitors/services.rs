use chrono::{Local, NaiveDate};
use importer::{CsvRosterImporter, ImportContext, ImportReport, RosterImporter};
use sqlx::SqlitePool;
use storage::{
    dto::competitor::{CreateCompetitorRequest, UpdateCompetitorRequest},
    error::Result,
    models::{Category, Competitor},
    repository::competitor::CompetitorRepository,
};
use uuid::Uuid;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// List competitors, optionally restricted to one category
pub async fn list_competitors(pool: &SqlitePool, category: Option<Category>) -> Result<Vec<Competitor>> {
    let repo = CompetitorRepository::new(pool);
    match category {
        Some(category) => repo.list_by_category(category).await,
        None => repo.list().await,
    }
}

pub async fn get_competitor(pool: &SqlitePool, id: Uuid) -> Result<Competitor> {
    let repo = CompetitorRepository::new(pool);
    repo.find_by_id(id).await
}

pub async fn create_competitor(pool: &SqlitePool, request: &CreateCompetitorRequest) -> Result<Competitor> {
    let repo = CompetitorRepository::new(pool);
    repo.create(request, today()).await
}

pub async fn update_competitor(
    pool: &SqlitePool,
    id: Uuid,
    request: &UpdateCompetitorRequest,
) -> Result<Competitor> {
    let repo = CompetitorRepository::new(pool);

    let existing = repo.find_by_id(id).await?;
    repo.update(&existing, request, today()).await
}

pub async fn delete_competitor(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let repo = CompetitorRepository::new(pool);
    repo.delete(id).await
}

/// Import a CSV roster export into the store
pub async fn import_roster(pool: &SqlitePool, data: &[u8]) -> importer::Result<ImportReport> {
    let context = ImportContext::new(pool.clone());
    CsvRosterImporter::new().import(data, &context).await
}
