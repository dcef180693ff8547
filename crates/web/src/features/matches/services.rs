use sqlx::SqlitePool;
use storage::{error::Result, models::MatchUp, repository::match_up::MatchUpRepository};
use uuid::Uuid;

/// All recorded match-ups, oldest first
pub async fn list_match_ups(pool: &SqlitePool) -> Result<Vec<MatchUp>> {
    let repo = MatchUpRepository::new(pool);
    repo.list().await
}

pub async fn get_match_up(pool: &SqlitePool, id: Uuid) -> Result<MatchUp> {
    let repo = MatchUpRepository::new(pool);
    repo.find_by_id(id).await
}

pub async fn delete_match_up(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let repo = MatchUpRepository::new(pool);
    repo.delete(id).await
}
