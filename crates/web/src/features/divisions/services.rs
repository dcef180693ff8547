use sqlx::SqlitePool;
use storage::{
    error::Result,
    models::Category,
    repository::competitor::CompetitorRepository,
    services::{
        division::{self, DivisionTree},
        pairing::{self, PairingPlan},
    },
};

/// Classify the current roster of one category. Always re-derived from the store.
pub async fn divisions_for(pool: &SqlitePool, category: Category) -> Result<DivisionTree> {
    let repo = CompetitorRepository::new(pool);
    let competitors = repo.list_by_category(category).await?;

    Ok(division::classify(&competitors))
}

/// Candidate match-ups for every bucket of one category
pub async fn pairings_for(pool: &SqlitePool, category: Category) -> Result<PairingPlan> {
    let tree = divisions_for(pool, category).await?;

    Ok(pairing::pair_divisions(&tree))
}
