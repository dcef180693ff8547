use async_trait::async_trait;
use storage::Database;
use storage::dto::match_up::MatchContext;
use storage::error::Result;
use storage::models::MatchUp;
use storage::repository::match_up::{MatchUpRepository, SettledMatch};
use uuid::Uuid;

/// Where the coordinator keeps the history of bouts and credits wins.
#[async_trait]
pub trait MatchLedger: Send + Sync {
    async fn open_match(&self, context: &MatchContext) -> Result<MatchUp>;

    /// Record `winner` for the bout, settling `match_up_id` if the bout was
    /// opened earlier.
    async fn settle_match(
        &self,
        match_up_id: Option<Uuid>,
        context: &MatchContext,
        winner: &str,
    ) -> Result<SettledMatch>;
}

#[async_trait]
impl MatchLedger for Database {
    async fn open_match(&self, context: &MatchContext) -> Result<MatchUp> {
        MatchUpRepository::new(self.pool()).create(context).await
    }

    async fn settle_match(
        &self,
        match_up_id: Option<Uuid>,
        context: &MatchContext,
        winner: &str,
    ) -> Result<SettledMatch> {
        MatchUpRepository::new(self.pool())
            .settle(match_up_id, context, winner)
            .await
    }
}
