use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::competitor::increment_wins_on;
use crate::dto::match_up::MatchContext;
use crate::error::{Result, StorageError};
use crate::models::{Competitor, MatchUp};

const MATCH_UP_COLUMNS: &str = "match_up_id, player1, player2, gender, group_label, program, \
     subgroup, school, winner, created_at, decided_at";

/// Outcome of stamping a winner on a match-up.
#[derive(Debug, Clone)]
pub struct SettledMatch {
    pub match_up: MatchUp,
    /// Roster entry whose win count was incremented, if the winner is on the roster.
    pub winner: Option<Competitor>,
}

pub struct MatchUpRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MatchUpRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all match-ups, oldest first
    pub async fn list(&self) -> Result<Vec<MatchUp>> {
        let match_ups = sqlx::query_as::<_, MatchUp>(&format!(
            "SELECT {MATCH_UP_COLUMNS} FROM match_ups ORDER BY rowid"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(match_ups)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<MatchUp> {
        sqlx::query_as::<_, MatchUp>(&format!(
            "SELECT {MATCH_UP_COLUMNS} FROM match_ups WHERE match_up_id = ?1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound("Match-up"))
    }

    /// Register an undecided match-up
    pub async fn create(&self, context: &MatchContext) -> Result<MatchUp> {
        let match_up = sqlx::query_as::<_, MatchUp>(&format!(
            "INSERT INTO match_ups (match_up_id, player1, player2, gender, group_label, program, subgroup, school) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
             RETURNING {MATCH_UP_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&context.player1)
        .bind(&context.player2)
        .bind(context.gender.as_deref())
        .bind(&context.group)
        .bind(&context.program)
        .bind(context.subgroup.as_deref())
        .bind(context.school.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(match_up)
    }

    /// Stamp the winner and credit the win in one transaction.
    ///
    /// With `match_up_id` the existing record is settled; a record that already
    /// has a winner is left untouched and a constraint violation is returned.
    /// Without it a decided record is created from `context`.
    pub async fn settle(
        &self,
        match_up_id: Option<Uuid>,
        context: &MatchContext,
        winner: &str,
    ) -> Result<SettledMatch> {
        let mut tx = self.pool.begin().await?;
        let decided_at = Utc::now().naive_utc();

        let match_up = match match_up_id {
            Some(id) => {
                let stamped = sqlx::query_as::<_, MatchUp>(&format!(
                    "UPDATE match_ups SET winner = ?2, decided_at = ?3 \
                     WHERE match_up_id = ?1 AND winner IS NULL \
                     RETURNING {MATCH_UP_COLUMNS}"
                ))
                .bind(id)
                .bind(winner)
                .bind(decided_at)
                .fetch_optional(&mut *tx)
                .await?;

                match stamped {
                    Some(match_up) => match_up,
                    None => {
                        let exists = sqlx::query_scalar::<_, bool>(
                            "SELECT EXISTS(SELECT 1 FROM match_ups WHERE match_up_id = ?1)",
                        )
                        .bind(id)
                        .fetch_one(&mut *tx)
                        .await?;

                        tx.rollback().await?;
                        return Err(if exists {
                            StorageError::ConstraintViolation(
                                "A winner has already been recorded for this match".to_string(),
                            )
                        } else {
                            StorageError::NotFound("Match-up")
                        });
                    }
                }
            }
            None => {
                sqlx::query_as::<_, MatchUp>(&format!(
                    "INSERT INTO match_ups (match_up_id, player1, player2, gender, group_label, program, \
                     subgroup, school, winner, decided_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
                     RETURNING {MATCH_UP_COLUMNS}"
                ))
                .bind(Uuid::new_v4())
                .bind(&context.player1)
                .bind(&context.player2)
                .bind(context.gender.as_deref())
                .bind(&context.group)
                .bind(&context.program)
                .bind(context.subgroup.as_deref())
                .bind(context.school.as_deref())
                .bind(winner)
                .bind(decided_at)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let competitor = increment_wins_on(&mut tx, winner).await?;
        if competitor.is_none() {
            tracing::warn!("Winner '{}' is not on the roster, no win count updated", winner);
        }

        tx.commit().await?;

        Ok(SettledMatch {
            match_up,
            winner: competitor,
        })
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM match_ups WHERE match_up_id = ?1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Match-up"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::dto::competitor::CreateCompetitorRequest;
    use crate::models::{Category, Gender};
    use crate::repository::competitor::CompetitorRepository;
    use chrono::NaiveDate;

    fn context() -> MatchContext {
        MatchContext {
            player1: "Alice".to_string(),
            player2: "Beth".to_string(),
            gender: Some("f".to_string()),
            group: "少儿组".to_string(),
            program: "组手".to_string(),
            subgroup: Some("A".to_string()),
            school: Some("Dojo East".to_string()),
        }
    }

    async fn seed(db: &Database, name: &str, category: Category) -> Competitor {
        let req = CreateCompetitorRequest {
            name: name.to_string(),
            gender: Gender::Female,
            birth_date: None,
            group_label: "少儿组".to_string(),
            program: "组手A".to_string(),
            school: Some("Dojo East".to_string()),
            district: None,
            emergency_contact: None,
            category: Some(category),
        };
        CompetitorRepository::new(db.pool())
            .create(&req, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_settle_pending_match_credits_winner_once() {
        let db = Database::in_memory().await.unwrap();
        let alice = seed(&db, "Alice", Category::Minor).await;
        let repo = MatchUpRepository::new(db.pool());

        let pending = repo.create(&context()).await.unwrap();
        assert!(!pending.is_decided());

        let settled = repo
            .settle(Some(pending.match_up_id), &context(), "Alice")
            .await
            .unwrap();
        assert_eq!(settled.match_up.winner.as_deref(), Some("Alice"));
        assert!(settled.match_up.decided_at.is_some());
        assert_eq!(settled.winner.as_ref().unwrap().competitor_id, alice.competitor_id);
        assert_eq!(settled.winner.unwrap().win_count, 1);

        let second = repo.settle(Some(pending.match_up_id), &context(), "Beth").await;
        assert!(matches!(second, Err(StorageError::ConstraintViolation(_))));

        let stored = repo.find_by_id(pending.match_up_id).await.unwrap();
        assert_eq!(stored.winner.as_deref(), Some("Alice"));
        let alice_after = CompetitorRepository::new(db.pool())
            .find_by_id(alice.competitor_id)
            .await
            .unwrap();
        assert_eq!(alice_after.win_count, 1);
    }

    #[tokio::test]
    async fn test_settle_without_pending_creates_decided_record() {
        let db = Database::in_memory().await.unwrap();
        let repo = MatchUpRepository::new(db.pool());

        let settled = repo.settle(None, &context(), "Ghost").await.unwrap();

        assert!(settled.winner.is_none());
        assert_eq!(settled.match_up.winner.as_deref(), Some("Ghost"));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_settle_unknown_match_is_not_found() {
        let db = Database::in_memory().await.unwrap();
        let repo = MatchUpRepository::new(db.pool());

        let result = repo.settle(Some(Uuid::new_v4()), &context(), "Alice").await;
        assert!(matches!(result, Err(StorageError::NotFound("Match-up"))));
    }
}
