use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MatchUp {
    pub match_up_id: Uuid,
    pub player1: String,
    pub player2: String,
    pub gender: Option<String>,
    pub group_label: String,
    pub program: String,
    pub subgroup: Option<String>,
    pub school: Option<String>,
    pub winner: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub decided_at: Option<chrono::NaiveDateTime>,
}

impl MatchUp {
    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }
}
