use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Category, Gender};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Competitor {
    pub competitor_id: Uuid,
    #[sqlx(try_from = "String")]
    pub category: Category,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub gender: Gender,
    pub birth_date: Option<chrono::NaiveDate>,
    pub group_label: String,
    pub program: String,
    pub school: Option<String>,
    pub district: Option<String>,
    pub emergency_contact: Option<String>,
    pub win_count: i64,
    pub created_at: chrono::NaiveDateTime,
}

impl Competitor {
    /// Affiliation used for the same-school exclusion. Blank schools count as
    /// no affiliation.
    pub fn affiliation(&self) -> Option<&str> {
        self.school
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
