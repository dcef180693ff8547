use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Category, Gender};

/// Response containing a competitor's full record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitorResponse {
    pub competitor_id: Uuid,
    pub category: Category,
    pub name: String,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub group_label: String,
    pub program: String,
    pub school: Option<String>,
    pub district: Option<String>,
    pub emergency_contact: Option<String>,
    pub win_count: i64,
    pub created_at: NaiveDateTime,
}

/// Request payload for creating a new competitor.
///
/// When `category` is omitted it is derived from the group label and birth date.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCompetitorRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    pub gender: Gender,

    pub birth_date: Option<NaiveDate>,

    #[validate(length(min = 1, max = 255, message = "Group is required"))]
    pub group_label: String,

    #[validate(length(min = 1, max = 255, message = "Program is required"))]
    pub program: String,

    #[validate(length(max = 255))]
    pub school: Option<String>,

    #[validate(length(max = 255))]
    pub district: Option<String>,

    #[validate(length(max = 255))]
    pub emergency_contact: Option<String>,

    pub category: Option<Category>,
}

/// Request payload for updating an existing competitor
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCompetitorRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    pub gender: Option<Gender>,

    pub birth_date: Option<NaiveDate>,

    #[validate(length(min = 1, max = 255))]
    pub group_label: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub program: Option<String>,

    #[validate(length(max = 255))]
    pub school: Option<String>,

    #[validate(length(max = 255))]
    pub district: Option<String>,

    #[validate(length(max = 255))]
    pub emergency_contact: Option<String>,

    #[validate(range(min = 0, message = "Win count cannot be negative"))]
    pub win_count: Option<i64>,

    pub category: Option<Category>,
}

impl From<crate::models::Competitor> for CompetitorResponse {
    fn from(competitor: crate::models::Competitor) -> Self {
        Self {
            competitor_id: competitor.competitor_id,
            category: competitor.category,
            name: competitor.name,
            gender: competitor.gender,
            birth_date: competitor.birth_date,
            group_label: competitor.group_label,
            program: competitor.program,
            school: competitor.school,
            district: competitor.district,
            emergency_contact: competitor.emergency_contact,
            win_count: competitor.win_count,
            created_at: competitor.created_at,
        }
    }
}
