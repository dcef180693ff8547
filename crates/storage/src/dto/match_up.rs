use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Labels describing a bout, as sent by the operator console and echoed to
/// viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct MatchContext {
    #[validate(length(min = 1, max = 255, message = "player1 is required"))]
    pub player1: String,

    #[validate(length(min = 1, max = 255, message = "player2 is required"))]
    pub player2: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[validate(length(max = 255))]
    pub group: String,

    #[validate(length(max = 255))]
    pub program: String,

    #[serde(default)]
    pub subgroup: Option<String>,

    #[serde(default)]
    pub school: Option<String>,
}

impl MatchContext {
    pub fn involves(&self, name: &str) -> bool {
        self.player1 == name || self.player2 == name
    }
}

impl From<&crate::models::MatchUp> for MatchContext {
    fn from(match_up: &crate::models::MatchUp) -> Self {
        Self {
            player1: match_up.player1.clone(),
            player2: match_up.player2.clone(),
            gender: match_up.gender.clone(),
            group: match_up.group_label.clone(),
            program: match_up.program.clone(),
            subgroup: match_up.subgroup.clone(),
            school: match_up.school.clone(),
        }
    }
}
