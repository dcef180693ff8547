use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::StorageError;

/// Competitor gender as stored in the roster.
///
/// Anything the importer cannot recognise lands in [`Gender::Unknown`], so the
/// column never holds an arbitrary string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
    #[serde(rename = "u")]
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "m",
            Self::Female => "f",
            Self::Unknown => "u",
        }
    }

    pub fn all() -> &'static [Gender] {
        &[Self::Male, Self::Female, Self::Unknown]
    }

    /// Lenient parse used for spreadsheet cells: `None` when the value is not
    /// a recognisable gender.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "m" | "male" | "男" => Some(Self::Male),
            "f" | "female" | "女" => Some(Self::Female),
            "u" | "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl TryFrom<String> for Gender {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "m" => Ok(Self::Male),
            "f" => Ok(Self::Female),
            "u" => Ok(Self::Unknown),
            other => Err(StorageError::InvalidValue(format!(
                "unknown gender code '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
