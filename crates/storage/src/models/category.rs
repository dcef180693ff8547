use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::StorageError;

const MINOR_KEYWORDS: &[&str] = &["少儿", "儿童", "少年", "青少年", "junior", "youth", "kid"];
const ADULT_KEYWORDS: &[&str] = &["成人", "成年", "adult", "senior"];

pub const ADULT_AGE: u32 = 18;

/// Roster sub-collection a competitor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Minor,
    Adult,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Adult => "adult",
        }
    }

    /// Lookup order used when a competitor is addressed by name only.
    pub fn lookup_order() -> &'static [Category] {
        &[Self::Minor, Self::Adult]
    }

    /// Derives the category from the group label, falling back to the age on
    /// `as_of` when the label carries no keyword.
    pub fn classify(group_label: &str, birth_date: Option<NaiveDate>, as_of: NaiveDate) -> Self {
        let label = group_label.to_lowercase();

        if MINOR_KEYWORDS.iter().any(|k| label.contains(k)) {
            return Self::Minor;
        }
        if ADULT_KEYWORDS.iter().any(|k| label.contains(k)) {
            return Self::Adult;
        }

        match birth_date.and_then(|birth| age_on(birth, as_of)) {
            Some(age) if age < ADULT_AGE => Self::Minor,
            _ => Self::Adult,
        }
    }
}

/// Completed years between `birth` and `as_of`; `None` for a birth date in the future.
pub fn age_on(birth: NaiveDate, as_of: NaiveDate) -> Option<u32> {
    let mut years = as_of.year() - birth.year();
    if (as_of.month(), as_of.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

impl TryFrom<String> for Category {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::str::FromStr for Category {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minor" | "minors" => Ok(Self::Minor),
            "adult" | "adults" => Ok(Self::Adult),
            other => Err(StorageError::InvalidValue(format!(
                "unknown category '{}'. Available: minor, adult",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
