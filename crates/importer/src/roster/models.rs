use serde::{Deserialize, Serialize};

/// One spreadsheet row after column mapping, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    /// 1-based data row number, for messages.
    pub line: usize,
    pub name: String,
    pub gender: String,
    pub birth_date: String,
    pub group: String,
    pub program: String,
    pub school: String,
    pub district: String,
    pub emergency_contact: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub warnings: Vec<String>,
}
