use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::roster::RosterRow;
use crate::{ImporterError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RosterColumn {
    Name,
    Gender,
    BirthDate,
    Group,
    Program,
    School,
    District,
    EmergencyContact,
}

impl RosterColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Gender => "gender",
            Self::BirthDate => "birth_date",
            Self::Group => "group",
            Self::Program => "program",
            Self::School => "school",
            Self::District => "district",
            Self::EmergencyContact => "emergency_contact",
        }
    }

    fn required() -> &'static [RosterColumn] {
        &[Self::Name, Self::Gender, Self::Group, Self::Program]
    }
}

lazy_static! {
    static ref HEADER_ALIASES: HashMap<&'static str, RosterColumn> = {
        let mut m = HashMap::new();
        for alias in ["姓名", "name"] {
            m.insert(alias, RosterColumn::Name);
        }
        for alias in ["性别", "gender", "sex"] {
            m.insert(alias, RosterColumn::Gender);
        }
        for alias in ["出生日期", "birth_date", "birth", "birthday", "dob"] {
            m.insert(alias, RosterColumn::BirthDate);
        }
        for alias in ["组别", "group"] {
            m.insert(alias, RosterColumn::Group);
        }
        for alias in ["项目", "program", "discipline", "event"] {
            m.insert(alias, RosterColumn::Program);
        }
        for alias in ["所属学校", "学校", "道馆", "school", "affiliation", "dojo"] {
            m.insert(alias, RosterColumn::School);
        }
        for alias in ["所属区", "district"] {
            m.insert(alias, RosterColumn::District);
        }
        for alias in ["紧急联系人", "emergency_contact", "emergency_phone_call"] {
            m.insert(alias, RosterColumn::EmergencyContact);
        }
        m
    };
}

/// Positions of the known columns in a header row.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    positions: HashMap<RosterColumn, usize>,
}

impl ColumnMap {
    /// Resolves header cells against the alias table. Unknown headers are
    /// ignored; the first occurrence of a column wins.
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut positions = HashMap::new();

        for (index, header) in headers.into_iter().enumerate() {
            let key = header.trim().to_lowercase().replace(' ', "_");
            if let Some(column) = HEADER_ALIASES.get(key.as_str()) {
                positions.entry(*column).or_insert(index);
            }
        }

        for column in RosterColumn::required() {
            if !positions.contains_key(column) {
                return Err(ImporterError::MissingColumn(column.as_str()));
            }
        }

        Ok(Self { positions })
    }

    pub fn position(&self, column: RosterColumn) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    pub fn map_record(&self, line: usize, record: &csv::StringRecord) -> RosterRow {
        let cell = |column: RosterColumn| -> String {
            self.position(column)
                .and_then(|index| record.get(index))
                .unwrap_or_default()
                .to_string()
        };

        RosterRow {
            line,
            name: cell(RosterColumn::Name),
            gender: cell(RosterColumn::Gender),
            birth_date: cell(RosterColumn::BirthDate),
            group: cell(RosterColumn::Group),
            program: cell(RosterColumn::Program),
            school: cell(RosterColumn::School),
            district: cell(RosterColumn::District),
            emergency_contact: cell(RosterColumn::EmergencyContact),
        }
    }
}
