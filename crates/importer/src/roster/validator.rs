use chrono::NaiveDate;
use storage::{dto::competitor::CreateCompetitorRequest, models::Gender};
use tracing::warn;

use super::models::RosterRow;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];

/// Turns mapped rows into create requests. Problems in a single row are
/// repaired or the row is dropped; they never fail the import.
pub struct RosterValidator;

impl RosterValidator {
    pub fn validate(row: &RosterRow) -> (Option<CreateCompetitorRequest>, ValidationReport) {
        let mut report = ValidationReport::default();
        let label = format!("Row {}", row.line);

        let name = row.name.trim();
        if name.is_empty() {
            report.warnings.push(format!("{}: empty name, row skipped", label));
            return (None, report);
        }
        let label = format!("{} ({})", label, name);

        let gender = match Gender::parse_label(&row.gender) {
            Some(gender) => gender,
            None => {
                report.warnings.push(format!(
                    "{}: unrecognised gender '{}', recorded as unknown",
                    label, row.gender
                ));
                Gender::Unknown
            }
        };

        let birth_date = match row.birth_date.trim() {
            "" => {
                report.warnings.push(format!("{}: missing birth date", label));
                None
            }
            raw => {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    report.warnings.push(format!(
                        "{}: unparseable birth date '{}', left empty",
                        label, raw
                    ));
                }
                parsed
            }
        };

        let group = row.group.trim();
        if group.is_empty() {
            report.warnings.push(format!("{}: empty group, row skipped", label));
            return (None, report);
        }

        let program = row.program.trim();
        if program.is_empty() {
            report.warnings.push(format!("{}: empty program, row skipped", label));
            return (None, report);
        }

        let request = CreateCompetitorRequest {
            name: name.to_string(),
            gender,
            birth_date,
            group_label: group.to_string(),
            program: program.to_string(),
            school: non_empty(&row.school),
            district: non_empty(&row.district),
            emergency_contact: non_empty(&row.emergency_contact),
            category: None,
        };

        (Some(request), report)
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    // Spreadsheet exports often append a midnight time component
    let date_part = raw.split_whitespace().next().unwrap_or(raw);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> RosterRow {
        RosterRow {
            line: 1,
            name: "张三".to_string(),
            gender: "男".to_string(),
            birth_date: "2014-05-20".to_string(),
            group: "少儿组".to_string(),
            program: "组手A".to_string(),
            school: "实验小学".to_string(),
            district: "海淀区".to_string(),
            emergency_contact: "13800000000".to_string(),
        }
    }

    #[test]
    fn test_valid_row() {
        let (request, report) = RosterValidator::validate(&row());
        let request = request.unwrap();

        assert!(report.warnings.is_empty());
        assert_eq!(request.gender, Gender::Male);
        assert_eq!(request.birth_date, NaiveDate::from_ymd_opt(2014, 5, 20));
        assert_eq!(request.school.as_deref(), Some("实验小学"));
        assert!(request.category.is_none());
    }

    #[test]
    fn test_bad_gender_falls_back_to_unknown() {
        let mut row = row();
        row.gender = "other".to_string();

        let (request, report) = RosterValidator::validate(&row);

        assert_eq!(request.unwrap().gender, Gender::Unknown);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_bad_date_is_dropped_not_fatal() {
        let mut row = row();
        row.birth_date = "20th May".to_string();

        let (request, report) = RosterValidator::validate(&row);

        assert!(request.unwrap().birth_date.is_none());
        assert!(report.warnings[0].contains("unparseable birth date"));
    }

    #[test]
    fn test_empty_name_skips_row() {
        let mut row = row();
        row.name = "  ".to_string();

        let (request, report) = RosterValidator::validate(&row);

        assert!(request.is_none());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2014, 5, 20);
        assert_eq!(parse_date("2014/05/20"), expected);
        assert_eq!(parse_date("2014.5.20"), expected);
        assert_eq!(parse_date("20140520"), expected);
        assert_eq!(parse_date("2014-05-20 00:00:00"), expected);
        assert_eq!(parse_date("05/20/2014"), None);
    }
}
