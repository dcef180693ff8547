mod columns;

pub use columns::{ColumnMap, RosterColumn};

use crate::roster::{ImportReport, RosterRow, RosterValidator};
use crate::{ImportContext, Result, traits::RosterImporter};
use storage::repository::competitor::CompetitorRepository;
use tracing::{debug, info};

/// Reads a roster exported from the registration spreadsheet as CSV.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRosterImporter;

impl CsvRosterImporter {
    pub fn new() -> Self {
        Self
    }

    /// Maps every data row to a [`RosterRow`]. Fails only when the file itself
    /// is unreadable or a required column is missing.
    pub fn read_rows(&self, data: &[u8]) -> Result<Vec<RosterRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data);

        let columns = ColumnMap::from_headers(reader.headers()?.iter())?;

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            if record.iter().all(|cell| cell.is_empty()) {
                debug!("Skipping blank row {}", index + 1);
                continue;
            }
            rows.push(columns.map_record(index + 1, &record));
        }

        Ok(rows)
    }

    /// Runs validation without touching the database.
    pub fn dry_run(&self, data: &[u8]) -> Result<ImportReport> {
        let mut report = ImportReport::default();

        for row in self.read_rows(data)? {
            let (request, validation) = RosterValidator::validate(&row);
            report.warnings.extend(validation.warnings);
            match request {
                Some(_) => report.imported += 1,
                None => report.skipped += 1,
            }
        }

        Ok(report)
    }
}

#[async_trait::async_trait]
impl RosterImporter for CsvRosterImporter {
    async fn import(&self, data: &[u8], context: &ImportContext) -> Result<ImportReport> {
        let rows = self.read_rows(data)?;
        info!("{} importer: {} roster rows", self.name(), rows.len());

        let mut report = ImportReport::default();
        let mut requests = Vec::with_capacity(rows.len());

        for row in &rows {
            let (request, validation) = RosterValidator::validate(row);
            validation.log_warnings();
            report.warnings.extend(validation.warnings);

            match request {
                Some(request) => requests.push(request),
                None => report.skipped += 1,
            }
        }

        // One transaction: a storage failure leaves the roster untouched
        let created = CompetitorRepository::new(&context.pool)
            .create_all(&requests, context.as_of)
            .await?;
        for competitor in &created {
            debug!(
                "Imported '{}' into {} roster",
                competitor.name, competitor.category
            );
        }
        report.imported = created.len();

        info!(
            "Roster import finished: {} imported, {} skipped, {} warnings",
            report.imported,
            report.skipped,
            report.warnings.len()
        );

        Ok(report)
    }

    fn name(&self) -> &'static str {
        "CSV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImporterError;
    use chrono::NaiveDate;
    use storage::Database;
    use storage::models::{Category, Gender};

    const ROSTER: &str = "\
姓名,性别,出生日期,组别,项目,所属学校,所属区,紧急联系人
张三,男,2014-05-20,少儿组,组手A,实验小学,海淀区,13800000000
李四,女,2013/01/02,少儿组,个人型,育才学校,朝阳区,13900000000
王五,未知,not-a-date,成人组,组手B,,,
,男,2014-05-20,少儿组,组手A,实验小学,,
张三,男,2014-05-21,少儿组,组手A,育才学校,,
,,,,,,,
";

    #[test]
    fn test_read_rows_skips_blank_lines() {
        let rows = CsvRosterImporter::new().read_rows(ROSTER.as_bytes()).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1].program, "个人型");
    }

    #[test]
    fn test_dry_run_counts() {
        let report = CsvRosterImporter::new().dry_run(ROSTER.as_bytes()).unwrap();
        assert_eq!(report.imported, 4);
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn test_import_writes_roster() {
        let db = Database::in_memory().await.unwrap();
        let context = ImportContext {
            pool: db.pool().clone(),
            as_of: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        };

        let report = CsvRosterImporter::new()
            .import(ROSTER.as_bytes(), &context)
            .await
            .unwrap();

        assert_eq!(report.imported, 4);
        assert_eq!(report.skipped, 1);

        let repo = CompetitorRepository::new(db.pool());
        let minors = repo.list_by_category(Category::Minor).await.unwrap();
        let adults = repo.list_by_category(Category::Adult).await.unwrap();

        let minor_names: Vec<&str> = minors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(minor_names, vec!["张三", "李四", "张三-2"]);
        assert_eq!(adults.len(), 1);
        assert_eq!(adults[0].gender, Gender::Unknown);
        assert!(adults[0].birth_date.is_none());
        assert!(adults[0].school.is_none());

        for competitor in minors.iter().chain(adults.iter()) {
            assert!(Gender::all().contains(&competitor.gender));
            assert_eq!(competitor.win_count, 0);
        }
    }

    #[test]
    fn test_missing_column_fails_whole_import() {
        let data = "姓名,性别,组别\n张三,男,少儿组\n";
        assert!(CsvRosterImporter::new().read_rows(data.as_bytes()).is_err());
    }

    #[tokio::test]
    async fn test_failed_import_writes_nothing() {
        let db = Database::in_memory().await.unwrap();
        sqlx::query(
            "CREATE TRIGGER reject_wang BEFORE INSERT ON competitors \
             WHEN NEW.name = '王五' BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();
        let context = ImportContext {
            pool: db.pool().clone(),
            as_of: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        };

        let result = CsvRosterImporter::new().import(ROSTER.as_bytes(), &context).await;

        assert!(matches!(result, Err(ImporterError::StorageError(_))));
        let repo = CompetitorRepository::new(db.pool());
        assert!(repo.list().await.unwrap().is_empty());
    }
}
