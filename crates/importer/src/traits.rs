use crate::Result;
use crate::roster::ImportReport;
use chrono::NaiveDate;
use sqlx::SqlitePool;

pub struct ImportContext {
    pub pool: SqlitePool,
    /// Reference date for age-based category derivation.
    pub as_of: NaiveDate,
}

impl ImportContext {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            as_of: chrono::Local::now().date_naive(),
        }
    }
}

#[async_trait::async_trait]
pub trait RosterImporter: Send + Sync {
    /// Parses `data` and writes every usable row to the roster.
    async fn import(&self, data: &[u8], context: &ImportContext) -> Result<ImportReport>;

    fn name(&self) -> &'static str;
}
