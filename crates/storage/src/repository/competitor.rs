use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::dto::competitor::{CreateCompetitorRequest, UpdateCompetitorRequest};
use crate::error::{Result, StorageError};
use crate::models::{Category, Competitor};

/// Insert retries after losing a name to a concurrent writer.
const NAME_ATTEMPTS: usize = 16;

const COMPETITOR_COLUMNS: &str = "competitor_id, category, name, gender, birth_date, group_label, \
     program, school, district, emergency_contact, win_count, created_at";

pub struct CompetitorRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CompetitorRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all competitors in insertion order
    pub async fn list(&self) -> Result<Vec<Competitor>> {
        let competitors = sqlx::query_as::<_, Competitor>(&format!(
            "SELECT {COMPETITOR_COLUMNS} FROM competitors ORDER BY rowid"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(competitors)
    }

    /// List one roster sub-collection in insertion order
    pub async fn list_by_category(&self, category: Category) -> Result<Vec<Competitor>> {
        let competitors = sqlx::query_as::<_, Competitor>(&format!(
            "SELECT {COMPETITOR_COLUMNS} FROM competitors WHERE category = ?1 ORDER BY rowid"
        ))
        .bind(category.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(competitors)
    }

    /// Find competitor by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Competitor> {
        sqlx::query_as::<_, Competitor>(&format!(
            "SELECT {COMPETITOR_COLUMNS} FROM competitors WHERE competitor_id = ?1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound("Competitor"))
    }

    /// Find competitor by exact name within one sub-collection
    pub async fn find_by_name(&self, category: Category, name: &str) -> Result<Option<Competitor>> {
        let competitor = sqlx::query_as::<_, Competitor>(&format!(
            "SELECT {COMPETITOR_COLUMNS} FROM competitors WHERE category = ?1 AND name = ?2"
        ))
        .bind(category.as_str())
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(competitor)
    }

    /// Create a new competitor. `as_of` is the reference date for age-based
    /// category derivation. A taken name is suffixed `-2`, `-3`, ...
    pub async fn create(&self, req: &CreateCompetitorRequest, as_of: NaiveDate) -> Result<Competitor> {
        let mut conn = self.pool.acquire().await?;
        insert_on(&mut conn, req, as_of).await
    }

    /// Create several competitors in one transaction: either every request is
    /// written or none is.
    pub async fn create_all(
        &self,
        requests: &[CreateCompetitorRequest],
        as_of: NaiveDate,
    ) -> Result<Vec<Competitor>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(requests.len());

        for req in requests {
            created.push(insert_on(&mut *tx, req, as_of).await?);
        }

        tx.commit().await?;
        Ok(created)
    }

    /// Update an existing competitor
    pub async fn update(
        &self,
        existing: &Competitor,
        req: &UpdateCompetitorRequest,
        as_of: NaiveDate,
    ) -> Result<Competitor> {
        let group_label = req.group_label.as_ref().unwrap_or(&existing.group_label);
        let birth_date = req.birth_date.or(existing.birth_date);
        let gender = req.gender.unwrap_or(existing.gender);
        let program = req.program.as_ref().unwrap_or(&existing.program);
        let school = req.school.as_ref().or(existing.school.as_ref());
        let district = req.district.as_ref().or(existing.district.as_ref());
        let emergency_contact = req
            .emergency_contact
            .as_ref()
            .or(existing.emergency_contact.as_ref());
        let win_count = req.win_count.unwrap_or(existing.win_count);

        // Re-derive the sub-collection when its inputs change
        let category = match req.category {
            Some(category) => category,
            None if req.group_label.is_some() || req.birth_date.is_some() => {
                Category::classify(group_label, birth_date, as_of)
            }
            None => existing.category,
        };

        let requested_name = req.name.as_ref().unwrap_or(&existing.name);
        let renaming = req.name.is_some() || category != existing.category;

        let mut conn = self.pool.acquire().await?;
        let mut attempts = 0;
        loop {
            let name = if renaming {
                unique_name_on(&mut conn, category, requested_name, Some(existing.competitor_id))
                    .await?
            } else {
                existing.name.clone()
            };

            let result = sqlx::query_as::<_, Competitor>(&format!(
                "UPDATE competitors \
                 SET category = ?2, name = ?3, gender = ?4, birth_date = ?5, group_label = ?6, \
                     program = ?7, school = ?8, district = ?9, emergency_contact = ?10, win_count = ?11 \
                 WHERE competitor_id = ?1 \
                 RETURNING {COMPETITOR_COLUMNS}"
            ))
            .bind(existing.competitor_id)
            .bind(category.as_str())
            .bind(&name)
            .bind(gender.as_str())
            .bind(birth_date)
            .bind(group_label)
            .bind(program)
            .bind(school)
            .bind(district)
            .bind(emergency_contact)
            .bind(win_count)
            .fetch_optional(&mut *conn)
            .await
            .map_err(StorageError::from);

            match result {
                Err(e) if renaming && e.is_unique_violation() && attempts < NAME_ATTEMPTS => {
                    attempts += 1;
                    tracing::debug!("Name '{}' was taken concurrently, retrying", name);
                }
                result => return result?.ok_or(StorageError::NotFound("Competitor")),
            }
        }
    }

    /// Increment the win count of the competitor with this name, checking the
    /// minors roster before the adults roster. Returns `None` when no
    /// competitor carries the name.
    pub async fn increment_wins(&self, name: &str) -> Result<Option<Competitor>> {
        let mut conn = self.pool.acquire().await?;
        increment_wins_on(&mut conn, name).await
    }

    /// Delete a competitor by ID
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM competitors WHERE competitor_id = ?1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Competitor"));
        }

        Ok(())
    }
}

/// Insert on an existing connection so it can join a transaction. Another
/// writer may claim the chosen name between the check and the insert; the
/// unique index rejects that and the next free suffix is tried.
async fn insert_on(
    conn: &mut SqliteConnection,
    req: &CreateCompetitorRequest,
    as_of: NaiveDate,
) -> Result<Competitor> {
    let category = req
        .category
        .unwrap_or_else(|| Category::classify(&req.group_label, req.birth_date, as_of));

    let mut attempts = 0;
    loop {
        let name = unique_name_on(conn, category, &req.name, None).await?;

        let result = sqlx::query_as::<_, Competitor>(&format!(
            "INSERT INTO competitors (competitor_id, category, name, gender, birth_date, group_label, \
             program, school, district, emergency_contact, win_count) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0) \
             RETURNING {COMPETITOR_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(category.as_str())
        .bind(&name)
        .bind(req.gender.as_str())
        .bind(req.birth_date)
        .bind(req.group_label.trim())
        .bind(req.program.trim())
        .bind(req.school.as_deref().map(str::trim))
        .bind(req.district.as_deref())
        .bind(req.emergency_contact.as_deref())
        .fetch_one(&mut *conn)
        .await
        .map_err(StorageError::from);

        match result {
            Err(e) if e.is_unique_violation() && attempts < NAME_ATTEMPTS => {
                attempts += 1;
                tracing::debug!("Name '{}' was taken concurrently, retrying", name);
            }
            result => return result,
        }
    }
}

/// Generate a name that is unique within the category by suffixing `-2`, `-3`, ...
///
/// `exclude` skips the competitor being renamed so it does not collide with itself.
async fn unique_name_on(
    conn: &mut SqliteConnection,
    category: Category,
    name: &str,
    exclude: Option<Uuid>,
) -> Result<String> {
    let base_name = name.trim();
    let mut final_name = base_name.to_string();
    let mut counter = 2;

    while name_taken_on(conn, category, &final_name, exclude).await? {
        final_name = format!("{}-{}", base_name, counter);
        counter += 1;
    }

    if final_name != base_name {
        tracing::info!(
            "Name '{}' already taken in {} roster, using '{}'",
            base_name,
            category,
            final_name
        );
    }

    Ok(final_name)
}

async fn name_taken_on(
    conn: &mut SqliteConnection,
    category: Category,
    name: &str,
    exclude: Option<Uuid>,
) -> Result<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM competitors WHERE category = ?1 AND name = ?2 \
         AND (?3 IS NULL OR competitor_id != ?3))",
    )
    .bind(category.as_str())
    .bind(name)
    .bind(exclude)
    .fetch_one(&mut *conn)
    .await?;

    Ok(taken)
}

/// Win increment on an existing connection so it can join a transaction.
pub(crate) async fn increment_wins_on(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<Competitor>> {
    for category in Category::lookup_order() {
        let updated = sqlx::query_as::<_, Competitor>(&format!(
            "UPDATE competitors SET win_count = win_count + 1 \
             WHERE category = ?1 AND name = ?2 \
             RETURNING {COMPETITOR_COLUMNS}"
        ))
        .bind(category.as_str())
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(competitor) = updated {
            return Ok(Some(competitor));
        }
    }

    Ok(None)
}
