use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{Application, ApplicationRow, ApplicationStatus, NewApplication};

/// Status restriction of a list query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApplicationStatus),
}

impl FromStr for StatusFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

impl StatusFilter {
    fn as_status(&self) -> Option<ApplicationStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(*status),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub status: StatusFilter,
    /// Case-insensitive substring matched against position OR company.
    pub search: Option<String>,
}

impl ApplicationFilter {
    fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// In-memory twin of the `WHERE` clause `list` builds.
    #[cfg(test)]
    pub fn matches(&self, application: &Application) -> bool {
        if let StatusFilter::Only(status) = self.status {
            if application.status != status {
                return false;
            }
        }
        match self.search_term() {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                application.position.to_lowercase().contains(&term)
                    || application.company.to_lowercase().contains(&term)
            }
        }
    }
}

/// `%term%` with LIKE wildcards in `term` escaped, for use with `ESCAPE '\'`.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// CRUD and partial updates over `applications`. Each partial update touches
/// only its own field group; concurrent writers are last-write-wins.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Newest `applied_date` first.
    async fn list(
        &self,
        owner_id: Uuid,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, AppError>;

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Application>, AppError>;

    async fn insert(&self, application: &NewApplication) -> Result<Application, AppError>;

    async fn update_status(
        &self,
        owner_id: Uuid,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, AppError>;

    async fn update_interview(
        &self,
        owner_id: Uuid,
        id: Uuid,
        has_interview: bool,
        interview_date: Option<DateTime<Utc>>,
    ) -> Result<Option<Application>, AppError>;

    async fn update_notes(
        &self,
        owner_id: Uuid,
        id: Uuid,
        notes: &str,
        next_step: &str,
    ) -> Result<Option<Application>, AppError>;

    /// Hard delete. Returns false when no row matched.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_application(row: Option<ApplicationRow>) -> Result<Option<Application>, AppError> {
    row.map(Application::try_from).transpose()
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn list(
        &self,
        owner_id: Uuid,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, AppError> {
        sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT * FROM applications
            WHERE owner_id = $1
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL
                   OR position ILIKE $3 ESCAPE '\'
                   OR company ILIKE $3 ESCAPE '\')
            ORDER BY applied_date DESC
            "#,
        )
        .bind(owner_id)
        .bind(filter.status.as_status().map(|s| s.as_str()))
        .bind(filter.search_term().map(like_pattern))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Application::try_from)
        .collect()
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Application>, AppError> {
        into_application(
            sqlx::query_as::<_, ApplicationRow>(
                "SELECT * FROM applications WHERE id = $1 AND owner_id = $2",
            )
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?,
        )
    }

    async fn insert(&self, application: &NewApplication) -> Result<Application, AppError> {
        sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO applications
                (id, owner_id, position, company, location, applied_date, status,
                 notes, next_step, resume_id, cover_letter_id, job_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(application.id)
        .bind(application.owner_id)
        .bind(&application.position)
        .bind(&application.company)
        .bind(&application.location)
        .bind(application.applied_date)
        .bind(application.status.as_str())
        .bind(&application.notes)
        .bind(&application.next_step)
        .bind(application.resume_id)
        .bind(application.cover_letter_id)
        .bind(application.job_url.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Persistence(e.to_string()))?
        .try_into()
    }

    async fn update_status(
        &self,
        owner_id: Uuid,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, AppError> {
        into_application(
            sqlx::query_as::<_, ApplicationRow>(
                r#"
                UPDATE applications SET status = $3, updated_at = now()
                WHERE id = $1 AND owner_id = $2
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(owner_id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?,
        )
    }

    async fn update_interview(
        &self,
        owner_id: Uuid,
        id: Uuid,
        has_interview: bool,
        interview_date: Option<DateTime<Utc>>,
    ) -> Result<Option<Application>, AppError> {
        into_application(
            sqlx::query_as::<_, ApplicationRow>(
                r#"
                UPDATE applications
                SET has_interview = $3, interview_date = $4, updated_at = now()
                WHERE id = $1 AND owner_id = $2
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(owner_id)
            .bind(has_interview)
            .bind(interview_date)
            .fetch_optional(&self.pool)
            .await?,
        )
    }

    async fn update_notes(
        &self,
        owner_id: Uuid,
        id: Uuid,
        notes: &str,
        next_step: &str,
    ) -> Result<Option<Application>, AppError> {
        into_application(
            sqlx::query_as::<_, ApplicationRow>(
                r#"
                UPDATE applications
                SET notes = $3, next_step = $4, updated_at = now()
                WHERE id = $1 AND owner_id = $2
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(owner_id)
            .bind(notes)
            .bind(next_step)
            .fetch_optional(&self.pool)
            .await?,
        )
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
