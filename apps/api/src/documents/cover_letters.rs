use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::cover_letter::{CoverLetter, CoverLetterEdit, NewCoverLetter};

/// Pure row CRUD over `cover_letters`; no storage component.
#[async_trait]
pub trait CoverLetterRepository: Send + Sync {
    /// Newest first.
    async fn list(&self, owner_id: Uuid) -> Result<Vec<CoverLetter>, AppError>;

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<CoverLetter>, AppError>;

    async fn insert(&self, letter: &NewCoverLetter) -> Result<CoverLetter, AppError>;

    /// Rewrites the given fields and bumps `updated_at`.
    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        edit: &CoverLetterEdit,
    ) -> Result<Option<CoverLetter>, AppError>;

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

pub struct PgCoverLetterRepository {
    pool: PgPool,
}

impl PgCoverLetterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CoverLetterRepository for PgCoverLetterRepository {
    async fn list(&self, owner_id: Uuid) -> Result<Vec<CoverLetter>, AppError> {
        Ok(sqlx::query_as::<_, CoverLetter>(
            "SELECT * FROM cover_letters WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<CoverLetter>, AppError> {
        Ok(sqlx::query_as::<_, CoverLetter>(
            "SELECT * FROM cover_letters WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert(&self, letter: &NewCoverLetter) -> Result<CoverLetter, AppError> {
        sqlx::query_as::<_, CoverLetter>(
            r#"
            INSERT INTO cover_letters (id, owner_id, title, company, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(letter.id)
        .bind(letter.owner_id)
        .bind(&letter.title)
        .bind(&letter.company)
        .bind(&letter.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Persistence(e.to_string()))
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        edit: &CoverLetterEdit,
    ) -> Result<Option<CoverLetter>, AppError> {
        Ok(sqlx::query_as::<_, CoverLetter>(
            r#"
            UPDATE cover_letters
            SET title = COALESCE($3, title),
                content = COALESCE($4, content),
                updated_at = now()
            WHERE id = $1 AND owner_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(edit.title.as_deref())
        .bind(edit.content.as_deref())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM cover_letters WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Checks an explicit edit before it reaches the repository.
pub fn validate_edit(edit: &CoverLetterEdit) -> Result<(), AppError> {
    if edit.is_empty() {
        return Err(AppError::Validation("Nothing to update".to_string()));
    }
    if edit.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if edit.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }
    Ok(())
}
