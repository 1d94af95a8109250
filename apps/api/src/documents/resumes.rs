//! Resume persistence: rows in `resumes`, binaries in object storage.
//!
//! Upload writes the object first and the row second. Delete removes the
//! object first and the row second, and keeps the row if the object delete
//! fails. An orphaned object is acceptable; a row pointing at nothing is not.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clients::{PdfRenderer, ResumeFile};
use crate::errors::AppError;
use crate::models::resume::{NewResume, Resume, ResumeContent, ResumeRow, StructuredResume};
use crate::storage::{filename_from_path, resume_object_path, ObjectStorage};

const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

// ────────────────────────────────────────────────────────────────────────────
// Row repository
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ResumeRepository: Send + Sync {
    /// Newest first.
    async fn list(&self, owner_id: Uuid) -> Result<Vec<Resume>, AppError>;

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Resume>, AppError>;

    async fn insert(&self, resume: &NewResume) -> Result<Resume, AppError>;

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        title: Option<&str>,
        content: Option<&ResumeContent>,
    ) -> Result<Option<Resume>, AppError>;

    /// Returns false when no row matched.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

pub struct PgResumeRepository {
    pool: PgPool,
}

impl PgResumeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeRepository for PgResumeRepository {
    async fn list(&self, owner_id: Uuid) -> Result<Vec<Resume>, AppError> {
        sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Resume::try_from)
        .collect()
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Resume>, AppError> {
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Resume::try_from)
            .transpose()
    }

    async fn insert(&self, resume: &NewResume) -> Result<Resume, AppError> {
        let content = resume.content.to_json()?;
        sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (id, owner_id, title, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(resume.id)
        .bind(resume.owner_id)
        .bind(&resume.title)
        .bind(&content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Persistence(e.to_string()))?
        .try_into()
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        title: Option<&str>,
        content: Option<&ResumeContent>,
    ) -> Result<Option<Resume>, AppError> {
        let content = content.map(ResumeContent::to_json).transpose()?;
        sqlx::query_as::<_, ResumeRow>(
            r#"
            UPDATE resumes
            SET title = COALESCE($3, title),
                content = COALESCE($4, content),
                updated_at = now()
            WHERE id = $1 AND owner_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(title)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?
        .map(Resume::try_from)
        .transpose()
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Store: rows + objects
// ────────────────────────────────────────────────────────────────────────────

/// An uploaded resume file as received from the client.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Explicit edit of a resume. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ResumeEdit {
    pub title: Option<String>,
    pub content: Option<ResumeContent>,
}

#[derive(Clone)]
pub struct ResumeStore {
    repo: Arc<dyn ResumeRepository>,
    storage: Arc<dyn ObjectStorage>,
    renderer: Arc<dyn PdfRenderer>,
}

impl ResumeStore {
    pub fn new(
        repo: Arc<dyn ResumeRepository>,
        storage: Arc<dyn ObjectStorage>,
        renderer: Arc<dyn PdfRenderer>,
    ) -> Self {
        Self {
            repo,
            storage,
            renderer,
        }
    }

    pub async fn fetch_resumes(&self, owner_id: Uuid) -> Result<Vec<Resume>, AppError> {
        self.repo.list(owner_id).await
    }

    pub async fn get_resume(&self, owner_id: Uuid, id: Uuid) -> Result<Resume, AppError> {
        self.repo
            .get(owner_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
    }

    /// Stores the binary, then writes the row pointing at it.
    pub async fn upload_resume(
        &self,
        owner_id: Uuid,
        title: &str,
        upload: ResumeUpload,
    ) -> Result<Resume, AppError> {
        let title = require_title(title)?;
        if upload.bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        let file_path = resume_object_path(owner_id, &upload.filename);
        let content_type = upload
            .content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        self.storage.put(&file_path, upload.bytes, content_type).await?;
        let file_url = self.storage.public_url(&file_path);

        let new = NewResume {
            id: Uuid::new_v4(),
            owner_id,
            title,
            content: ResumeContent::FileBacked {
                file_path: file_path.clone(),
                file_url,
            },
        };

        match self.repo.insert(&new).await {
            Ok(resume) => {
                info!("Uploaded resume {} for owner {owner_id}", resume.id);
                Ok(resume)
            }
            Err(e) => {
                warn!("Resume row write failed, object {file_path} left orphaned: {e}");
                Err(e)
            }
        }
    }

    pub async fn create_structured_resume(
        &self,
        owner_id: Uuid,
        title: &str,
        structured: StructuredResume,
    ) -> Result<Resume, AppError> {
        let new = NewResume {
            id: Uuid::new_v4(),
            owner_id,
            title: require_title(title)?,
            content: ResumeContent::Structured(structured),
        };
        self.repo.insert(&new).await
    }

    /// Persists the output of the resume-optimization service.
    pub async fn save_tailored_resume(
        &self,
        owner_id: Uuid,
        title: &str,
        text: String,
        base_resume_id: Uuid,
    ) -> Result<Resume, AppError> {
        let new = NewResume {
            id: Uuid::new_v4(),
            owner_id,
            title: require_title(title)?,
            content: ResumeContent::Tailored {
                text,
                base_resume_id,
            },
        };
        self.repo.insert(&new).await
    }

    pub async fn update_resume(
        &self,
        owner_id: Uuid,
        id: Uuid,
        edit: ResumeEdit,
    ) -> Result<Resume, AppError> {
        if edit.title.is_none() && edit.content.is_none() {
            return Err(AppError::Validation("Nothing to update".to_string()));
        }
        let title = edit.title.as_deref().map(require_title).transpose()?;

        if let Some(content) = &edit.content {
            if matches!(content, ResumeContent::FileBacked { .. }) {
                return Err(AppError::Validation(
                    "File-backed content can only be created by uploading a file".to_string(),
                ));
            }
            let existing = self.get_resume(owner_id, id).await?;
            if existing.file_path().is_some() {
                return Err(AppError::Validation(
                    "An uploaded resume's file cannot be replaced; upload a new resume instead"
                        .to_string(),
                ));
            }
        }

        self.repo
            .update(owner_id, id, title.as_deref(), edit.content.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
    }

    /// PDF bytes of a resume, suitable for sending to the generation services.
    pub async fn resume_file(&self, resume: &Resume) -> Result<ResumeFile, AppError> {
        match &resume.content {
            ResumeContent::FileBacked { file_path, .. } => Ok(ResumeFile {
                filename: filename_from_path(file_path).to_string(),
                bytes: self.storage.get(file_path).await?,
            }),
            ResumeContent::Structured(structured) => Ok(ResumeFile {
                filename: "resume.pdf".to_string(),
                bytes: self.renderer.render_resume_pdf(structured).await?,
            }),
            ResumeContent::Tailored { .. } => Err(AppError::Validation(format!(
                "Resume {} is generated text and has no PDF; pick an uploaded or structured resume",
                resume.id
            ))),
        }
    }

    /// Deletes the backing object (if any), then the row.
    pub async fn delete_resume(&self, owner_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let resume = self.get_resume(owner_id, id).await?;

        if let Some(file_path) = resume.file_path() {
            // a failed object delete leaves the row (the only pointer) intact
            self.storage.delete(file_path).await?;
        }

        if !self.repo.delete(owner_id, id).await? {
            warn!("Resume {id} row was already gone after its object was deleted");
        }

        info!("Deleted resume {id} for owner {owner_id}");
        Ok(())
    }
}

fn require_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    Ok(title.to_string())
}
