use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

/// Raw `resumes` row. `content` is untyped JSON until it passes through
/// [`Resume::try_from`].
#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Resume {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: ResumeContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resume {
    pub fn file_path(&self) -> Option<&str> {
        match &self.content {
            ResumeContent::FileBacked { file_path, .. } => Some(file_path),
            _ => None,
        }
    }
}

/// What a resume row actually holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResumeContent {
    /// An uploaded PDF living in object storage.
    FileBacked { file_path: String, file_url: String },
    /// Resume-builder data, rendered to PDF on demand.
    Structured(StructuredResume),
    /// Text produced by the resume-optimization service for one job.
    Tailored { text: String, base_resume_id: Uuid },
}

impl ResumeContent {
    /// Decodes the JSON column. Rows written before the `kind` tag existed
    /// only carry `{file_path, file_url}` and are read as file-backed.
    pub fn from_json(value: Value) -> Result<Self, String> {
        let untagged = value.get("kind").is_none();
        if untagged {
            if let (Some(file_path), Some(file_url)) = (
                value.get("file_path").and_then(Value::as_str),
                value.get("file_url").and_then(Value::as_str),
            ) {
                return Ok(ResumeContent::FileBacked {
                    file_path: file_path.to_string(),
                    file_url: file_url.to_string(),
                });
            }
        }
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    pub fn to_json(&self) -> Result<Value, AppError> {
        serde_json::to_value(self)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize resume content: {e}")))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StructuredResume {
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub experience: Vec<ExperienceItem>,
    #[serde(default)]
    pub education: Vec<EducationItem>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperienceItem {
    pub company: String,
    pub role: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EducationItem {
    pub institution: String,
    pub degree: String,
    pub field: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TryFrom<ResumeRow> for Resume {
    type Error = AppError;

    fn try_from(row: ResumeRow) -> Result<Self, Self::Error> {
        let content = ResumeContent::from_json(row.content).map_err(|e| {
            AppError::Persistence(format!("resume {} has unreadable content: {e}", row.id))
        })?;
        Ok(Resume {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insert payload for a resume row.
#[derive(Debug, Clone)]
pub struct NewResume {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: ResumeContent,
}
