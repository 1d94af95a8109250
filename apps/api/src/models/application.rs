use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

/// Closed status set of a tracked application. Stored as its variant name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Interview,
    Offered,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Interview,
        ApplicationStatus::Offered,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offered => "Offered",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Unknown status '{s}'. Expected one of Applied, Interview, Offered, Rejected"
                ))
            })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub position: String,
    pub company: String,
    pub location: String,
    pub applied_date: DateTime<Utc>,
    pub status: String,
    pub notes: String,
    pub next_step: String,
    pub resume_id: Option<Uuid>,
    pub cover_letter_id: Option<Uuid>,
    pub job_url: Option<String>,
    pub has_interview: bool,
    pub interview_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One job the user has applied to.
///
/// `resume_id` and `cover_letter_id` may point at documents that have since
/// been deleted; readers must tolerate the dangling id.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Application {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub position: String,
    pub company: String,
    pub location: String,
    pub applied_date: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub notes: String,
    pub next_step: String,
    pub resume_id: Option<Uuid>,
    pub cover_letter_id: Option<Uuid>,
    pub job_url: Option<String>,
    pub has_interview: bool,
    /// Only meaningful while `has_interview` is true. `None` means "date TBD".
    pub interview_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = AppError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|_| {
            AppError::Persistence(format!(
                "application {} has unknown status '{}'",
                row.id, row.status
            ))
        })?;
        Ok(Application {
            id: row.id,
            owner_id: row.owner_id,
            position: row.position,
            company: row.company,
            location: row.location,
            applied_date: row.applied_date,
            status,
            notes: row.notes,
            next_step: row.next_step,
            resume_id: row.resume_id,
            cover_letter_id: row.cover_letter_id,
            job_url: row.job_url,
            has_interview: row.has_interview,
            interview_date: row.interview_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Caller-supplied fields for a new application. Unset `status` and
/// `applied_date` fall back to `Applied` and "now".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationDraft {
    pub position: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    pub applied_date: Option<DateTime<Utc>>,
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub next_step: String,
    pub resume_id: Option<Uuid>,
    pub cover_letter_id: Option<Uuid>,
    pub job_url: Option<String>,
}

/// Fully resolved insert payload.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub position: String,
    pub company: String,
    pub location: String,
    pub applied_date: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub notes: String,
    pub next_step: String,
    pub resume_id: Option<Uuid>,
    pub cover_letter_id: Option<Uuid>,
    pub job_url: Option<String>,
}

impl ApplicationDraft {
    /// Manually entered applications must name the position and company.
    /// Generated ones copy whatever the job carried, blanks included.
    pub fn require_position_and_company(&self) -> Result<(), AppError> {
        if self.position.trim().is_empty() {
            return Err(AppError::Validation("position cannot be empty".to_string()));
        }
        if self.company.trim().is_empty() {
            return Err(AppError::Validation("company cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn resolve(self, owner_id: Uuid, now: DateTime<Utc>) -> NewApplication {
        NewApplication {
            id: Uuid::new_v4(),
            owner_id,
            position: self.position,
            company: self.company,
            location: self.location,
            applied_date: self.applied_date.unwrap_or(now),
            status: self.status.unwrap_or_default(),
            notes: self.notes,
            next_step: self.next_step,
            resume_id: self.resume_id,
            cover_letter_id: self.cover_letter_id,
            job_url: self.job_url.filter(|url| !url.trim().is_empty()),
        }
    }
}
