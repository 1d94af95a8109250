use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct CoverLetter {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub company: String,
    /// Raw letter text.
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCoverLetter {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub company: String,
    pub content: String,
}

/// Explicit edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoverLetterEdit {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl CoverLetterEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}
