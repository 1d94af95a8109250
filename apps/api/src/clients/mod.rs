//! Boundary adapters for the external job-search and resume services.
//!
//! Every call is a single best-effort attempt: no retries, no caching, no
//! circuit breaking. Callers decide what to do with a failure.

pub mod job_search;
pub mod local_pdf;
pub mod resume_api;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Response;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::resume::StructuredResume;

pub use job_search::JobSearchClient;
pub use local_pdf::LocalPdfTextExtractor;
pub use resume_api::ResumeApiClient;

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("could not decode upstream response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

/// Maps non-2xx responses to `ClientError::Upstream`, keeping the body verbatim.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Upstream {
        status: status.as_u16(),
        body,
    })
}

/// A resume PDF sent upstream as a multipart file part.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// The job a resume is optimized against. Exactly one of URL or text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSource {
    Url(String),
    Text(String),
}

impl JobSource {
    /// Builds a source from two optional inputs; exactly one must be non-blank.
    pub fn from_parts(url: Option<&str>, text: Option<&str>) -> Result<Self, ClientError> {
        let url = url.map(str::trim).filter(|s| !s.is_empty());
        let text = text.map(str::trim).filter(|s| !s.is_empty());
        match (url, text) {
            (Some(url), None) => Ok(JobSource::Url(url.to_string())),
            (None, Some(text)) => Ok(JobSource::Text(text.to_string())),
            (Some(_), Some(_)) => Err(ClientError::InvalidRequest(
                "provide either a job URL or a job description, not both".to_string(),
            )),
            (None, None) => Err(ClientError::InvalidRequest(
                "a job URL or a job description is required".to_string(),
            )),
        }
    }

    /// Prefers the URL when both are available.
    pub fn preferring_url(url: Option<&str>, text: Option<&str>) -> Result<Self, ClientError> {
        match url.map(str::trim).filter(|s| !s.is_empty()) {
            Some(url) => Ok(JobSource::Url(url.to_string())),
            None => Self::from_parts(None, text),
        }
    }
}

/// Fields of a cover-letter generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverLetterRequest {
    pub job_description: String,
    pub user_name: String,
    pub company: String,
    pub manager: String,
    pub role: String,
    pub referral: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverLetterVariation {
    pub content: String,
    #[serde(default)]
    pub metadata: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeneratedCoverLetters {
    #[serde(default)]
    pub variations: Vec<CoverLetterVariation>,
}

/// Best-effort scrape of a job posting. Any field may be empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParsedJob {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JobListing {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub url: Option<String>,
    pub posted_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSearchQuery {
    pub query: String,
    pub location: Option<String>,
    pub page: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Client roles
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ResumeOptimizer: Send + Sync {
    async fn optimize_resume(&self, resume: &ResumeFile, job: &JobSource) -> Result<String, ClientError>;
}

#[async_trait]
pub trait CoverLetterGenerator: Send + Sync {
    /// An empty `variations` list is a successful answer.
    async fn generate_cover_letter(
        &self,
        resume: &ResumeFile,
        request: &CoverLetterRequest,
    ) -> Result<GeneratedCoverLetters, ClientError>;
}

#[async_trait]
pub trait JobBoard: Send + Sync {
    async fn parse_job_url(&self, url: &str) -> Result<ParsedJob, ClientError>;

    async fn search_jobs(&self, query: &JobSearchQuery) -> Result<Vec<JobListing>, ClientError>;
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// `None` means no text could be extracted.
    async fn extract_text(&self, pdf: &ResumeFile) -> Result<Option<String>, ClientError>;
}

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render_resume_pdf(&self, resume: &StructuredResume) -> Result<Bytes, ClientError>;
}

/// Collapses blank extraction output to `None`.
pub(crate) fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}
