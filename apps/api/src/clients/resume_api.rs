//! Client for the resume API: optimization, cover letters, text extraction
//! and structured-resume rendering.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{
    ensure_success, non_blank, ClientError, CoverLetterGenerator, CoverLetterRequest,
    GeneratedCoverLetters, JobSource, PdfRenderer, ResumeFile, ResumeOptimizer, TextExtractor,
};
use crate::models::resume::StructuredResume;

const OPTIMIZE_PATH: &str = "/optimize-resume";
const COVER_LETTER_PATH: &str = "/generate-cover-letter";
const EXTRACT_TEXT_PATH: &str = "/extract-text";
const RENDER_PDF_PATH: &str = "/generate-pdf";

#[derive(Clone)]
pub struct ResumeApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ExtractTextResponse {
    #[serde(default)]
    text: Option<String>,
}

impl ResumeApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn pdf_part(file: &ResumeFile) -> Result<Part, ClientError> {
    Part::bytes(file.bytes.to_vec())
        .file_name(file.filename.clone())
        .mime_str("application/pdf")
        .map_err(|e| ClientError::InvalidRequest(e.to_string()))
}

/// Form field carrying the job for an optimization request.
fn job_field(job: &JobSource) -> (&'static str, String) {
    match job {
        JobSource::Url(url) => ("job_url", url.clone()),
        JobSource::Text(text) => ("job_text", text.clone()),
    }
}

/// Text fields of a cover-letter request. `referral` is omitted when unset.
fn cover_letter_fields(request: &CoverLetterRequest) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("job_description", request.job_description.clone()),
        ("user_name", request.user_name.clone()),
        ("company", request.company.clone()),
        ("manager", request.manager.clone()),
        ("role", request.role.clone()),
    ];
    if let Some(referral) = request.referral.as_ref().filter(|r| !r.trim().is_empty()) {
        fields.push(("referral", referral.clone()));
    }
    fields
}

#[async_trait]
impl ResumeOptimizer for ResumeApiClient {
    async fn optimize_resume(&self, resume: &ResumeFile, job: &JobSource) -> Result<String, ClientError> {
        let (field, value) = job_field(job);
        let form = Form::new()
            .part("resume_file", pdf_part(resume)?)
            .text(field, value);

        debug!("POST {} ({field})", self.endpoint(OPTIMIZE_PATH));
        let response = self
            .client
            .post(self.endpoint(OPTIMIZE_PATH))
            .multipart(form)
            .send()
            .await?;
        let text = ensure_success(response).await?.text().await?;

        if text.trim().is_empty() {
            return Err(ClientError::Decode(
                "resume optimization returned an empty body".to_string(),
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl CoverLetterGenerator for ResumeApiClient {
    async fn generate_cover_letter(
        &self,
        resume: &ResumeFile,
        request: &CoverLetterRequest,
    ) -> Result<GeneratedCoverLetters, ClientError> {
        let form = cover_letter_fields(request)
            .into_iter()
            .fold(Form::new().part("file", pdf_part(resume)?), |form, (k, v)| {
                form.text(k, v)
            });

        debug!("POST {}", self.endpoint(COVER_LETTER_PATH));
        let response = self
            .client
            .post(self.endpoint(COVER_LETTER_PATH))
            .multipart(form)
            .send()
            .await?;
        let letters = ensure_success(response)
            .await?
            .json::<GeneratedCoverLetters>()
            .await?;

        debug!("Cover letter service returned {} variations", letters.variations.len());
        Ok(letters)
    }
}

#[async_trait]
impl TextExtractor for ResumeApiClient {
    async fn extract_text(&self, pdf: &ResumeFile) -> Result<Option<String>, ClientError> {
        let form = Form::new().part("file", pdf_part(pdf)?);
        let response = self
            .client
            .post(self.endpoint(EXTRACT_TEXT_PATH))
            .multipart(form)
            .send()
            .await?;
        let body = ensure_success(response)
            .await?
            .json::<ExtractTextResponse>()
            .await?;
        Ok(non_blank(body.text))
    }
}

#[async_trait]
impl PdfRenderer for ResumeApiClient {
    async fn render_resume_pdf(&self, resume: &StructuredResume) -> Result<Bytes, ClientError> {
        let response = self
            .client
            .post(self.endpoint(RENDER_PDF_PATH))
            .json(resume)
            .send()
            .await?;
        let pdf = ensure_success(response).await?.bytes().await?;
        if pdf.is_empty() {
            return Err(ClientError::Decode("PDF renderer returned an empty body".to_string()));
        }
        Ok(pdf)
    }
}
