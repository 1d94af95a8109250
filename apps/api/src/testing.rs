//! In-memory implementations of every port, for unit and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::applications::repository::{ApplicationFilter, ApplicationRepository};
use crate::clients::{
    ClientError, CoverLetterGenerator, CoverLetterRequest, CoverLetterVariation,
    GeneratedCoverLetters, JobBoard, JobListing, JobSearchQuery, JobSource, ParsedJob,
    PdfRenderer, ResumeFile, ResumeOptimizer, TextExtractor,
};
use crate::documents::cover_letters::CoverLetterRepository;
use crate::documents::resumes::{ResumeRepository, ResumeStore};
use crate::errors::AppError;
use crate::llm_client::{ChatModel, LlmError, Message};
use crate::models::application::{Application, ApplicationStatus, NewApplication};
use crate::models::cover_letter::{CoverLetter, CoverLetterEdit, NewCoverLetter};
use crate::models::resume::{NewResume, Resume, ResumeContent, StructuredResume};
use crate::state::AppState;
use crate::storage::{ObjectStorage, StorageError};

pub const FAKE_PDF: &[u8] = b"%PDF-1.4 fake resume";

/// An application owned by a fresh random owner.
pub fn application(position: &str, company: &str, status: ApplicationStatus) -> Application {
    let now = Utc::now();
    Application {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        position: position.to_string(),
        company: company.to_string(),
        location: String::new(),
        applied_date: now,
        status,
        notes: String::new(),
        next_step: String::new(),
        resume_id: None,
        cover_letter_id: None,
        job_url: None,
        has_interview: false,
        interview_date: None,
        created_at: now,
        updated_at: now,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Repositories
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryResumes {
    rows: Mutex<Vec<Resume>>,
    pub fail_inserts: AtomicBool,
}

impl InMemoryResumes {
    pub fn all(&self) -> Vec<Resume> {
        self.rows.lock().unwrap().clone()
    }

    pub fn remove_row(&self, id: Uuid) {
        self.rows.lock().unwrap().retain(|r| r.id != id);
    }
}

#[async_trait]
impl ResumeRepository for InMemoryResumes {
    async fn list(&self, owner_id: Uuid) -> Result<Vec<Resume>, AppError> {
        let mut rows: Vec<_> = self
            .all()
            .into_iter()
            .filter(|r| r.owner_id == owner_id)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Resume>, AppError> {
        Ok(self
            .all()
            .into_iter()
            .find(|r| r.id == id && r.owner_id == owner_id))
    }

    async fn insert(&self, resume: &NewResume) -> Result<Resume, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("resumes insert refused".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        // keep created_at strictly increasing so newest-first ordering is stable
        let now = rows
            .iter()
            .map(|r| r.created_at)
            .max()
            .map(|latest| latest.max(Utc::now()) + chrono::Duration::milliseconds(1))
            .unwrap_or_else(Utc::now);
        let row = Resume {
            id: resume.id,
            owner_id: resume.owner_id,
            title: resume.title.clone(),
            content: resume.content.clone(),
            created_at: now,
            updated_at: now,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        title: Option<&str>,
        content: Option<&ResumeContent>,
    ) -> Result<Option<Resume>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|r| r.id == id && r.owner_id == owner_id) else {
            return Ok(None);
        };
        if let Some(title) = title {
            row.title = title.to_string();
        }
        if let Some(content) = content {
            row.content = content.clone();
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.id == id && r.owner_id == owner_id));
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryCoverLetters {
    rows: Mutex<Vec<CoverLetter>>,
}

impl InMemoryCoverLetters {
    pub fn all(&self) -> Vec<CoverLetter> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl CoverLetterRepository for InMemoryCoverLetters {
    async fn list(&self, owner_id: Uuid) -> Result<Vec<CoverLetter>, AppError> {
        let mut rows: Vec<_> = self
            .all()
            .into_iter()
            .filter(|c| c.owner_id == owner_id)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<CoverLetter>, AppError> {
        Ok(self
            .all()
            .into_iter()
            .find(|c| c.id == id && c.owner_id == owner_id))
    }

    async fn insert(&self, letter: &NewCoverLetter) -> Result<CoverLetter, AppError> {
        let now = Utc::now();
        let row = CoverLetter {
            id: letter.id,
            owner_id: letter.owner_id,
            title: letter.title.clone(),
            company: letter.company.clone(),
            content: letter.content.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        edit: &CoverLetterEdit,
    ) -> Result<Option<CoverLetter>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|c| c.id == id && c.owner_id == owner_id) else {
            return Ok(None);
        };
        if let Some(title) = &edit.title {
            row.title = title.clone();
        }
        if let Some(content) = &edit.content {
            row.content = content.clone();
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| !(c.id == id && c.owner_id == owner_id));
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryApplications {
    rows: Mutex<Vec<Application>>,
    pub fail_inserts: AtomicBool,
}

impl InMemoryApplications {
    pub fn seed(&self, application: Application) -> Application {
        self.rows.lock().unwrap().push(application.clone());
        application
    }

    pub fn all(&self) -> Vec<Application> {
        self.rows.lock().unwrap().clone()
    }

    fn modify(
        &self,
        owner_id: Uuid,
        id: Uuid,
        change: impl FnOnce(&mut Application),
    ) -> Option<Application> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.iter_mut().find(|a| a.id == id && a.owner_id == owner_id)?;
        change(row);
        row.updated_at = Utc::now();
        Some(row.clone())
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplications {
    async fn list(
        &self,
        owner_id: Uuid,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, AppError> {
        let mut rows: Vec<_> = self
            .all()
            .into_iter()
            .filter(|a| a.owner_id == owner_id && filter.matches(a))
            .collect();
        rows.sort_by(|a, b| b.applied_date.cmp(&a.applied_date));
        Ok(rows)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Application>, AppError> {
        Ok(self
            .all()
            .into_iter()
            .find(|a| a.id == id && a.owner_id == owner_id))
    }

    async fn insert(&self, new: &NewApplication) -> Result<Application, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("applications insert refused".to_string()));
        }
        let now = Utc::now();
        let row = Application {
            id: new.id,
            owner_id: new.owner_id,
            position: new.position.clone(),
            company: new.company.clone(),
            location: new.location.clone(),
            applied_date: new.applied_date,
            status: new.status,
            notes: new.notes.clone(),
            next_step: new.next_step.clone(),
            resume_id: new.resume_id,
            cover_letter_id: new.cover_letter_id,
            job_url: new.job_url.clone(),
            has_interview: false,
            interview_date: None,
            created_at: now,
            updated_at: now,
        };
        Ok(self.seed(row))
    }

    async fn update_status(
        &self,
        owner_id: Uuid,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, AppError> {
        Ok(self.modify(owner_id, id, |a| a.status = status))
    }

    async fn update_interview(
        &self,
        owner_id: Uuid,
        id: Uuid,
        has_interview: bool,
        interview_date: Option<DateTime<Utc>>,
    ) -> Result<Option<Application>, AppError> {
        Ok(self.modify(owner_id, id, |a| {
            a.has_interview = has_interview;
            a.interview_date = interview_date;
        }))
    }

    async fn update_notes(
        &self,
        owner_id: Uuid,
        id: Uuid,
        notes: &str,
        next_step: &str,
    ) -> Result<Option<Application>, AppError> {
        Ok(self.modify(owner_id, id, |a| {
            a.notes = notes.to_string();
            a.next_step = next_step.to_string();
        }))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|a| !(a.id == id && a.owner_id == owner_id));
        Ok(rows.len() < before)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Object storage
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryStorage {
    objects: Mutex<HashMap<String, Bytes>>,
    pub fail_puts: AtomicBool,
    pub fail_deletes: AtomicBool,
}

impl InMemoryStorage {
    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn put(&self, path: &str, body: Bytes, _content_type: &str) -> Result<(), StorageError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::Write {
                path: path.to_string(),
                message: "quota exceeded".to_string(),
            });
        }
        self.objects.lock().unwrap().insert(path.to_string(), body);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Bytes, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::Read {
                path: path.to_string(),
                message: "no such key".to_string(),
            })
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Delete {
                path: path.to_string(),
                message: "access denied".to_string(),
            });
        }
        self.objects.lock().unwrap().remove(path);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://bucket/{path}")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Upstream clients
// ────────────────────────────────────────────────────────────────────────────

pub struct FakeRenderer;

#[async_trait]
impl PdfRenderer for FakeRenderer {
    async fn render_resume_pdf(&self, _resume: &StructuredResume) -> Result<Bytes, ClientError> {
        Ok(Bytes::from_static(FAKE_PDF))
    }
}

pub struct FakeOptimizer {
    response: Mutex<Result<String, ClientError>>,
    pub calls: Mutex<Vec<JobSource>>,
}

impl FakeOptimizer {
    pub fn returning(response: Result<String, ClientError>) -> Self {
        Self {
            response: Mutex::new(response),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ResumeOptimizer for FakeOptimizer {
    async fn optimize_resume(&self, _resume: &ResumeFile, job: &JobSource) -> Result<String, ClientError> {
        self.calls.lock().unwrap().push(job.clone());
        self.response.lock().unwrap().clone()
    }
}

pub struct FakeCoverLetters {
    response: Mutex<Result<GeneratedCoverLetters, ClientError>>,
    pub calls: Mutex<Vec<CoverLetterRequest>>,
}

impl FakeCoverLetters {
    pub fn returning(response: Result<GeneratedCoverLetters, ClientError>) -> Self {
        Self {
            response: Mutex::new(response),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_letters(letters: &[&str]) -> Self {
        Self::returning(Ok(GeneratedCoverLetters {
            variations: letters
                .iter()
                .map(|content| CoverLetterVariation {
                    content: content.to_string(),
                    metadata: serde_json::Value::Null,
                })
                .collect(),
        }))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CoverLetterGenerator for FakeCoverLetters {
    async fn generate_cover_letter(
        &self,
        _resume: &ResumeFile,
        request: &CoverLetterRequest,
    ) -> Result<GeneratedCoverLetters, ClientError> {
        self.calls.lock().unwrap().push(request.clone());
        self.response.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct FakeJobBoard {
    pub parsed: ParsedJob,
    pub listings: Vec<JobListing>,
}

#[async_trait]
impl JobBoard for FakeJobBoard {
    async fn parse_job_url(&self, _url: &str) -> Result<ParsedJob, ClientError> {
        Ok(self.parsed.clone())
    }

    async fn search_jobs(&self, _query: &JobSearchQuery) -> Result<Vec<JobListing>, ClientError> {
        Ok(self.listings.clone())
    }
}

pub struct FakeTextExtractor {
    text: Option<String>,
    calls: AtomicUsize,
}

impl FakeTextExtractor {
    pub fn returning(text: Option<&str>) -> Self {
        Self {
            text: text.map(String::from),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for FakeTextExtractor {
    async fn extract_text(&self, _pdf: &ResumeFile) -> Result<Option<String>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// Records every `(system, messages)` pair it is asked about.
pub struct FakeChatModel {
    reply: Result<String, String>,
    pub calls: Mutex<Vec<(String, Vec<Message>)>>,
}

impl FakeChatModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with an API error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for FakeChatModel {
    async fn chat(&self, system: &str, messages: &[Message]) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), messages.to_vec()));
        self.reply.clone().map_err(|message| LlmError::Api {
            status: 529,
            message,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wiring
// ────────────────────────────────────────────────────────────────────────────

/// Every fake behind an `AppState`, with handles kept for assertions.
pub struct TestHarness {
    pub resumes: Arc<InMemoryResumes>,
    pub storage: Arc<InMemoryStorage>,
    pub cover_letters: Arc<InMemoryCoverLetters>,
    pub applications: Arc<InMemoryApplications>,
    pub optimizer: Arc<FakeOptimizer>,
    pub cover_letter_generator: Arc<FakeCoverLetters>,
    pub job_board: Arc<FakeJobBoard>,
    pub text_extractor: Arc<FakeTextExtractor>,
    pub llm: Arc<FakeChatModel>,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self {
            resumes: Arc::default(),
            storage: Arc::default(),
            cover_letters: Arc::default(),
            applications: Arc::default(),
            optimizer: Arc::new(FakeOptimizer::returning(Ok("Tailored resume text".to_string()))),
            cover_letter_generator: Arc::new(FakeCoverLetters::with_letters(&["Dear Acme team,"])),
            job_board: Arc::default(),
            text_extractor: Arc::new(FakeTextExtractor::returning(Some("Jane Doe\nRust engineer"))),
            llm: Arc::new(FakeChatModel::replying("Lead your summary with the Rust services you shipped.")),
        }
    }
}

impl TestHarness {
    pub fn store(&self) -> ResumeStore {
        ResumeStore::new(
            self.resumes.clone(),
            self.storage.clone(),
            Arc::new(FakeRenderer),
        )
    }

    pub fn state(&self) -> AppState {
        AppState {
            resumes: self.store(),
            cover_letters: self.cover_letters.clone(),
            applications: self.applications.clone(),
            optimizer: self.optimizer.clone(),
            cover_letter_generator: self.cover_letter_generator.clone(),
            job_board: self.job_board.clone(),
            text_extractor: self.text_extractor.clone(),
            llm: self.llm.clone(),
        }
    }

    /// Uploads a PDF resume for `owner_id` through the real store.
    pub async fn upload(&self, owner_id: Uuid, title: &str) -> Resume {
        self.store()
            .upload_resume(
                owner_id,
                title,
                crate::documents::resumes::ResumeUpload {
                    filename: "resume.pdf".to_string(),
                    content_type: Some("application/pdf".to_string()),
                    bytes: Bytes::from_static(FAKE_PDF),
                },
            )
            .await
            .unwrap()
    }
}
