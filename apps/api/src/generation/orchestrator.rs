//! Generation orchestrator: "apply to a job" as a sequence of fallible steps.
//!
//! Flow: validate → load resume file → tailor resume (optional) →
//!       cover letter (optional) → create application → return artifact ids.
//!
//! Job fields may be blank (a parsed posting often lacks a company); blanks
//! are carried through to the artifacts as-is.
//!
//! Steps run strictly in order. Each step yields a [`StepOutcome`] or an
//! error; the run is a straight-line match over those results. Nothing is
//! retried and nothing already persisted is rolled back: a cover-letter
//! failure after a successful tailoring leaves the tailored resume in the
//! user's resume list and reports its id in the error.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::applications::repository::ApplicationRepository;
use crate::clients::{
    CoverLetterGenerator, CoverLetterRequest, JobSource, ResumeFile, ResumeOptimizer,
};
use crate::documents::cover_letters::CoverLetterRepository;
use crate::documents::resumes::ResumeStore;
use crate::errors::{AppError, GenerationError};
use crate::models::application::{Application, ApplicationDraft, ApplicationStatus};
use crate::models::cover_letter::{CoverLetter, NewCoverLetter};
use crate::models::resume::{Resume, ResumeContent};

const DEFAULT_MANAGER: &str = "Hiring Manager";
const DEFAULT_TAILORED_TITLE: &str = "Tailored resume";

// ────────────────────────────────────────────────────────────────────────────
// Request / outcome types
// ────────────────────────────────────────────────────────────────────────────

/// The job being applied to.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct GenerationOptions {
    #[serde(default)]
    pub generate_resume: bool,
    #[serde(default)]
    pub generate_cover_letter: bool,
}

/// Optional cover-letter personalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoverLetterFields {
    pub user_name: Option<String>,
    pub manager: Option<String>,
    pub referral: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub owner_id: Uuid,
    pub job: JobPosting,
    pub resume_id: Option<Uuid>,
    #[serde(default)]
    pub options: GenerationOptions,
    #[serde(default)]
    pub cover_letter: CoverLetterFields,
}

/// Result of one orchestration run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub application: Application,
    pub tailored_resume_id: Option<Uuid>,
    pub cover_letter_id: Option<Uuid>,
}

/// What a single optional step produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<T> {
    Produced(T),
    /// The step was not requested.
    Skipped,
    /// The step ran and succeeded but had nothing to persist.
    Empty,
}

impl<T> StepOutcome<T> {
    pub fn produced(&self) -> Option<&T> {
        match self {
            StepOutcome::Produced(value) => Some(value),
            StepOutcome::Skipped | StepOutcome::Empty => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct GenerationOrchestrator {
    resumes: ResumeStore,
    cover_letters: Arc<dyn CoverLetterRepository>,
    applications: Arc<dyn ApplicationRepository>,
    optimizer: Arc<dyn ResumeOptimizer>,
    cover_letter_generator: Arc<dyn CoverLetterGenerator>,
}

impl GenerationOrchestrator {
    pub fn new(
        resumes: ResumeStore,
        cover_letters: Arc<dyn CoverLetterRepository>,
        applications: Arc<dyn ApplicationRepository>,
        optimizer: Arc<dyn ResumeOptimizer>,
        cover_letter_generator: Arc<dyn CoverLetterGenerator>,
    ) -> Self {
        Self {
            resumes,
            cover_letters,
            applications,
            optimizer,
            cover_letter_generator,
        }
    }

    /// Runs one orchestration end to end.
    ///
    /// Validation and lookup failures return plain errors before any
    /// upstream call. Step failures return [`GenerationError`] naming the
    /// failed artifact.
    pub async fn run(&self, request: GenerationRequest) -> Result<GenerationOutcome, AppError> {
        let owner_id = request.owner_id;
        let options = request.options;

        // Step 1: validate
        let resume_id = request
            .resume_id
            .ok_or_else(|| AppError::Validation("Select a resume before generating".to_string()))?;
        let job_source = if options.generate_resume {
            Some(JobSource::preferring_url(
                request.job.url.as_deref(),
                Some(&request.job.description),
            )?)
        } else {
            None
        };

        let selected = self.resumes.get_resume(owner_id, resume_id).await?;
        let pdf = if options.generate_resume || options.generate_cover_letter {
            let base = self.pdf_source(owner_id, &selected).await?;
            let file = self.resumes.resume_file(&base).await?;
            Some((base, file))
        } else {
            info!("Generation run for owner {owner_id} requests no artifacts; tracking only");
            None
        };
        let resume_file = pdf.as_ref().map(|(_, file)| file);

        // Step 2: tailored resume
        let tailored = match (&job_source, &pdf) {
            (Some(job_source), Some((base, file))) => {
                match self.tailor_resume(&request, base, file, job_source).await {
                    Ok(resume) => StepOutcome::Produced(resume),
                    Err(source) => {
                        return Err(GenerationError::Resume {
                            source: Box::new(source),
                        }
                        .into())
                    }
                }
            }
            _ => StepOutcome::Skipped,
        };
        let tailored_resume_id = tailored.produced().map(|r| r.id);

        // Step 3: cover letter
        let cover_letter = match (resume_file, options.generate_cover_letter) {
            (Some(file), true) => match self.write_cover_letter(&request, file).await {
                Ok(outcome) => outcome,
                Err(source) => {
                    if let Some(orphan) = tailored_resume_id {
                        warn!("Cover letter failed after tailoring; resume {orphan} has no application");
                    }
                    return Err(GenerationError::CoverLetter {
                        source: Box::new(source),
                        orphaned_resume_id: tailored_resume_id,
                    }
                    .into());
                }
            },
            _ => StepOutcome::Skipped,
        };
        let cover_letter_id = cover_letter.produced().map(|c| c.id);

        // Step 4: application
        let draft = ApplicationDraft {
            position: request.job.title.clone(),
            company: request.job.company.clone(),
            location: request.job.location.clone(),
            applied_date: Some(Utc::now()),
            status: Some(ApplicationStatus::Applied),
            resume_id: Some(tailored_resume_id.unwrap_or(selected.id)),
            cover_letter_id,
            job_url: request.job.url.clone(),
            ..Default::default()
        };
        let application = match self.create_application(owner_id, draft).await {
            Ok(application) => application,
            Err(source) => {
                return Err(GenerationError::Application {
                    source: Box::new(source),
                    tailored_resume_id,
                    cover_letter_id,
                }
                .into())
            }
        };

        info!(
            "Generation run complete for owner {owner_id}: application={} tailored_resume={:?} cover_letter={:?}",
            application.id, tailored_resume_id, cover_letter_id
        );

        // Step 5: hand artifact ids back for the editors
        Ok(GenerationOutcome {
            application,
            tailored_resume_id,
            cover_letter_id,
        })
    }

    /// The resume whose PDF feeds the upstream calls. Tailored resumes are
    /// text only, so the resume they were tailored from stands in.
    async fn pdf_source(&self, owner_id: Uuid, selected: &Resume) -> Result<Resume, AppError> {
        let ResumeContent::Tailored { base_resume_id, .. } = &selected.content else {
            return Ok(selected.clone());
        };
        match self.resumes.get_resume(owner_id, *base_resume_id).await {
            Ok(base) => {
                info!("Resume {} is tailored; using base resume {} for generation", selected.id, base.id);
                Ok(base)
            }
            Err(AppError::NotFound(_)) => Err(AppError::Validation(format!(
                "Resume {} was tailored from resume {base_resume_id}, which no longer exists",
                selected.id
            ))),
            Err(e) => Err(e),
        }
    }

    async fn tailor_resume(
        &self,
        request: &GenerationRequest,
        base: &Resume,
        file: &ResumeFile,
        job_source: &JobSource,
    ) -> Result<Resume, AppError> {
        info!(
            "Optimizing resume {} for {} at {}",
            base.id, request.job.title, request.job.company
        );
        let text = self.optimizer.optimize_resume(file, job_source).await?;

        let title = tailored_title(&request.job);
        let tailored = self
            .resumes
            .save_tailored_resume(request.owner_id, &title, text, base.id)
            .await?;

        info!("Saved tailored resume {} (base {})", tailored.id, base.id);
        Ok(tailored)
    }

    async fn write_cover_letter(
        &self,
        request: &GenerationRequest,
        file: &ResumeFile,
    ) -> Result<StepOutcome<CoverLetter>, AppError> {
        let letter_request = cover_letter_request(&request.job, &request.cover_letter);
        let generated = self
            .cover_letter_generator
            .generate_cover_letter(file, &letter_request)
            .await?;

        let Some(first) = generated
            .variations
            .into_iter()
            .next()
            .filter(|v| !v.content.trim().is_empty())
        else {
            warn!(
                "Cover letter service returned no usable variations for {} at {}",
                request.job.title, request.job.company
            );
            return Ok(StepOutcome::Empty);
        };

        let letter = self
            .cover_letters
            .insert(&NewCoverLetter {
                id: Uuid::new_v4(),
                owner_id: request.owner_id,
                title: request.job.title.trim().to_string(),
                company: request.job.company.trim().to_string(),
                content: first.content,
            })
            .await?;

        info!("Saved cover letter {}", letter.id);
        Ok(StepOutcome::Produced(letter))
    }

    async fn create_application(
        &self,
        owner_id: Uuid,
        draft: ApplicationDraft,
    ) -> Result<Application, AppError> {
        let new = draft.resolve(owner_id, Utc::now());
        self.applications.insert(&new).await
    }
}

/// `"{title} - {company}"`, or whichever half is present.
fn tailored_title(job: &JobPosting) -> String {
    match (job.title.trim(), job.company.trim()) {
        ("", "") => DEFAULT_TAILORED_TITLE.to_string(),
        (title, "") => title.to_string(),
        ("", company) => format!("{DEFAULT_TAILORED_TITLE} - {company}"),
        (title, company) => format!("{title} - {company}"),
    }
}

/// Personalization defaults come from the job itself, never from the
/// tailored resume.
fn cover_letter_request(job: &JobPosting, fields: &CoverLetterFields) -> CoverLetterRequest {
    let non_blank = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    };
    CoverLetterRequest {
        job_description: job.description.clone(),
        user_name: non_blank(&fields.user_name).unwrap_or_default(),
        company: job.company.trim().to_string(),
        manager: non_blank(&fields.manager).unwrap_or_else(|| DEFAULT_MANAGER.to_string()),
        role: job.title.trim().to_string(),
        referral: non_blank(&fields.referral),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ClientError;
    use crate::testing::{FakeCoverLetters, FakeOptimizer, TestHarness};
    use std::sync::atomic::Ordering;

    fn acme_job() -> JobPosting {
        JobPosting {
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            description: "Build and run Rust services.".to_string(),
            url: None,
        }
    }

    fn request(owner_id: Uuid, resume_id: Uuid, resume: bool, cover_letter: bool) -> GenerationRequest {
        GenerationRequest {
            owner_id,
            job: acme_job(),
            resume_id: Some(resume_id),
            options: GenerationOptions {
                generate_resume: resume,
                generate_cover_letter: cover_letter,
            },
            cover_letter: CoverLetterFields::default(),
        }
    }

    fn orchestrator(harness: &TestHarness) -> GenerationOrchestrator {
        harness.state().orchestrator()
    }

    #[tokio::test]
    async fn test_resume_only_run_links_new_tailored_resume() {
        let harness = TestHarness::default();
        let owner = Uuid::new_v4();
        let base = harness.upload(owner, "SWE Resume").await;

        let outcome = orchestrator(&harness)
            .run(request(owner, base.id, true, false))
            .await
            .unwrap();

        let tailored_id = outcome.tailored_resume_id.unwrap();
        assert_ne!(tailored_id, base.id);
        assert_eq!(outcome.application.resume_id, Some(tailored_id));
        assert_eq!(outcome.application.cover_letter_id, None);
        assert_eq!(outcome.cover_letter_id, None);
        assert_eq!(harness.cover_letter_generator.call_count(), 0);

        let tailored = harness.store().get_resume(owner, tailored_id).await.unwrap();
        assert_eq!(tailored.title, "Backend Engineer - Acme");
        assert_eq!(
            tailored.content,
            ResumeContent::Tailored {
                text: "Tailored resume text".to_string(),
                base_resume_id: base.id,
            }
        );
    }

    #[tokio::test]
    async fn test_empty_variations_still_creates_application() {
        let harness = TestHarness {
            cover_letter_generator: Arc::new(FakeCoverLetters::with_letters(&[])),
            ..Default::default()
        };
        let owner = Uuid::new_v4();
        let base = harness.upload(owner, "SWE Resume").await;

        let outcome = orchestrator(&harness)
            .run(request(owner, base.id, true, true))
            .await
            .unwrap();

        assert_eq!(outcome.cover_letter_id, None);
        assert_eq!(outcome.application.cover_letter_id, None);
        assert!(outcome.tailored_resume_id.is_some());
        assert!(harness.cover_letters.all().is_empty());
        assert_eq!(harness.applications.all().len(), 1);
    }

    #[tokio::test]
    async fn test_optimizer_failure_aborts_before_cover_letter() {
        let harness = TestHarness {
            optimizer: Arc::new(FakeOptimizer::returning(Err(ClientError::Upstream {
                status: 500,
                body: "model overloaded".to_string(),
            }))),
            ..Default::default()
        };
        let owner = Uuid::new_v4();
        let base = harness.upload(owner, "SWE Resume").await;

        let err = orchestrator(&harness)
            .run(request(owner, base.id, true, true))
            .await
            .unwrap_err();

        match err {
            AppError::Generation(GenerationError::Resume { source }) => {
                assert!(matches!(*source, AppError::Upstream { status: 500, .. }))
            }
            other => panic!("expected resume generation error, got {other:?}"),
        }
        assert!(harness.applications.all().is_empty());
        assert!(harness.cover_letters.all().is_empty());
        assert_eq!(harness.cover_letter_generator.call_count(), 0);
        assert_eq!(harness.resumes.all(), vec![base]);
    }

    #[tokio::test]
    async fn test_full_run_for_jane_doe_at_acme() {
        let harness = TestHarness::default();
        let owner = Uuid::new_v4();
        let base = harness.upload(owner, "SWE Resume").await;

        let mut req = request(owner, base.id, true, true);
        req.cover_letter.user_name = Some("Jane Doe".to_string());
        let outcome = orchestrator(&harness).run(req).await.unwrap();

        let tailored_id = outcome.tailored_resume_id.unwrap();
        let letter_id = outcome.cover_letter_id.unwrap();

        let letters = harness.cover_letters.all();
        assert_eq!(letters.len(), 1);
        assert_eq!(letters[0].id, letter_id);
        assert_eq!(letters[0].title, "Backend Engineer");
        assert_eq!(letters[0].company, "Acme");
        assert_eq!(letters[0].content, "Dear Acme team,");

        let application = &outcome.application;
        assert_eq!(application.status, ApplicationStatus::Applied);
        assert_eq!(application.resume_id, Some(tailored_id));
        assert_eq!(application.cover_letter_id, Some(letter_id));
        assert_eq!(application.position, "Backend Engineer");
        assert_eq!(application.company, "Acme");
        assert_eq!(application.location, "Remote");
        assert_eq!(harness.applications.all(), vec![application.clone()]);

        // two resumes now: the upload and its tailored copy
        assert_eq!(harness.resumes.all().len(), 2);

        let calls = harness.cover_letter_generator.calls.lock().unwrap();
        assert_eq!(calls[0].user_name, "Jane Doe");
        assert_eq!(calls[0].manager, "Hiring Manager");
        assert_eq!(calls[0].role, "Backend Engineer");
        assert_eq!(calls[0].referral, None);
    }

    #[tokio::test]
    async fn test_cover_letter_failure_keeps_tailored_resume() {
        let harness = TestHarness {
            cover_letter_generator: Arc::new(FakeCoverLetters::returning(Err(
                ClientError::Network("connection reset".to_string()),
            ))),
            ..Default::default()
        };
        let owner = Uuid::new_v4();
        let base = harness.upload(owner, "SWE Resume").await;

        let err = orchestrator(&harness)
            .run(request(owner, base.id, true, true))
            .await
            .unwrap_err();

        let orphan = match err {
            AppError::Generation(GenerationError::CoverLetter {
                source,
                orphaned_resume_id,
            }) => {
                assert!(matches!(*source, AppError::Network(_)));
                orphaned_resume_id.unwrap()
            }
            other => panic!("expected cover letter generation error, got {other:?}"),
        };

        assert!(harness.store().get_resume(owner, orphan).await.is_ok());
        assert!(harness.applications.all().is_empty());
        assert!(harness.cover_letters.all().is_empty());
    }

    #[tokio::test]
    async fn test_no_flags_only_tracks_application() {
        let harness = TestHarness::default();
        let owner = Uuid::new_v4();
        let base = harness.upload(owner, "SWE Resume").await;

        let outcome = orchestrator(&harness)
            .run(request(owner, base.id, false, false))
            .await
            .unwrap();

        assert_eq!(outcome.application.resume_id, Some(base.id));
        assert_eq!(outcome.tailored_resume_id, None);
        assert_eq!(outcome.cover_letter_id, None);
        assert_eq!(harness.optimizer.call_count(), 0);
        assert_eq!(harness.cover_letter_generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cover_letter_only_uses_selected_resume() {
        let harness = TestHarness::default();
        let owner = Uuid::new_v4();
        let base = harness.upload(owner, "SWE Resume").await;

        let outcome = orchestrator(&harness)
            .run(request(owner, base.id, false, true))
            .await
            .unwrap();

        assert_eq!(outcome.application.resume_id, Some(base.id));
        assert!(outcome.cover_letter_id.is_some());
        assert_eq!(harness.optimizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_resume_id_fails_before_any_call() {
        let harness = TestHarness::default();
        let mut req = request(Uuid::new_v4(), Uuid::new_v4(), true, true);
        req.resume_id = None;

        let err = orchestrator(&harness).run(req).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(harness.optimizer.call_count(), 0);
        assert_eq!(harness.cover_letter_generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_resume_is_not_found() {
        let harness = TestHarness::default();
        let err = orchestrator(&harness)
            .run(request(Uuid::new_v4(), Uuid::new_v4(), true, false))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(harness.applications.all().is_empty());
    }

    #[tokio::test]
    async fn test_job_url_preferred_over_description() {
        let harness = TestHarness::default();
        let owner = Uuid::new_v4();
        let base = harness.upload(owner, "SWE Resume").await;

        let mut req = request(owner, base.id, true, false);
        req.job.url = Some("https://jobs.acme.test/42".to_string());
        let outcome = orchestrator(&harness).run(req).await.unwrap();

        let calls = harness.optimizer.calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            &[JobSource::Url("https://jobs.acme.test/42".to_string())]
        );
        assert_eq!(
            outcome.application.job_url.as_deref(),
            Some("https://jobs.acme.test/42")
        );
    }

    #[tokio::test]
    async fn test_application_failure_reports_created_artifacts() {
        let harness = TestHarness::default();
        harness.applications.fail_inserts.store(true, Ordering::SeqCst);
        let owner = Uuid::new_v4();
        let base = harness.upload(owner, "SWE Resume").await;

        let err = orchestrator(&harness)
            .run(request(owner, base.id, true, true))
            .await
            .unwrap_err();

        match err {
            AppError::Generation(GenerationError::Application {
                source,
                tailored_resume_id,
                cover_letter_id,
            }) => {
                assert!(matches!(*source, AppError::Persistence(_)));
                assert!(tailored_resume_id.is_some());
                assert_eq!(cover_letter_id, harness.cover_letters.all().first().map(|c| c.id));
            }
            other => panic!("expected application generation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_parsed_job_without_company_still_tracked() {
        let harness = TestHarness::default();
        let owner = Uuid::new_v4();
        let base = harness.upload(owner, "SWE Resume").await;

        let mut req = request(owner, base.id, false, false);
        req.job = JobPosting {
            title: "Backend Engineer".to_string(),
            company: String::new(),
            url: Some("https://jobs.example.test/7".to_string()),
            ..Default::default()
        };
        let outcome = orchestrator(&harness).run(req).await.unwrap();

        assert_eq!(outcome.application.position, "Backend Engineer");
        assert_eq!(outcome.application.company, "");
        assert_eq!(harness.applications.all().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_job_fields_still_generate_artifacts() {
        let harness = TestHarness::default();
        let owner = Uuid::new_v4();
        let base = harness.upload(owner, "SWE Resume").await;

        let mut req = request(owner, base.id, true, true);
        req.job.company = "  ".to_string();
        let outcome = orchestrator(&harness).run(req).await.unwrap();

        let tailored = harness
            .store()
            .get_resume(owner, outcome.tailored_resume_id.unwrap())
            .await
            .unwrap();
        assert_eq!(tailored.title, "Backend Engineer");
        assert!(outcome.cover_letter_id.is_some());
        assert_eq!(outcome.application.resume_id, Some(tailored.id));
    }

    #[tokio::test]
    async fn test_tailored_selection_generates_from_its_base() {
        let harness = TestHarness::default();
        let owner = Uuid::new_v4();
        let base = harness.upload(owner, "SWE Resume").await;
        let earlier = harness
            .store()
            .save_tailored_resume(owner, "Platform Engineer - Initech", "Earlier text".to_string(), base.id)
            .await
            .unwrap();

        let outcome = orchestrator(&harness)
            .run(request(owner, earlier.id, true, true))
            .await
            .unwrap();

        let tailored = harness
            .store()
            .get_resume(owner, outcome.tailored_resume_id.unwrap())
            .await
            .unwrap();
        assert_eq!(
            tailored.content,
            ResumeContent::Tailored {
                text: "Tailored resume text".to_string(),
                base_resume_id: base.id,
            }
        );
        assert!(outcome.cover_letter_id.is_some());
        assert_eq!(harness.optimizer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_cover_letter_only_from_tailored_keeps_selection() {
        let harness = TestHarness::default();
        let owner = Uuid::new_v4();
        let base = harness.upload(owner, "SWE Resume").await;
        let earlier = harness
            .store()
            .save_tailored_resume(owner, "Backend Engineer - Acme", "Earlier text".to_string(), base.id)
            .await
            .unwrap();

        let outcome = orchestrator(&harness)
            .run(request(owner, earlier.id, false, true))
            .await
            .unwrap();

        assert_eq!(outcome.application.resume_id, Some(earlier.id));
        assert!(outcome.cover_letter_id.is_some());
    }

    #[tokio::test]
    async fn test_tailored_selection_with_deleted_base_is_rejected() {
        let harness = TestHarness::default();
        let owner = Uuid::new_v4();
        let base = harness.upload(owner, "SWE Resume").await;
        let earlier = harness
            .store()
            .save_tailored_resume(owner, "Backend Engineer - Acme", "Earlier text".to_string(), base.id)
            .await
            .unwrap();
        harness.resumes.remove_row(base.id);

        let err = orchestrator(&harness)
            .run(request(owner, earlier.id, false, true))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(harness.cover_letter_generator.call_count(), 0);
        assert!(harness.applications.all().is_empty());
    }

    #[test]
    fn test_tailored_title_falls_back_for_blank_fields() {
        let mut job = acme_job();
        assert_eq!(tailored_title(&job), "Backend Engineer - Acme");
        job.company = String::new();
        assert_eq!(tailored_title(&job), "Backend Engineer");
        job.title = " ".to_string();
        assert_eq!(tailored_title(&job), DEFAULT_TAILORED_TITLE);
        job.company = "Acme".to_string();
        assert_eq!(tailored_title(&job), "Tailored resume - Acme");
    }

    #[test]
    fn test_cover_letter_request_defaults() {
        let fields = CoverLetterFields {
            user_name: None,
            manager: Some("   ".to_string()),
            referral: Some(" Sam Lee ".to_string()),
        };
        let built = cover_letter_request(&acme_job(), &fields);
        assert_eq!(built.manager, DEFAULT_MANAGER);
        assert_eq!(built.user_name, "");
        assert_eq!(built.referral.as_deref(), Some("Sam Lee"));
        assert_eq!(built.company, "Acme");
    }

    #[test]
    fn test_step_outcome_produced() {
        assert_eq!(StepOutcome::Produced(3).produced(), Some(&3));
        assert_eq!(StepOutcome::<u8>::Skipped.produced(), None);
        assert_eq!(StepOutcome::<u8>::Empty.produced(), None);
    }
}
