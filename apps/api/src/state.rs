use std::sync::Arc;

use crate::applications::repository::ApplicationRepository;
use crate::clients::{CoverLetterGenerator, JobBoard, ResumeOptimizer, TextExtractor};
use crate::documents::cover_letters::CoverLetterRepository;
use crate::documents::resumes::ResumeStore;
use crate::generation::orchestrator::GenerationOrchestrator;
use crate::llm_client::ChatModel;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every boundary is a trait object so the Postgres / S3 / HTTP backends can
/// be swapped at startup (and replaced by in-memory fakes in tests).
#[derive(Clone)]
pub struct AppState {
    pub resumes: ResumeStore,
    pub cover_letters: Arc<dyn CoverLetterRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub optimizer: Arc<dyn ResumeOptimizer>,
    pub cover_letter_generator: Arc<dyn CoverLetterGenerator>,
    pub job_board: Arc<dyn JobBoard>,
    /// Remote or local (`pdf-extract`) extraction, chosen via PDF_TEXT_EXTRACTION.
    pub text_extractor: Arc<dyn TextExtractor>,
    pub llm: Arc<dyn ChatModel>,
}

impl AppState {
    pub fn orchestrator(&self) -> GenerationOrchestrator {
        GenerationOrchestrator::new(
            self.resumes.clone(),
            self.cover_letters.clone(),
            self.applications.clone(),
            self.optimizer.clone(),
            self.cover_letter_generator.clone(),
        )
    }
}
