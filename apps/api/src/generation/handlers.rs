//! Axum route handlers for generation runs and job lookup.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::clients::{JobListing, JobSearchQuery, ParsedJob};
use crate::errors::AppError;
use crate::generation::orchestrator::{GenerationOutcome, GenerationRequest};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ParseJobRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ParseJobResponse {
    pub job: ParsedJob,
}

#[derive(Debug, Deserialize)]
pub struct SearchJobsParams {
    pub query: String,
    pub location: Option<String>,
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct SearchJobsResponse {
    pub jobs: Vec<JobListing>,
    pub page: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/generation/run
///
/// Tailored resume → cover letter → application, each step optional except
/// the application. Artifact ids come back so the caller can open them.
pub async fn handle_run_generation(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Result<(StatusCode, Json<GenerationOutcome>), AppError> {
    let outcome = state.orchestrator().run(request).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /api/v1/jobs/parse
///
/// Best-effort scrape of a posting URL to pre-fill the job form.
pub async fn handle_parse_job(
    State(state): State<AppState>,
    Json(request): Json<ParseJobRequest>,
) -> Result<Json<ParseJobResponse>, AppError> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(AppError::Validation("url cannot be empty".to_string()));
    }

    let job = state.job_board.parse_job_url(url).await?;
    Ok(Json(ParseJobResponse { job }))
}

/// GET /api/v1/jobs/search
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Query(params): Query<SearchJobsParams>,
) -> Result<Json<SearchJobsResponse>, AppError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }

    let search = JobSearchQuery {
        query: query.to_string(),
        location: params
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty()),
        page: params.page.max(1),
    };
    let jobs = state.job_board.search_jobs(&search).await?;
    Ok(Json(SearchJobsResponse {
        jobs,
        page: search.page,
    }))
}
