pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::applications::handlers as applications;
use crate::chat::handlers as chat;
use crate::documents::handlers as documents;
use crate::generation::handlers as generation;
use crate::state::AppState;

/// Resume PDFs above this size are rejected by the multipart extractor.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Every read and mutation is scoped to one owner.
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner_id: Uuid,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Documents
        .route(
            "/api/v1/resumes",
            get(documents::handle_list_resumes).post(documents::handle_upload_resume),
        )
        .route(
            "/api/v1/resumes/structured",
            post(documents::handle_create_structured_resume),
        )
        .route(
            "/api/v1/resumes/:id",
            get(documents::handle_get_resume)
                .patch(documents::handle_update_resume)
                .delete(documents::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/text",
            get(documents::handle_resume_text),
        )
        .route(
            "/api/v1/cover-letters",
            get(documents::handle_list_cover_letters).post(documents::handle_create_cover_letter),
        )
        .route(
            "/api/v1/cover-letters/:id",
            get(documents::handle_get_cover_letter)
                .patch(documents::handle_update_cover_letter)
                .delete(documents::handle_delete_cover_letter),
        )
        // Applications
        .route(
            "/api/v1/applications",
            get(applications::handle_list_applications)
                .post(applications::handle_create_application),
        )
        .route(
            "/api/v1/applications/stats",
            get(applications::handle_application_stats),
        )
        .route(
            "/api/v1/applications/:id",
            get(applications::handle_get_application)
                .delete(applications::handle_delete_application),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(applications::handle_update_status),
        )
        .route(
            "/api/v1/applications/:id/interview",
            patch(applications::handle_update_interview),
        )
        .route(
            "/api/v1/applications/:id/notes",
            patch(applications::handle_update_notes),
        )
        // Generation
        .route(
            "/api/v1/generation/run",
            post(generation::handle_run_generation),
        )
        .route("/api/v1/jobs/parse", post(generation::handle_parse_job))
        .route("/api/v1/jobs/search", get(generation::handle_search_jobs))
        // Chat
        .route("/api/v1/chat/resume", post(chat::handle_resume_chat))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
