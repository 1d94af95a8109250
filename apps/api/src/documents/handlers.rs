//! Axum route handlers for resumes and cover letters.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::resume_text;
use crate::documents::cover_letters::validate_edit;
use crate::documents::resumes::{ResumeEdit, ResumeUpload};
use crate::errors::AppError;
use crate::models::cover_letter::{CoverLetter, CoverLetterEdit, NewCoverLetter};
use crate::models::resume::{Resume, StructuredResume};
use crate::routes::OwnerQuery;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateStructuredResumeRequest {
    pub owner_id: Uuid,
    pub title: String,
    pub resume: StructuredResume,
}

#[derive(Debug, Serialize)]
pub struct ResumeTextResponse {
    pub resume_id: Uuid,
    /// `None` when nothing could be extracted.
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCoverLetterRequest {
    pub owner_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub company: String,
    pub content: String,
}

/// Fields collected from the upload form.
#[derive(Default)]
struct UploadForm {
    owner_id: Option<Uuid>,
    title: Option<String>,
    file: Option<ResumeUpload>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "owner_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Malformed owner_id: {e}")))?;
                let owner_id = text
                    .trim()
                    .parse()
                    .map_err(|_| AppError::Validation(format!("Invalid owner_id '{text}'")))?;
                form.owner_id = Some(owner_id);
            }
            "title" => {
                form.title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Malformed title: {e}")))?,
                );
            }
            "file" => {
                let filename = field.file_name().unwrap_or("resume.pdf").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read file: {e}")))?;
                form.file = Some(ResumeUpload {
                    filename,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

// ────────────────────────────────────────────────────────────────────────────
// Resume handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<Vec<Resume>>, AppError> {
    Ok(Json(state.resumes.fetch_resumes(params.owner_id).await?))
}

/// POST /api/v1/resumes
///
/// Multipart form with `owner_id`, `title` and `file`.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Resume>), AppError> {
    let form = read_upload_form(multipart).await?;
    let owner_id = form
        .owner_id
        .ok_or_else(|| AppError::Validation("owner_id is required".to_string()))?;
    let file = form
        .file
        .ok_or_else(|| AppError::Validation("file is required".to_string()))?;
    let title = form.title.unwrap_or_default();

    let resume = state.resumes.upload_resume(owner_id, &title, file).await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// POST /api/v1/resumes/structured
pub async fn handle_create_structured_resume(
    State(state): State<AppState>,
    Json(request): Json<CreateStructuredResumeRequest>,
) -> Result<(StatusCode, Json<Resume>), AppError> {
    let resume = state
        .resumes
        .create_structured_resume(request.owner_id, &request.title, request.resume)
        .await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<Resume>, AppError> {
    Ok(Json(state.resumes.get_resume(params.owner_id, id).await?))
}

/// PATCH /api/v1/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
    Json(edit): Json<ResumeEdit>,
) -> Result<Json<Resume>, AppError> {
    Ok(Json(
        state.resumes.update_resume(params.owner_id, id, edit).await?,
    ))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<StatusCode, AppError> {
    state.resumes.delete_resume(params.owner_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/resumes/:id/text
pub async fn handle_resume_text(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<ResumeTextResponse>, AppError> {
    let resume = state.resumes.get_resume(params.owner_id, id).await?;
    let text = resume_text(&state.resumes, state.text_extractor.as_ref(), &resume).await?;
    Ok(Json(ResumeTextResponse {
        resume_id: resume.id,
        text,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Cover letter handlers
// ────────────────────────────────────────────────────────────────────────────

fn cover_letter_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Cover letter {id} not found"))
}

/// GET /api/v1/cover-letters
pub async fn handle_list_cover_letters(
    State(state): State<AppState>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<Vec<CoverLetter>>, AppError> {
    Ok(Json(state.cover_letters.list(params.owner_id).await?))
}

/// POST /api/v1/cover-letters
pub async fn handle_create_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<CreateCoverLetterRequest>,
) -> Result<(StatusCode, Json<CoverLetter>), AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }

    let letter = state
        .cover_letters
        .insert(&NewCoverLetter {
            id: Uuid::new_v4(),
            owner_id: request.owner_id,
            title: request.title.trim().to_string(),
            company: request.company.trim().to_string(),
            content: request.content,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(letter)))
}

/// GET /api/v1/cover-letters/:id
pub async fn handle_get_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<CoverLetter>, AppError> {
    state
        .cover_letters
        .get(params.owner_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| cover_letter_not_found(id))
}

/// PATCH /api/v1/cover-letters/:id
pub async fn handle_update_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
    Json(edit): Json<CoverLetterEdit>,
) -> Result<Json<CoverLetter>, AppError> {
    validate_edit(&edit)?;
    state
        .cover_letters
        .update(params.owner_id, id, &edit)
        .await?
        .map(Json)
        .ok_or_else(|| cover_letter_not_found(id))
}

/// DELETE /api/v1/cover-letters/:id
pub async fn handle_delete_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<StatusCode, AppError> {
    if !state.cover_letters.delete(params.owner_id, id).await? {
        return Err(cover_letter_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
