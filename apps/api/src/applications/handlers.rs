//! Axum route handlers for the Applications API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::applications::lifecycle::{
    change_status, compute_stats, set_interview, ApplicationStats, InterviewState,
    StatusTransition,
};
use crate::applications::repository::{ApplicationFilter, StatusFilter};
use crate::errors::AppError;
use crate::models::application::{Application, ApplicationDraft};
use crate::routes::OwnerQuery;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListApplicationsQuery {
    pub owner_id: Uuid,
    /// An exact status or `all`.
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub owner_id: Uuid,
    #[serde(flatten)]
    pub draft: ApplicationDraft,
}

/// An application plus its derived interview state.
#[derive(Debug, Serialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub interview: InterviewState,
}

impl From<Application> for ApplicationView {
    fn from(application: Application) -> Self {
        let interview = InterviewState::of(&application);
        Self {
            application,
            interview,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub application: ApplicationView,
    pub transition: StatusTransition,
}

#[derive(Debug, Deserialize)]
pub struct InterviewUpdate {
    pub has_interview: bool,
    pub interview_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct NotesUpdate {
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub next_step: String,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Application {id} not found"))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(params): Query<ListApplicationsQuery>,
) -> Result<Json<Vec<ApplicationView>>, AppError> {
    let filter = ApplicationFilter {
        status: params
            .status
            .as_deref()
            .map(str::parse::<StatusFilter>)
            .transpose()?
            .unwrap_or_default(),
        search: params.search,
    };
    let applications = state.applications.list(params.owner_id, &filter).await?;
    Ok(Json(applications.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/applications
///
/// Manually tracked application, outside any generation run.
pub async fn handle_create_application(
    State(state): State<AppState>,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationView>), AppError> {
    request.draft.require_position_and_company()?;
    let new = request.draft.resolve(request.owner_id, Utc::now());
    let application = state.applications.insert(&new).await?;
    Ok((StatusCode::CREATED, Json(application.into())))
}

/// GET /api/v1/applications/stats
pub async fn handle_application_stats(
    State(state): State<AppState>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<ApplicationStats>, AppError> {
    let applications = state
        .applications
        .list(params.owner_id, &ApplicationFilter::default())
        .await?;
    Ok(Json(compute_stats(&applications, Utc::now())))
}

/// GET /api/v1/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<ApplicationView>, AppError> {
    state
        .applications
        .get(params.owner_id, id)
        .await?
        .map(|a| Json(a.into()))
        .ok_or_else(|| not_found(id))
}

/// DELETE /api/v1/applications/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<StatusCode, AppError> {
    if !state.applications.delete(params.owner_id, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<StatusUpdateResponse>, AppError> {
    let to = update.status.parse()?;
    let (application, transition) =
        change_status(state.applications.as_ref(), params.owner_id, id, to).await?;
    Ok(Json(StatusUpdateResponse {
        application: application.into(),
        transition,
    }))
}

/// PATCH /api/v1/applications/:id/interview
pub async fn handle_update_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
    Json(update): Json<InterviewUpdate>,
) -> Result<Json<ApplicationView>, AppError> {
    let application = set_interview(
        state.applications.as_ref(),
        params.owner_id,
        id,
        update.has_interview,
        update.interview_date,
    )
    .await?;
    Ok(Json(application.into()))
}

/// PATCH /api/v1/applications/:id/notes
pub async fn handle_update_notes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
    Json(update): Json<NotesUpdate>,
) -> Result<Json<ApplicationView>, AppError> {
    state
        .applications
        .update_notes(params.owner_id, id, &update.notes, &update.next_step)
        .await?
        .map(|a| Json(a.into()))
        .ok_or_else(|| not_found(id))
}
