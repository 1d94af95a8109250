use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::clients::ClientError;
use crate::storage::StorageError;

/// Longest upstream body echoed back to the caller.
const MAX_UPSTREAM_BODY: usize = 2048;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Non-2xx answer from an external service.
    #[error("Upstream error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    /// No answer at all from an external service.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// A failed orchestration step. Names the artifact that failed and the ids of
/// artifacts that were already persisted by the same run.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Tailored resume generation failed: {source}")]
    Resume { source: Box<AppError> },

    #[error("Cover letter generation failed: {source}")]
    CoverLetter {
        source: Box<AppError>,
        orphaned_resume_id: Option<Uuid>,
    },

    #[error("Application could not be saved: {source}")]
    Application {
        source: Box<AppError>,
        tailored_resume_id: Option<Uuid>,
        cover_letter_id: Option<Uuid>,
    },
}

impl GenerationError {
    pub fn artifact(&self) -> &'static str {
        match self {
            GenerationError::Resume { .. } => "resume",
            GenerationError::CoverLetter { .. } => "cover_letter",
            GenerationError::Application { .. } => "application",
        }
    }

    fn inner(&self) -> &AppError {
        match self {
            GenerationError::Resume { source }
            | GenerationError::CoverLetter { source, .. }
            | GenerationError::Application { source, .. } => source,
        }
    }

    fn details(&self) -> Value {
        match self {
            GenerationError::Resume { .. } => json!({ "artifact": self.artifact() }),
            GenerationError::CoverLetter {
                orphaned_resume_id, ..
            } => json!({
                "artifact": self.artifact(),
                "orphaned_resume_id": orphaned_resume_id,
            }),
            GenerationError::Application {
                tailored_resume_id,
                cover_letter_id,
                ..
            } => json!({
                "artifact": self.artifact(),
                "tailored_resume_id": tailored_resume_id,
                "cover_letter_id": cover_letter_id,
            }),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Row not found".to_string()),
            other => AppError::Persistence(other.to_string()),
        }
    }
}

impl From<ClientError> for AppError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Upstream { status, body } => AppError::Upstream {
                status,
                body: truncate_body(body),
            },
            ClientError::Network(msg) => AppError::Network(msg),
            ClientError::Decode(msg) => AppError::Upstream {
                status: 200,
                body: format!("Unreadable upstream response: {msg}"),
            },
            ClientError::InvalidRequest(msg) => AppError::Validation(msg),
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Item no longer exists: {msg}"),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Upstream { status, body } => {
                tracing::warn!("Upstream returned {status}: {body}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    format!("External service returned {status}: {body}"),
                )
            }
            AppError::Network(msg) => {
                tracing::warn!("Network error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "NETWORK_ERROR",
                    "Could not reach an external service. Check your connection and try again."
                        .to_string(),
                )
            }
            AppError::Persistence(msg) => {
                tracing::error!("Persistence error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "Saving to the database failed. Please retry.".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "File storage failed. Check storage quota and permissions.".to_string(),
                )
            }
            AppError::Generation(e) => {
                let (status, code, message) = e.inner().parts();
                let prefix = match e {
                    GenerationError::Resume { .. } => "Tailored resume generation failed",
                    GenerationError::CoverLetter { .. } => "Cover letter generation failed",
                    GenerationError::Application { .. } => "Application could not be saved",
                };
                (status, code, format!("{prefix}: {message}"))
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "The resume assistant is unavailable right now".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let AppError::Generation(e) = &self {
            error["details"] = e.details();
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_UPSTREAM_BODY {
        let mut cut = MAX_UPSTREAM_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_upstream_error_keeps_status_and_body() {
        let response = AppError::from(ClientError::Upstream {
            status: 422,
            body: "job_url unreachable".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("422: job_url unreachable"));
    }

    #[tokio::test]
    async fn test_generation_error_names_artifact() {
        let orphan = Uuid::new_v4();
        let response = AppError::from(GenerationError::CoverLetter {
            source: Box::new(AppError::Network("connection reset".to_string())),
            orphaned_resume_id: Some(orphan),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NETWORK_ERROR");
        assert_eq!(body["error"]["details"]["artifact"], "cover_letter");
        assert_eq!(
            body["error"]["details"]["orphaned_resume_id"],
            orphan.to_string()
        );
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Cover letter generation failed"));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(
            AppError::from(sqlx::Error::RowNotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(sqlx::Error::PoolTimedOut),
            AppError::Persistence(_)
        ));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "é".repeat(MAX_UPSTREAM_BODY);
        let truncated = truncate_body(body);
        assert!(truncated.len() <= MAX_UPSTREAM_BODY);
        assert!(truncated.chars().all(|c| c == 'é'));
    }
}
