use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::chat::{chat_about_resume, ChatReply};
use crate::errors::AppError;
use crate::llm_client::Message;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResumeChatRequest {
    pub owner_id: Uuid,
    pub resume_id: Uuid,
    pub messages: Vec<Message>,
}

/// POST /api/v1/chat/resume
pub async fn handle_resume_chat(
    State(state): State<AppState>,
    Json(request): Json<ResumeChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let resume = state
        .resumes
        .get_resume(request.owner_id, request.resume_id)
        .await?;
    let reply = chat_about_resume(
        &state.resumes,
        state.text_extractor.as_ref(),
        state.llm.as_ref(),
        &resume,
        &request.messages,
    )
    .await?;
    Ok(Json(reply))
}
