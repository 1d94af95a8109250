//! Resume assistant: multi-turn LLM conversation about one stored resume.
//!
//! Flow: load resume → extract text → build system prompt → LLM chat.
//! When no text can be extracted the LLM is never called.

pub mod handlers;
pub mod prompts;

use serde::Serialize;
use tracing::info;

use crate::chat::prompts::{RESUME_CHAT_SYSTEM, RESUME_CONTEXT_TEMPLATE};
use crate::clients::TextExtractor;
use crate::documents::resumes::ResumeStore;
use crate::errors::AppError;
use crate::llm_client::prompts::{BREVITY_INSTRUCTION, GROUNDING_INSTRUCTION};
use crate::llm_client::{ChatModel, Message, Role};
use crate::models::resume::{Resume, ResumeContent};

/// Resume text beyond this many characters is cut before prompting.
const MAX_RESUME_CHARS: usize = 20_000;
const MAX_TURNS: usize = 40;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    Ok,
    NoTextExtracted,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: Option<String>,
    pub status: ChatStatus,
}

/// Plain text of a resume: stored text for tailored resumes, extracted PDF
/// text otherwise. `None` when nothing could be extracted.
pub async fn resume_text(
    store: &ResumeStore,
    extractor: &dyn TextExtractor,
    resume: &Resume,
) -> Result<Option<String>, AppError> {
    if let ResumeContent::Tailored { text, .. } = &resume.content {
        return Ok(Some(text.clone()).filter(|t| !t.trim().is_empty()));
    }
    let file = store.resume_file(resume).await?;
    Ok(extractor.extract_text(&file).await?)
}

/// Conversation must start with the user, alternate roles and end on a user turn.
pub fn validate_history(messages: &[Message]) -> Result<(), AppError> {
    if messages.is_empty() {
        return Err(AppError::Validation("messages cannot be empty".to_string()));
    }
    if messages.len() > MAX_TURNS {
        return Err(AppError::Validation(format!(
            "conversation is limited to {MAX_TURNS} messages"
        )));
    }
    for (i, message) in messages.iter().enumerate() {
        let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
        if message.role != expected {
            return Err(AppError::Validation(format!(
                "message {i} should come from the {}",
                if expected == Role::User { "user" } else { "assistant" }
            )));
        }
        if message.content.trim().is_empty() {
            return Err(AppError::Validation(format!("message {i} is empty")));
        }
    }
    if messages.len() % 2 == 0 {
        return Err(AppError::Validation(
            "the last message must come from the user".to_string(),
        ));
    }
    Ok(())
}

pub fn build_system_prompt(title: &str, resume_text: &str) -> String {
    let resume_text = truncate_chars(resume_text.trim(), MAX_RESUME_CHARS);
    let context = RESUME_CONTEXT_TEMPLATE
        .replace("{title}", title)
        .replace("{resume_text}", resume_text);
    format!("{RESUME_CHAT_SYSTEM}\n\n{GROUNDING_INSTRUCTION}\n{BREVITY_INSTRUCTION}\n\n{context}")
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

pub async fn chat_about_resume(
    store: &ResumeStore,
    extractor: &dyn TextExtractor,
    llm: &dyn ChatModel,
    resume: &Resume,
    messages: &[Message],
) -> Result<ChatReply, AppError> {
    validate_history(messages)?;

    let Some(text) = resume_text(store, extractor, resume).await? else {
        info!("No text extracted from resume {}; skipping LLM", resume.id);
        return Ok(ChatReply {
            reply: None,
            status: ChatStatus::NoTextExtracted,
        });
    };

    let system = build_system_prompt(&resume.title, &text);
    let reply = llm
        .chat(&system, messages)
        .await
        .map_err(|e| AppError::Llm(format!("Resume chat failed: {e}")))?;

    Ok(ChatReply {
        reply: Some(reply),
        status: ChatStatus::Ok,
    })
}
