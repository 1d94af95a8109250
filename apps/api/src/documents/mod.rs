//! Resume and cover-letter documents.

pub mod cover_letters;
pub mod handlers;
pub mod resumes;
