pub mod application;
pub mod cover_letter;
pub mod resume;
