// Generation pipeline: job listing + stored resume -> tailored resume,
// cover letter and a tracked application.
// Upstream generation goes through crate::clients, persistence through
// crate::documents and crate::applications.

pub mod handlers;
pub mod orchestrator;
