// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Keeps the model anchored to the document it was given.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Base every statement about the candidate on the resume text provided. \
    Do NOT invent employers, dates, titles, metrics or skills. \
    If the resume does not say something, say that it is missing instead of guessing.";

/// Keeps replies short enough to read in a chat panel.
pub const BREVITY_INSTRUCTION: &str = "\
    Answer in plain text, at most about 250 words. \
    Use short bullet lists when listing suggestions.";
