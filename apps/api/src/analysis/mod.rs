// Résumé analysis: prompt composition, the completion-backed analyzer,
// the POST /analyze/ handler and the opt-in structured report.

pub mod analyzer;
pub mod handlers;
pub mod prompts;
pub mod report;
