use async_trait::async_trait;
use tracing::debug;

use crate::analysis::prompts::build_prompt;
use crate::llm_client::{LlmClient, LlmError};

/// The analyzer trait. Implement this to swap the completion backend without
/// touching the handler.
///
/// Carried in `AppState` as `Arc<dyn ResumeAnalyzer>`.
#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    /// Returns the model's raw reply for `resume_text` against `role`.
    async fn analyze(&self, resume_text: &str, role: &str) -> Result<String, LlmError>;
}

/// Completion-service analyzer. Composes the ATS prompt and returns the reply as-is.
pub struct LlmResumeAnalyzer(pub LlmClient);

#[async_trait]
impl ResumeAnalyzer for LlmResumeAnalyzer {
    async fn analyze(&self, resume_text: &str, role: &str) -> Result<String, LlmError> {
        let prompt = build_prompt(resume_text, role);
        debug!("Sending ATS prompt ({} chars)", prompt.len());
        self.0.complete(&prompt).await
    }
}
