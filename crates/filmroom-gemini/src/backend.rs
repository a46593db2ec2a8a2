//! Inference backend seam.

use async_trait::async_trait;

use crate::error::GeminiResult;
use crate::types::{ModelCandidate, PromptPart};

/// A service that can run one prompt against one model candidate.
///
/// The orchestrator walks its candidate list and calls this once per
/// candidate; implementations must not retry across models themselves.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Run `prompt` on `candidate` and return the raw output text.
    async fn generate_content(
        &self,
        candidate: &ModelCandidate,
        prompt: &[PromptPart],
    ) -> GeminiResult<String>;
}
