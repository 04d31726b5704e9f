use super::rate_gate::RateGate;
use super::LlmError;
use crate::pipeline::extraction::EncodedImage;

/// Narrative-generation client abstraction (allows mocking)
pub trait LlmClient {
    /// Send a text prompt, optionally with page images, and return the text reply.
    fn generate(&self, prompt: &str, images: &[EncodedImage]) -> Result<String, LlmError>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}

/// Acquire a rate-gate slot, then call the model.
///
/// Every model call in the pipeline goes through here so the per-minute
/// pacing and the daily ceiling apply uniformly.
pub fn generate_gated(
    llm: &dyn LlmClient,
    gate: &mut RateGate,
    prompt: &str,
    images: &[EncodedImage],
) -> Result<String, LlmError> {
    let ticket = gate.acquire()?;
    tracing::info!(
        model = llm.model_name(),
        call_number = ticket.call_number,
        daily_limit = ticket.daily_limit,
        waited_ms = ticket.waited_ms,
        images = images.len(),
        "Model call"
    );
    llm.generate(prompt, images)
}
