pub mod types;
pub mod gemini;
pub mod mock;
pub mod rate_gate;
pub mod response;

pub use types::*;
pub use gemini::*;
pub use mock::*;
pub use rate_gate::*;
pub use response::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Cannot reach generation API at {0}")]
    Connection(String),

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Generation API returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Generation API returned no text")]
    EmptyResponse,

    #[error("API key missing (set {0})")]
    MissingApiKey(&'static str),

    #[error("Daily limit of {limit} requests reached ({used} used). Quota resets at local midnight")]
    QuotaExceeded { limit: u32, used: u32 },
}

impl LlmError {
    /// Failures worth re-running as-is later (timeouts, overload, throttling).
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Connection(_) | LlmError::Timeout { .. } => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Operator-facing advice for transient failures.
    pub fn operator_hint(&self) -> Option<&'static str> {
        if self.is_transient() {
            Some("The generation service is busy or unreachable. Retry in a few moments, or reduce the number of pages/images sent per request.")
        } else {
            None
        }
    }
}
