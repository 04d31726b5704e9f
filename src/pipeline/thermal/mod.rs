pub mod types;
pub mod prompt;
pub mod parser;
pub mod extractor;

pub use types::*;
pub use prompt::*;
pub use parser::*;
pub use extractor::*;

use thiserror::Error;

use super::llm::LlmError;

#[derive(Error, Debug)]
pub enum ThermalError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Malformed thermal response: {0}")]
    MalformedResponse(String),

    #[error("Thermal JSON parsing failed: {0}")]
    JsonParsing(String),
}
