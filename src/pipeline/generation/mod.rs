pub mod contract;
pub mod payload;
pub mod prompt;
pub mod verify;
pub mod generator;

pub use contract::*;
pub use payload::*;
pub use prompt::*;
pub use verify::*;
pub use generator::*;

use thiserror::Error;

use super::llm::LlmError;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    EntityLock(#[from] EntityLockViolation),

    #[error(
        "Thermal count {thermal_count} does not match unique image IDs {distinct_ids}. \
         Duplication defect detected"
    )]
    InternalConsistency {
        thermal_count: usize,
        distinct_ids: usize,
    },

    #[error("Locked {field} count is {locked} but {supplied} were supplied for generation")]
    ContractMismatch {
        field: &'static str,
        locked: usize,
        supplied: usize,
    },

    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Model returned an empty report")]
    EmptyResponse,
}
