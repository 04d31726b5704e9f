//! Keyword heuristics for local display. Nothing here is sent to the model.

pub mod severity;
pub mod root_cause;

pub use severity::*;
pub use root_cause::*;
