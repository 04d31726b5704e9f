//! Image-based observation source. The processor leaves it unwired unless
//! image fallback is enabled in the pipeline config.

pub mod analyzer;
pub mod merge;

pub use analyzer::*;
pub use merge::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::extraction::ExtractionError;
use super::llm::{LlmError, RateGate};
use super::thermal::ThermalRecord;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Image findings JSON parsing failed (pages {pages}): {reason}")]
    JsonParsing { pages: String, reason: String },

    #[error("Area count changed during image merge: {before} before, {after} after")]
    AreaCountChanged { before: usize, after: usize },
}

/// One visible defect reported from page images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageObservation {
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub observation: String,
}

/// Source of observations read from rendered report pages.
pub trait ImageFindingSource {
    fn inspection_observations(
        &self,
        gate: &mut RateGate,
        pdf_bytes: &[u8],
    ) -> Result<Vec<ImageObservation>, VisionError>;

    fn thermal_observations(
        &self,
        gate: &mut RateGate,
        pdf_bytes: &[u8],
    ) -> Result<Vec<ThermalRecord>, VisionError>;
}
