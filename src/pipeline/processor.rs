//! Report processing orchestrator.
//!
//! Single entry point that drives one inspection/thermal document pair
//! through the pipeline:
//! extract text → segment + describe → thermal extraction → (image fallback)
//! → structural validation → entity-locked generation → verification.
//!
//! Collaborators (text extraction, the model, the image source) are borrowed
//! trait objects, so the whole run is testable with mock implementations.
//! Every model call goes through the caller's `RateGate`.

use std::path::Path;

use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::extraction::{ExtractionError, PdfTextExtractor};
use crate::pipeline::generation::{EntityLockContract, GenerationError, ReportGenerator};
use crate::pipeline::heuristics::{extract_root_cause, overall_severity, Severity};
use crate::pipeline::inspection::{parse_inspection, InspectionArea, SegmentationError};
use crate::pipeline::llm::{LlmClient, LlmError, RateGate};
use crate::pipeline::thermal::{ThermalError, ThermalExtractor, ThermalReading, ThermalRecord};
use crate::pipeline::validation::{
    inspection_completeness, thermal_completeness, validate, CompletenessReport, ValidationReport,
};
use crate::pipeline::vision::{
    merge_image_observations, merge_thermal_observations, ImageFindingSource, VisionError,
};
use crate::pipeline_config::{ImageFallback, PipelineConfig};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that halt a run. Nothing past the failing stage is produced.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Text extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Inspection segmentation failed: {0}")]
    Segmentation(#[from] SegmentationError),

    #[error("Thermal extraction failed: {0}")]
    Thermal(#[from] ThermalError),

    #[error("Image analysis failed: {0}")]
    Vision(#[from] VisionError),

    #[error("Structural validation failed: {}", .report.error_summary())]
    Validation { report: ValidationReport },

    #[error("Report generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure categories reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The documents do not have a structure the pipeline can trust.
    InputStructure,
    /// Generated output changed the number of areas.
    EntityLock,
    /// Daily request ceiling reached.
    Quota,
    /// Timeouts, overload or throttling from the model service.
    Transient,
    /// Non-transient rejection by the model service.
    Service,
    /// Missing or rejected credentials.
    Configuration,
    /// A pipeline invariant broke between stages.
    InternalConsistency,
    /// Unreadable, encrypted or missing PDF.
    Document,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InputStructure => "input structure",
            FailureKind::EntityLock => "entity lock",
            FailureKind::Quota => "quota",
            FailureKind::Transient => "transient",
            FailureKind::Service => "service",
            FailureKind::Configuration => "configuration",
            FailureKind::InternalConsistency => "internal consistency",
            FailureKind::Document => "document",
        }
    }
}

fn llm_kind(err: &LlmError) -> FailureKind {
    match err {
        LlmError::QuotaExceeded { .. } => FailureKind::Quota,
        LlmError::MissingApiKey(_) => FailureKind::Configuration,
        LlmError::Api { status: 401 | 403, .. } => FailureKind::Configuration,
        e if e.is_transient() => FailureKind::Transient,
        _ => FailureKind::Service,
    }
}

impl PipelineError {
    /// The model error underneath, whichever stage it surfaced from.
    pub fn llm_error(&self) -> Option<&LlmError> {
        match self {
            PipelineError::Thermal(ThermalError::Llm(e))
            | PipelineError::Vision(VisionError::Llm(e))
            | PipelineError::Generation(GenerationError::Llm(e)) => Some(e),
            _ => None,
        }
    }

    pub fn kind(&self) -> FailureKind {
        if let Some(e) = self.llm_error() {
            return llm_kind(e);
        }
        match self {
            PipelineError::Extraction(_) | PipelineError::Io { .. } => FailureKind::Document,
            PipelineError::Vision(VisionError::Extraction(_)) => FailureKind::Document,
            PipelineError::Segmentation(_)
            | PipelineError::Validation { .. }
            | PipelineError::Thermal(_)
            | PipelineError::Vision(VisionError::JsonParsing { .. }) => FailureKind::InputStructure,
            PipelineError::Vision(_) => FailureKind::InternalConsistency,
            PipelineError::Generation(GenerationError::EntityLock(_)) => FailureKind::EntityLock,
            PipelineError::Generation(GenerationError::EmptyResponse) => FailureKind::Service,
            PipelineError::Generation(_) => FailureKind::InternalConsistency,
        }
    }

    /// What the operator can do about it.
    pub fn hint(&self) -> Option<&'static str> {
        match self.kind() {
            FailureKind::Quota => Some(
                "The daily request limit is used up. Resume after local midnight, \
                 or raise DDR_RPD if your plan allows more requests.",
            ),
            FailureKind::Transient => self.llm_error().and_then(LlmError::operator_hint),
            FailureKind::Configuration => {
                Some("Set GEMINI_API_KEY to a valid key for the generation service.")
            }
            FailureKind::EntityLock => Some(
                "The model changed the number of areas. The validated data is intact; \
                 re-run generation.",
            ),
            FailureKind::InputStructure => Some(
                "Review the inspection report structure (area markers, thermal image IDs) \
                 before re-running.",
            ),
            FailureKind::Document => Some("Check that the file is a readable, unencrypted PDF."),
            FailureKind::Service | FailureKind::InternalConsistency => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Where a run's findings came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSource {
    Text,
    TextAndImages,
}

/// A successful run: the verified report plus what it was locked against.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    pub report_markdown: String,
    pub validation: ValidationReport,
    pub contract: EntityLockContract,
    pub inspection_source: FindingSource,
    pub thermal_source: FindingSource,
    pub api_calls: u32,
}

/// One area with local heuristics attached. Operator display only.
#[derive(Debug, Clone, Serialize)]
pub struct AreaInsight {
    pub area_name: String,
    pub negative_observations: Vec<String>,
    pub positive_observations: Vec<String>,
    pub severity: Severity,
    pub probable_root_cause: String,
}

impl From<&InspectionArea> for AreaInsight {
    fn from(area: &InspectionArea) -> Self {
        let joined = area.negative_observations.join(". ");
        Self {
            area_name: area.area_name.clone(),
            negative_observations: area.negative_observations.clone(),
            positive_observations: area.positive_observations.clone(),
            severity: overall_severity(&area.negative_observations),
            probable_root_cause: extract_root_cause(&joined, None),
        }
    }
}

/// Deterministic parse of an inspection report, no model involved.
#[derive(Debug, Clone, Serialize)]
pub struct ParseReport {
    pub areas: Vec<AreaInsight>,
    pub section_count: usize,
    pub unnamed_sections: usize,
    pub validation: ValidationReport,
    pub completeness: CompletenessReport,
}

/// Raw PDF bytes kept for the image fallback.
#[derive(Clone, Copy)]
struct SourceDocuments<'d> {
    inspection: &'d [u8],
    thermal: &'d [u8],
}

/// Deterministic parse of inspection text with validation and heuristics.
/// No model call and no credentials needed.
pub fn parse_report(inspection_text: &str, max_areas: usize) -> Result<ParseReport, PipelineError> {
    let parsed = parse_inspection(inspection_text, max_areas)?;
    let completeness = inspection_completeness(&parsed.areas);
    let validated = validate(parsed.areas, Vec::new(), max_areas);

    Ok(ParseReport {
        areas: validated.areas.iter().map(AreaInsight::from).collect(),
        section_count: parsed.section_count,
        unnamed_sections: parsed.unnamed_sections,
        validation: validated.report,
        completeness,
    })
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Runs one document pair end to end.
pub struct ReportProcessor<'a> {
    config: PipelineConfig,
    llm: &'a dyn LlmClient,
    text_extractor: &'a dyn PdfTextExtractor,
    image_source: Option<&'a dyn ImageFindingSource>,
}

impl<'a> ReportProcessor<'a> {
    pub fn new(
        config: PipelineConfig,
        llm: &'a dyn LlmClient,
        text_extractor: &'a dyn PdfTextExtractor,
    ) -> Self {
        Self {
            config,
            llm,
            text_extractor,
            image_source: None,
        }
    }

    /// Wire an image source. It is only consulted when the config enables
    /// image fallback and text extraction looks incomplete.
    pub fn with_image_source(mut self, source: &'a dyn ImageFindingSource) -> Self {
        self.image_source = Some(source);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Full pipeline from two files on disk.
    pub fn run_files(
        &self,
        gate: &mut RateGate,
        inspection_path: &Path,
        thermal_path: &Path,
    ) -> Result<PipelineOutcome, PipelineError> {
        let inspection = read_file(inspection_path)?;
        let thermal = read_file(thermal_path)?;
        self.run(gate, &inspection, &thermal)
    }

    /// Full pipeline from two PDF documents in memory.
    pub fn run(
        &self,
        gate: &mut RateGate,
        inspection_pdf: &[u8],
        thermal_pdf: &[u8],
    ) -> Result<PipelineOutcome, PipelineError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("ddr_run", run_id = %run_id);
        let _guard = span.enter();

        tracing::info!("Processing: starting text extraction");
        let inspection_text = self.text_extractor.extract_document_text(inspection_pdf)?;
        let thermal_text = self.text_extractor.extract_document_text(thermal_pdf)?;
        tracing::info!(
            inspection_chars = inspection_text.len(),
            thermal_chars = thermal_text.len(),
            "Text extracted"
        );

        let documents = SourceDocuments {
            inspection: inspection_pdf,
            thermal: thermal_pdf,
        };
        self.process(run_id, gate, &inspection_text, &thermal_text, Some(documents))
    }

    /// Pipeline from already-extracted text. Image fallback is unavailable
    /// here since there are no pages to render.
    pub fn process_texts(
        &self,
        gate: &mut RateGate,
        inspection_text: &str,
        thermal_text: &str,
    ) -> Result<PipelineOutcome, PipelineError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("ddr_run", run_id = %run_id);
        let _guard = span.enter();
        self.process(run_id, gate, inspection_text, thermal_text, None)
    }

    fn process(
        &self,
        run_id: Uuid,
        gate: &mut RateGate,
        inspection_text: &str,
        thermal_text: &str,
        documents: Option<SourceDocuments<'_>>,
    ) -> Result<PipelineOutcome, PipelineError> {
        // Step 1: deterministic areas
        let parsed = parse_inspection(inspection_text, self.config.max_areas)?;
        tracing::info!(
            sections = parsed.section_count,
            areas = parsed.areas.len(),
            unnamed = parsed.unnamed_sections,
            "Inspection parsed"
        );

        // Step 2: thermal readings
        let thermal = ThermalExtractor::new(self.llm, self.config.thermal_text_limit)
            .extract(gate, thermal_text)?;

        // Step 3: image fallback where text looks thin
        let (areas, inspection_source) =
            self.enhance_inspection(gate, parsed.areas, documents.map(|d| d.inspection))?;
        let (thermal, thermal_source) =
            self.enhance_thermal(gate, thermal, documents.map(|d| d.thermal))?;

        // Step 4: structural validation gates generation
        let validated = validate(areas, thermal, self.config.max_areas);
        for warning in &validated.report.warnings {
            tracing::warn!(warning = %warning, "Validation warning");
        }
        if !validated.report.valid {
            return Err(PipelineError::Validation {
                report: validated.report,
            });
        }

        // Step 5: entity-locked generation
        let contract = EntityLockContract::from_report(&validated.report);
        let report_markdown = ReportGenerator::new(self.llm).generate(
            gate,
            &validated.areas,
            validated.thermal_readings,
            contract,
        )?;

        tracing::info!(
            areas = contract.expected_area_count(),
            thermal = contract.expected_thermal_count(),
            api_calls = gate.calls_made(),
            "Processing complete"
        );

        Ok(PipelineOutcome {
            run_id,
            report_markdown,
            validation: validated.report,
            contract,
            inspection_source,
            thermal_source,
            api_calls: gate.calls_made(),
        })
    }

    /// Image source to use, if fallback is enabled and one is wired.
    fn image_source_for<'d>(
        &self,
        completeness: &CompletenessReport,
        document: Option<&'d [u8]>,
        label: &'static str,
    ) -> Option<(&'a dyn ImageFindingSource, &'d [u8])> {
        tracing::info!(
            report = label,
            missing_pct = completeness.missing_percentage,
            reason = %completeness.reason,
            "Text extraction completeness"
        );
        if self.config.image_fallback == ImageFallback::Disabled {
            tracing::info!(report = label, "Image fallback disabled; using text only");
            return None;
        }
        match (self.image_source, document) {
            (Some(source), Some(bytes)) => Some((source, bytes)),
            _ => {
                tracing::info!(report = label, "No image source or page data; using text only");
                None
            }
        }
    }

    fn enhance_inspection(
        &self,
        gate: &mut RateGate,
        areas: Vec<InspectionArea>,
        document: Option<&[u8]>,
    ) -> Result<(Vec<InspectionArea>, FindingSource), PipelineError> {
        let completeness = inspection_completeness(&areas);
        let Some((source, bytes)) = self.image_source_for(&completeness, document, "inspection") else {
            return Ok((areas, FindingSource::Text));
        };

        let observations = source.inspection_observations(gate, bytes)?;
        let outcome = merge_image_observations(areas, observations)?;
        Ok((outcome.areas, FindingSource::TextAndImages))
    }

    fn enhance_thermal(
        &self,
        gate: &mut RateGate,
        thermal: Vec<ThermalRecord>,
        document: Option<&[u8]>,
    ) -> Result<(Vec<ThermalRecord>, FindingSource), PipelineError> {
        let readings: Vec<ThermalReading> = thermal.iter().map(ThermalReading::from).collect();
        let completeness = thermal_completeness(&readings);
        let Some((source, bytes)) = self.image_source_for(&completeness, document, "thermal") else {
            return Ok((thermal, FindingSource::Text));
        };

        let image = source.thermal_observations(gate, bytes)?;
        Ok((merge_thermal_observations(thermal, image), FindingSource::TextAndImages))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<Vec<u8>, PipelineError> {
    std::fs::read(path).map_err(|source| PipelineError::Io {
        path: path.display().to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
