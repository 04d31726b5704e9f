use serde::de::DeserializeOwned;

use super::{ImageFindingSource, ImageObservation, VisionError};
use crate::pipeline::extraction::{create_image_batches, estimate_batch_count, PdfPageRenderer};
use crate::pipeline::llm::{generate_gated, parse_array_lenient, parse_json_reply, LlmClient, RateGate};
use crate::pipeline::thermal::ThermalRecord;
use crate::pipeline_config::PipelineConfig;

const IMAGE_INSPECTION_PROMPT: &str = r#"Analyze these inspection report pages (images).

CRITICAL RULES:
1. DO NOT create new areas
2. DO NOT generate severity
3. DO NOT generate root cause
4. ONLY extract what you see

Extract findings that are clearly visible in the images:
- Room name (Hall, Bedroom, Kitchen, etc.)
- Visible defect observation

Return a JSON array (no markdown, just JSON):
[
  {"area": "Hall", "observation": "Visible dampness at skirting level"}
]

IMPORTANT:
- Use EXACT room names from the images
- Keep observations factual and concise
- If a room name does not clearly match an impacted room from the report, leave it out
"#;

const IMAGE_THERMAL_PROMPT: &str = r#"Analyze these thermal imaging report pages (images).

Extract thermal readings visible in the images. Identify each reading by its
thermal image file name. Do NOT create area or room names.

Return a JSON array (no markdown, just JSON):
[
  {
    "image_id": "",
    "hotspot": "",
    "coldspot": "",
    "temperature_difference": "",
    "interpretation": ""
  }
]

If a value is not visible, use "Not Available". Return ONLY valid JSON.
"#;

/// Rendering and batching limits for image analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub max_pages: usize,
    pub dpi: u32,
    pub images_per_batch: usize,
}

impl From<&PipelineConfig> for RenderSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            max_pages: config.max_image_pages,
            dpi: config.render_dpi,
            images_per_batch: config.images_per_batch,
        }
    }
}

/// Renders pages and asks the model to read them, one gated call per batch.
pub struct LlmImageAnalyzer<'a> {
    llm: &'a dyn LlmClient,
    renderer: &'a dyn PdfPageRenderer,
    settings: RenderSettings,
}

impl<'a> LlmImageAnalyzer<'a> {
    pub fn new(llm: &'a dyn LlmClient, renderer: &'a dyn PdfPageRenderer, settings: RenderSettings) -> Self {
        Self {
            llm,
            renderer,
            settings,
        }
    }

    fn analyze<T: DeserializeOwned>(
        &self,
        gate: &mut RateGate,
        pdf_bytes: &[u8],
        prompt: &str,
        wrapper_key: &str,
    ) -> Result<Vec<T>, VisionError> {
        let images = self
            .renderer
            .render_pages(pdf_bytes, self.settings.max_pages, self.settings.dpi)?;
        let total_batches = estimate_batch_count(images.len(), self.settings.images_per_batch);
        tracing::info!(pages = images.len(), batches = total_batches, "Analyzing page images");

        let mut findings = Vec::new();
        for (i, batch) in create_image_batches(images, self.settings.images_per_batch)
            .into_iter()
            .enumerate()
        {
            tracing::info!(
                batch = i + 1,
                of = total_batches,
                pages = %batch.page_range(),
                "Processing image batch"
            );
            let reply = generate_gated(self.llm, gate, prompt, &batch.images)?;
            let value = parse_json_reply(&reply).map_err(|e| VisionError::JsonParsing {
                pages: batch.page_range(),
                reason: e.to_string(),
            })?;

            let items: &[serde_json::Value] = match &value {
                serde_json::Value::Array(items) => items,
                serde_json::Value::Object(map) => match map.get(wrapper_key) {
                    Some(serde_json::Value::Array(items)) => items,
                    _ => &[],
                },
                _ => &[],
            };
            findings.extend(parse_array_lenient::<T>(items));
        }

        tracing::info!(count = findings.len(), "Image findings extracted");
        Ok(findings)
    }
}

impl ImageFindingSource for LlmImageAnalyzer<'_> {
    fn inspection_observations(
        &self,
        gate: &mut RateGate,
        pdf_bytes: &[u8],
    ) -> Result<Vec<ImageObservation>, VisionError> {
        self.analyze(gate, pdf_bytes, IMAGE_INSPECTION_PROMPT, "observations")
    }

    fn thermal_observations(
        &self,
        gate: &mut RateGate,
        pdf_bytes: &[u8],
    ) -> Result<Vec<ThermalRecord>, VisionError> {
        self.analyze(gate, pdf_bytes, IMAGE_THERMAL_PROMPT, "thermal_readings")
    }
}
