use super::contract::EntityLockContract;
use super::payload::build_payload;
use super::prompt::build_generation_prompt;
use super::verify::verify_entity_lock;
use super::GenerationError;
use crate::pipeline::inspection::InspectionArea;
use crate::pipeline::llm::{generate_gated, LlmClient, RateGate};
use crate::pipeline::thermal::{dedup_by_image_id, distinct_image_ids, ThermalReading};

/// Formats validated data into a report through the model, under an entity lock.
///
/// The model only writes prose. Its output is accepted only when the number of
/// "Area <n>:" headings equals the locked area count; there is no retry.
pub struct ReportGenerator<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    pub fn generate(
        &self,
        gate: &mut RateGate,
        areas: &[InspectionArea],
        thermal: Vec<ThermalReading>,
        contract: EntityLockContract,
    ) -> Result<String, GenerationError> {
        let before = thermal.len();
        let (thermal, dropped) = dedup_by_image_id(thermal);
        if !dropped.is_empty() {
            tracing::warn!(before, after = thermal.len(), "Duplicate thermal readings removed before generation");
        }

        let distinct_ids = distinct_image_ids(&thermal);
        if thermal.len() != distinct_ids {
            return Err(GenerationError::InternalConsistency {
                thermal_count: thermal.len(),
                distinct_ids,
            });
        }

        check_locked("area", contract.expected_area_count(), areas.len())?;
        check_locked("thermal", contract.expected_thermal_count(), thermal.len())?;

        let payload = build_payload(areas, &thermal);
        let json_data = serde_json::to_string_pretty(&payload)?;
        let prompt = build_generation_prompt(&contract, &json_data);

        tracing::info!(
            areas = contract.expected_area_count(),
            thermal = contract.expected_thermal_count(),
            "Entity lock active, generating report"
        );

        let report = generate_gated(self.llm, gate, &prompt, &[])?;
        if report.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        verify_entity_lock(&report, &contract)?;
        Ok(report)
    }
}

fn check_locked(field: &'static str, locked: usize, supplied: usize) -> Result<(), GenerationError> {
    if locked != supplied {
        return Err(GenerationError::ContractMismatch {
            field,
            locked,
            supplied,
        });
    }
    Ok(())
}
