use serde::Serialize;

use crate::pipeline::heuristics::{extract_root_cause, severity_indicator};
use crate::pipeline::inspection::InspectionArea;
use crate::pipeline::thermal::ThermalReading;
use crate::pipeline::{is_missing, REQUIRES_INVESTIGATION};

/// Missing-field metrics for one report. Image analysis is always requested:
/// text extraction never sees what only the photographs show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletenessReport {
    pub total: usize,
    pub missing_fields: usize,
    pub missing_percentage: f64,
    pub needs_image_analysis: bool,
    pub reason: String,
}

fn report(total: usize, fields_per_item: usize, missing_fields: usize, noun: &str) -> CompletenessReport {
    if total == 0 {
        return CompletenessReport {
            total: 0,
            missing_fields: 0,
            missing_percentage: 100.0,
            needs_image_analysis: true,
            reason: format!("No {noun} extracted from text"),
        };
    }

    let pct = missing_fields as f64 * 100.0 / (total * fields_per_item) as f64;
    let missing_percentage = (pct * 10.0).round() / 10.0;
    CompletenessReport {
        total,
        missing_fields,
        missing_percentage,
        needs_image_analysis: true,
        reason: format!("{missing_percentage:.1}% fields missing, {total} {noun} extracted"),
    }
}

fn missing_area_fields(area: &InspectionArea) -> usize {
    let observations = &area.negative_observations;
    let joined = observations.join(". ");
    let no_severity = !observations.iter().any(|o| severity_indicator(o).is_some());
    let no_cause = extract_root_cause(&joined, None) == REQUIRES_INVESTIGATION;

    [is_missing(&area.area_name), observations.is_empty(), no_severity, no_cause]
        .into_iter()
        .filter(|missing| *missing)
        .count()
}

/// Missing-field metrics for areas over four fields: name, observations,
/// a keyword-backed severity and a stated cause.
pub fn inspection_completeness(areas: &[InspectionArea]) -> CompletenessReport {
    let missing = areas.iter().map(missing_area_fields).sum();
    report(areas.len(), 4, missing, "areas")
}

/// Missing-field metrics for readings over three fields: image id,
/// temperature (hotspot or coldspot) and interpretation.
pub fn thermal_completeness(readings: &[ThermalReading]) -> CompletenessReport {
    let missing = readings
        .iter()
        .map(|r| {
            let no_temperature = is_missing(&r.hotspot) && is_missing(&r.coldspot);
            [is_missing(&r.image_id), no_temperature, is_missing(&r.interpretation)]
                .into_iter()
                .filter(|missing| *missing)
                .count()
        })
        .sum();
    report(readings.len(), 3, missing, "thermal readings")
}
