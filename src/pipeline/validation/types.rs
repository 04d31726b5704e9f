use serde::Serialize;

use crate::pipeline::inspection::InspectionArea;
use crate::pipeline::thermal::ThermalReading;

/// Outcome of structural validation. Any error blocks generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub area_count: usize,
    pub thermal_count: usize,
}

impl ValidationReport {
    pub fn error_summary(&self) -> String {
        self.errors.join("; ")
    }
}

/// Normalized inputs plus the report that judged them.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedData {
    pub report: ValidationReport,
    pub areas: Vec<InspectionArea>,
    pub thermal_readings: Vec<ThermalReading>,
}
