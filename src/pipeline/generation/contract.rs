use serde::Serialize;

use crate::pipeline::validation::ValidationReport;

/// Entity counts fixed before generation and checked against its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityLockContract {
    expected_area_count: usize,
    expected_thermal_count: usize,
}

impl EntityLockContract {
    pub fn new(expected_area_count: usize, expected_thermal_count: usize) -> Self {
        Self {
            expected_area_count,
            expected_thermal_count,
        }
    }

    /// Lock the counts computed by the validator.
    pub fn from_report(report: &ValidationReport) -> Self {
        Self::new(report.area_count, report.thermal_count)
    }

    pub fn expected_area_count(&self) -> usize {
        self.expected_area_count
    }

    pub fn expected_thermal_count(&self) -> usize {
        self.expected_thermal_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_takes_validator_counts() {
        let report = ValidationReport {
            valid: true,
            area_count: 7,
            thermal_count: 12,
            ..Default::default()
        };
        let contract = EntityLockContract::from_report(&report);
        assert_eq!(contract.expected_area_count(), 7);
        assert_eq!(contract.expected_thermal_count(), 12);
    }
}
