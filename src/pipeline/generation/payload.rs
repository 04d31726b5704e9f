use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::pipeline::inspection::InspectionArea;
use crate::pipeline::thermal::ThermalReading;
use crate::pipeline::{is_missing, NOT_AVAILABLE};

/// Typed data handed to the model. Root cause is never inferred here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPayload {
    pub inspection: InspectionPayload,
    pub thermal: ThermalPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectionPayload {
    pub areas: Vec<AreaPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaPayload {
    pub area_name: String,
    pub negative_observations: Vec<String>,
    pub positive_observations: Vec<String>,
    pub probable_root_cause: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermalPayload {
    pub thermal_readings: Vec<ThermalReadingPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermalReadingPayload {
    pub image_id: String,
    pub hotspot: String,
    pub coldspot: String,
    pub temperature_difference: String,
    pub interpretation: String,
}

static TEMPERATURE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:hot|cold|diff):").expect("valid regex"));

static DAMPNESS_TYPO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bdamness\b").expect("valid regex"));

/// One-line observation text with the common "damness" typo fixed.
pub fn clean_observation(text: &str) -> String {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    DAMPNESS_TYPO
        .replace_all(&flattened, |caps: &regex::Captures| {
            if caps[0].starts_with('D') {
                "Dampness"
            } else {
                "dampness"
            }
        })
        .into_owned()
}

/// "Hot: 28.8" -> "28.8 °C". Non-numeric text is left as is.
pub fn clean_temperature(value: &str) -> String {
    if is_missing(value) {
        return NOT_AVAILABLE.to_string();
    }

    let stripped = TEMPERATURE_PREFIX.replace_all(value, "");
    let stripped = stripped.trim();
    if stripped.is_empty() {
        return NOT_AVAILABLE.to_string();
    }

    if !stripped.contains("°C") && stripped.chars().any(|c| c.is_ascii_digit()) {
        format!("{stripped} °C")
    } else {
        stripped.to_string()
    }
}

pub fn build_payload(areas: &[InspectionArea], thermal: &[ThermalReading]) -> ReportPayload {
    let clean_all = |items: &[String]| -> Vec<String> {
        items
            .iter()
            .map(|s| clean_observation(s))
            .filter(|s| !s.is_empty())
            .collect()
    };

    ReportPayload {
        inspection: InspectionPayload {
            areas: areas
                .iter()
                .map(|a| AreaPayload {
                    area_name: a.area_name.clone(),
                    negative_observations: clean_all(&a.negative_observations),
                    positive_observations: clean_all(&a.positive_observations),
                    probable_root_cause: NOT_AVAILABLE,
                })
                .collect(),
        },
        thermal: ThermalPayload {
            thermal_readings: thermal
                .iter()
                .map(|t| ThermalReadingPayload {
                    image_id: t.image_id.clone(),
                    hotspot: clean_temperature(&t.hotspot),
                    coldspot: clean_temperature(&t.coldspot),
                    temperature_difference: clean_temperature(&t.temperature_difference),
                    interpretation: t.interpretation.clone(),
                })
                .collect(),
        },
    }
}
