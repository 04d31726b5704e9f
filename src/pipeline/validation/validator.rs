//! Structural checks between extraction and generation.
//!
//! Errors here mean an area and a thermal reading have been confused, or the
//! area list is implausibly large. Both would let the model report entities
//! that do not exist, so they block generation. Everything else is a warning.

use std::collections::HashSet;

use super::types::{ValidatedData, ValidationReport};
use crate::pipeline::inspection::InspectionArea;
use crate::pipeline::thermal::{dedup_by_image_id, ThermalReading, ThermalRecord};
use crate::pipeline::{is_missing, NOT_AVAILABLE};

/// Default area ceiling.
pub const MAX_AREAS: usize = 20;

/// Names listed in the overflow error before "... (and N more)".
const AREA_PREVIEW_LIMIT: usize = 10;

/// Names considered when building the overflow preview.
const AREA_PREVIEW_SCAN: usize = 30;

/// Substrings that mark a thermal image file or device code.
const THERMAL_ID_PATTERNS: &[&str] = &[".jpg", ".jpeg", ".png", "rb0", "rb_", "ir_", "ir0"];

/// Room words that should not appear in a thermal image id.
const ROOM_WORDS: &[&str] = &["hall", "bedroom", "kitchen", "bathroom", "living", "dining"];

const SUSPICIOUS_NAME_CHARS: usize = 30;
const SUSPICIOUS_UPPERCASE_CHARS: usize = 10;

pub struct StructuralValidator {
    max_areas: usize,
}

impl Default for StructuralValidator {
    fn default() -> Self {
        Self::new(MAX_AREAS)
    }
}

impl StructuralValidator {
    pub fn new(max_areas: usize) -> Self {
        Self { max_areas }
    }

    /// Check and normalize extracted data. Never fails; problems are
    /// collected into the report.
    pub fn validate(&self, areas: Vec<InspectionArea>, thermal: Vec<ThermalRecord>) -> ValidatedData {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if check_area_count(&areas, self.max_areas, &mut errors, &mut warnings) {
            check_area_names(&areas, &mut errors, &mut warnings);
            check_thermal_shape(&thermal, &mut errors, &mut warnings);
            check_thermal_area_collisions(&areas, &thermal, &mut warnings);
        }

        let areas = normalize_areas(areas);
        let thermal_readings = normalize_thermal(thermal, &mut warnings);

        let report = ValidationReport {
            valid: errors.is_empty(),
            area_count: areas.len(),
            thermal_count: thermal_readings.len(),
            errors,
            warnings,
        };

        if report.valid {
            tracing::info!(
                areas = report.area_count,
                thermal = report.thermal_count,
                warnings = report.warnings.len(),
                "Structural validation passed"
            );
        } else {
            tracing::warn!(
                errors = report.errors.len(),
                warnings = report.warnings.len(),
                "Structural validation failed"
            );
        }

        ValidatedData {
            report,
            areas,
            thermal_readings,
        }
    }
}

/// Validate with a given area ceiling.
pub fn validate(
    areas: Vec<InspectionArea>,
    thermal: Vec<ThermalRecord>,
    max_areas: usize,
) -> ValidatedData {
    StructuralValidator::new(max_areas).validate(areas, thermal)
}

/// Returns false when the count overflows and the remaining checks are skipped.
fn check_area_count(
    areas: &[InspectionArea],
    max_areas: usize,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) -> bool {
    let count = areas.len();

    if count > max_areas {
        let names: Vec<&str> = areas
            .iter()
            .take(AREA_PREVIEW_SCAN)
            .map(|a| a.area_name.as_str())
            .collect();
        let mut preview = names
            .iter()
            .take(AREA_PREVIEW_LIMIT)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        if names.len() > AREA_PREVIEW_LIMIT {
            preview.push_str(&format!(
                " ... (and {} more)",
                names.len() - AREA_PREVIEW_LIMIT
            ));
        }
        errors.push(format!(
            "Area count {count} exceeds maximum {max_areas}. \
             Likely hallucination from thermal IDs or metadata. Areas found: {preview}"
        ));
        return false;
    }

    if count == 0 {
        warnings.push("No areas extracted from inspection report".into());
    }
    true
}

fn looks_like_thermal_id(name: &str) -> bool {
    let lower = name.to_lowercase();
    THERMAL_ID_PATTERNS.iter().any(|p| lower.contains(p))
}

fn looks_like_code(name: &str) -> bool {
    let chars = name.chars().count();
    let has_letters = name.chars().any(char::is_alphabetic);
    let all_upper = has_letters && !name.chars().any(char::is_lowercase);
    chars > SUSPICIOUS_NAME_CHARS || (all_upper && chars > SUSPICIOUS_UPPERCASE_CHARS)
}

fn check_area_names(areas: &[InspectionArea], errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    for area in areas {
        let name = area.area_name.trim();
        if looks_like_thermal_id(name) {
            errors.push(format!(
                "Thermal image ID detected in areas: '{name}'. \
                 Thermal IDs must NOT be treated as areas."
            ));
        } else if looks_like_code(name) {
            warnings.push(format!("Suspicious area name (might be ID): '{name}'"));
        }
    }
}

fn check_thermal_shape(thermal: &[ThermalRecord], errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    for (i, record) in thermal.iter().enumerate() {
        if record.has_area_key() && !record.has_image_id_key() {
            errors.push(format!(
                "Thermal reading {i} uses 'area' instead of 'image_id'. \
                 This causes thermal IDs to be treated as areas."
            ));
            continue;
        }

        let Some(image_id) = record.image_id_value().map(str::trim) else {
            continue;
        };
        if is_missing(image_id) {
            continue;
        }

        let lower = image_id.to_lowercase();
        if ROOM_WORDS.iter().any(|w| lower.contains(w)) {
            warnings.push(format!("Thermal image_id looks like area name: '{image_id}'"));
        }
    }
}

fn check_thermal_area_collisions(
    areas: &[InspectionArea],
    thermal: &[ThermalRecord],
    warnings: &mut Vec<String>,
) {
    let area_names: HashSet<String> = areas
        .iter()
        .map(|a| a.area_name.trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect();

    for image_id in thermal.iter().filter_map(ThermalRecord::image_id_value) {
        let image_id = image_id.trim();
        if !image_id.is_empty() && area_names.contains(&image_id.to_lowercase()) {
            warnings.push(format!(
                "Thermal image_id '{image_id}' matches area name. Verify separation is correct."
            ));
        }
    }
}

fn normalize_areas(areas: Vec<InspectionArea>) -> Vec<InspectionArea> {
    let clean_list = |items: Vec<String>| -> Vec<String> {
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };

    areas
        .into_iter()
        .map(|area| {
            let name = area.area_name.trim();
            InspectionArea {
                area_name: if name.is_empty() {
                    NOT_AVAILABLE.to_string()
                } else {
                    name.to_string()
                },
                negative_observations: clean_list(area.negative_observations),
                positive_observations: clean_list(area.positive_observations),
            }
        })
        .collect()
}

fn normalize_thermal(thermal: Vec<ThermalRecord>, warnings: &mut Vec<String>) -> Vec<ThermalReading> {
    let readings = thermal.iter().map(ThermalReading::from).collect();

    let (kept, dropped) = dedup_by_image_id(readings);
    for id in dropped {
        warnings.push(format!("Duplicate thermal reading '{id}' dropped (first occurrence kept)"));
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(name: &str, negative: &[&str]) -> InspectionArea {
        InspectionArea {
            area_name: name.into(),
            negative_observations: negative.iter().map(|s| s.to_string()).collect(),
            positive_observations: vec![],
        }
    }

    fn record(json: &str) -> ThermalRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn clean_input_is_valid() {
        let result = validate(
            vec![area("Hall", &["Skirting dampness"]), area("Kitchen", &["Wall crack"])],
            vec![record(r#"{"image_id": "RB02380X.JPG", "hotspot": "28.4"}"#)],
            20,
        );
        assert!(result.report.valid);
        assert!(result.report.errors.is_empty());
        assert_eq!(result.report.area_count, 2);
        assert_eq!(result.report.thermal_count, 1);
        assert_eq!(result.thermal_readings[0].coldspot, NOT_AVAILABLE);
    }

    #[test]
    fn overflow_is_error_with_preview() {
        let areas: Vec<_> = (1..=25).map(|n| area(&format!("Room {n}"), &[])).collect();
        let result = validate(areas, vec![], 20);
        assert!(!result.report.valid);
        assert_eq!(result.report.errors.len(), 1);
        let msg = &result.report.errors[0];
        assert!(msg.contains("Area count 25 exceeds maximum 20"));
        assert!(msg.contains("Room 1, Room 2"));
        assert!(msg.contains("Room 10 ... (and 15 more)"));
        assert!(!msg.contains("Room 11,"));
        // Normalization still runs and counts reflect it.
        assert_eq!(result.report.area_count, 25);
    }

    #[test]
    fn overflow_skips_other_checks() {
        let mut areas: Vec<_> = (1..=21).map(|n| area(&format!("Room {n}"), &[])).collect();
        areas.push(area("IR_0042.jpg", &[]));
        let result = validate(areas, vec![record(r#"{"area": "Hall"}"#)], 20);
        assert_eq!(result.report.errors.len(), 1);
    }

    #[test]
    fn empty_areas_warn() {
        let result = validate(vec![], vec![], 20);
        assert!(result.report.valid);
        assert_eq!(result.report.warnings, vec!["No areas extracted from inspection report"]);
    }

    #[test]
    fn image_like_area_names_are_errors() {
        for name in ["RB02380X.JPG", "photo.jpeg", "scan.PNG", "rb0123", "ir_0042", "IR0042 Hall"] {
            let result = validate(vec![area(name, &[])], vec![], 20);
            assert!(!result.report.valid, "{name} should be rejected");
            assert!(result.report.errors[0].contains("Thermal image ID detected"));
            assert!(result.report.warnings.is_empty(), "{name} should not only warn");
        }
    }

    #[test]
    fn every_offending_area_reported() {
        let result = validate(
            vec![area("A.JPG", &[]), area("Hall", &[]), area("B.png", &[])],
            vec![],
            20,
        );
        assert_eq!(result.report.errors.len(), 2);
    }

    #[test]
    fn suspicious_names_warn() {
        let result = validate(
            vec![
                area("MASTERBEDROOMX", &[]),
                area("A very long description that is clearly not a room name", &[]),
                area("MB Bathroom", &[]),
                area("HALL", &[]),
            ],
            vec![],
            20,
        );
        assert!(result.report.valid);
        assert_eq!(result.report.warnings.len(), 2);
    }

    #[test]
    fn area_key_without_image_id_is_error() {
        let result = validate(
            vec![area("Hall", &["Dampness"])],
            vec![
                record(r#"{"image_id": "A.JPG"}"#),
                record(r#"{"area": "Hall", "hotspot": "30"}"#),
            ],
            20,
        );
        assert!(!result.report.valid);
        assert!(result.report.errors[0].starts_with("Thermal reading 1 uses 'area'"));
    }

    #[test]
    fn area_key_alongside_image_id_is_allowed() {
        let result = validate(
            vec![area("Hall", &[])],
            vec![record(r#"{"image_id": "A.JPG", "area": "Hall"}"#)],
            20,
        );
        assert!(result.report.valid);
    }

    #[test]
    fn room_word_in_image_id_warns() {
        let result = validate(
            vec![area("Hall", &[])],
            vec![record(r#"{"image_id": "Kitchen_01.jpg"}"#)],
            20,
        );
        assert!(result.report.valid);
        assert!(result.report.warnings[0].contains("looks like area name"));
    }

    #[test]
    fn image_id_matching_area_name_warns() {
        let result = validate(
            vec![area("Balcony", &[])],
            vec![record(r#"{"image_id": " balcony "}"#)],
            20,
        );
        assert!(result.report.valid);
        assert!(result
            .report
            .warnings
            .iter()
            .any(|w| w.contains("matches area name")));
    }

    #[test]
    fn normalization_fills_sentinels() {
        let result = validate(
            vec![area("  ", &["", "  Crack ", " "])],
            vec![record(
                r#"{"image_id": null, "hotspot": "", "coldspot": 21.5, "interpretation": "  "}"#,
            )],
            20,
        );
        let a = &result.areas[0];
        assert_eq!(a.area_name, NOT_AVAILABLE);
        assert_eq!(a.negative_observations, vec!["Crack"]);
        let t = &result.thermal_readings[0];
        assert_eq!(t.image_id, NOT_AVAILABLE);
        assert_eq!(t.hotspot, NOT_AVAILABLE);
        assert_eq!(t.coldspot, "21.5");
        assert_eq!(t.temperature_difference, NOT_AVAILABLE);
        assert_eq!(t.interpretation, NOT_AVAILABLE);
    }

    #[test]
    fn normalization_runs_on_invalid_input() {
        let result = validate(
            vec![area("A.JPG", &[""])],
            vec![record(r#"{"area": "Hall"}"#)],
            20,
        );
        assert!(!result.report.valid);
        assert!(result.areas[0].negative_observations.is_empty());
        assert_eq!(result.thermal_readings[0].image_id, NOT_AVAILABLE);
    }

    #[test]
    fn duplicate_thermal_ids_collapse() {
        let result = validate(
            vec![area("Hall", &[])],
            vec![
                record(r#"{"image_id": "A.JPG", "hotspot": "30"}"#),
                record(r#"{"image_id": "A.JPG", "hotspot": "31"}"#),
            ],
            20,
        );
        assert_eq!(result.report.thermal_count, 1);
        assert_eq!(result.thermal_readings[0].hotspot, "30");
        assert!(result.report.warnings.iter().any(|w| w.contains("Duplicate thermal reading")));
    }

    #[test]
    fn default_validator_uses_twenty() {
        let areas: Vec<_> = (1..=21).map(|n| area(&format!("Room {n}"), &[])).collect();
        let result = StructuralValidator::default().validate(areas, vec![]);
        assert!(!result.report.valid);
    }
}
