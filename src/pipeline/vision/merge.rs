use std::collections::HashMap;

use super::{ImageObservation, VisionError};
use crate::pipeline::inspection::{normalize_area_name, InspectionArea};
use crate::pipeline::thermal::ThermalRecord;

/// Unmatched observations logged individually before going quiet.
const IGNORED_LOG_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub areas: Vec<InspectionArea>,
    pub enhanced: usize,
    pub ignored: usize,
}

fn match_key(name: &str) -> String {
    normalize_area_name(&name.replace(['_', '-'], " "))
}

/// Attach image observations to existing areas. Never creates areas.
///
/// An observation whose area matches an existing area (case, whitespace,
/// `_` and `-` ignored) is appended to that area's negative observations.
/// Anything else is ignored.
pub fn merge_image_observations(
    areas: Vec<InspectionArea>,
    observations: Vec<ImageObservation>,
) -> Result<MergeOutcome, VisionError> {
    if areas.is_empty() {
        tracing::warn!(
            observations = observations.len(),
            "No text areas to merge image observations into"
        );
        return Ok(MergeOutcome {
            areas: Vec::new(),
            enhanced: 0,
            ignored: observations.len(),
        });
    }

    let before = areas.len();
    let mut areas = areas;
    let index: HashMap<String, usize> = areas
        .iter()
        .enumerate()
        .map(|(i, a)| (match_key(&a.area_name), i))
        .rev() // first area wins on key collisions
        .collect();

    let mut enhanced = 0;
    let mut ignored = 0;

    for item in observations {
        let area = item.area.trim();
        let observation = item.observation.trim();
        if area.is_empty() || observation.is_empty() {
            continue;
        }

        match index.get(&match_key(area)) {
            Some(&i) => {
                areas[i].negative_observations.push(observation.to_string());
                enhanced += 1;
            }
            None => {
                ignored += 1;
                if ignored <= IGNORED_LOG_LIMIT {
                    tracing::warn!(area, "Ignoring image observation for unknown area");
                }
            }
        }
    }

    if areas.len() != before {
        return Err(VisionError::AreaCountChanged {
            before,
            after: areas.len(),
        });
    }

    tracing::info!(enhanced, ignored, "Image observations merged");
    Ok(MergeOutcome {
        areas,
        enhanced,
        ignored,
    })
}

/// Thermal readings are not areas, so image readings are simply added.
/// Duplicates are resolved later by the validator.
pub fn merge_thermal_observations(
    text: Vec<ThermalRecord>,
    image: Vec<ThermalRecord>,
) -> Vec<ThermalRecord> {
    tracing::info!(text = text.len(), image = image.len(), "Merging thermal readings");
    let mut merged = text;
    merged.extend(image);
    merged
}
