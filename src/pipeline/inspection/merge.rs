use std::collections::HashMap;

use super::describe::describe;
use super::segment::segment;
use super::types::{AreaDescription, AreaSection, InspectionArea, InspectionParse};
use super::SegmentationError;

/// Identity key for an area name: trimmed, lowercased, inner whitespace collapsed.
pub fn normalize_area_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Fold described sections into areas keyed by normalized name.
///
/// The first section with a given key creates the area (and fixes its
/// display name); later ones append their observations in encounter order.
pub fn fold_sections(described: Vec<(AreaSection, AreaDescription)>) -> Vec<InspectionArea> {
    let mut areas: Vec<InspectionArea> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (section, description) in described {
        let name = description.area_name.unwrap_or(section.label);
        let key = normalize_area_name(&name);

        match index.get(&key) {
            Some(&i) => {
                tracing::info!(area = %name, ordinal = section.ordinal, "Merging repeated area");
                let existing = &mut areas[i];
                existing
                    .negative_observations
                    .extend(description.negative_observations);
                existing
                    .positive_observations
                    .extend(description.positive_observations);
            }
            None => {
                index.insert(key, areas.len());
                areas.push(InspectionArea {
                    area_name: name,
                    negative_observations: description.negative_observations,
                    positive_observations: description.positive_observations,
                });
            }
        }
    }

    areas
}

/// Deterministic inspection parse: segment, describe, fold.
pub fn parse_inspection(text: &str, max_areas: usize) -> Result<InspectionParse, SegmentationError> {
    let sections = segment(text, max_areas)?;
    let section_count = sections.len();

    let described: Vec<(AreaSection, AreaDescription)> = sections
        .into_iter()
        .map(|section| {
            let description = describe(&section.text_span);
            (section, description)
        })
        .collect();

    let unnamed_sections = described
        .iter()
        .filter(|(section, description)| {
            let unnamed = description.area_name.is_none();
            if unnamed {
                tracing::warn!(
                    section = %section.label,
                    "No room name found, using section label"
                );
            }
            unnamed
        })
        .count();

    let areas = fold_sections(described);

    tracing::info!(
        sections = section_count,
        areas = areas.len(),
        unnamed = unnamed_sections,
        "Inspection text parsed"
    );

    Ok(InspectionParse {
        areas,
        section_count,
        unnamed_sections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area_block(n: u32, negative: &str, positive: &str) -> String {
        format!(
            "Impacted Area {n}\n\
             Negative side Description\n{negative}\n\
             Negative side photographs\nPhoto {n}\n\
             Positive side Description\n{positive}\n\
             Positive side photographs\n"
        )
    }

    #[test]
    fn normalization_collapses_case_and_whitespace() {
        assert_eq!(normalize_area_name("  Master   Bedroom "), "master bedroom");
        assert_eq!(normalize_area_name("HALL"), normalize_area_name("hall"));
        assert_eq!(normalize_area_name(""), "");
    }

    #[test]
    fn fold_merges_same_normalized_name_in_order() {
        let section = |n| AreaSection::new(n, "");
        let desc = |name: &str, neg: &str, pos: &str| AreaDescription {
            area_name: Some(name.to_string()),
            negative_observations: vec![neg.to_string()],
            positive_observations: vec![pos.to_string()],
        };
        let areas = fold_sections(vec![
            (section(1), desc("Hall", "n1", "p1")),
            (section(2), desc("Kitchen", "n2", "p2")),
            (section(3), desc(" hall ", "n3", "p3")),
        ]);
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].area_name, "Hall");
        assert_eq!(areas[0].negative_observations, vec!["n1", "n3"]);
        assert_eq!(areas[0].positive_observations, vec!["p1", "p3"]);
        assert_eq!(areas[1].area_name, "Kitchen");
    }

    #[test]
    fn unnamed_sections_use_label_and_stay_distinct() {
        let areas = fold_sections(vec![
            (AreaSection::new(1, ""), AreaDescription::default()),
            (AreaSection::new(2, ""), AreaDescription::default()),
        ]);
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].area_name, "Impacted Area 1");
        assert_eq!(areas[1].area_name, "Impacted Area 2");
    }

    #[test]
    fn duplicate_room_merges_end_to_end() {
        let text = format!(
            "Impacted Areas/Rooms\nHall, Kitchen\n\n{}{}{}",
            area_block(1, "Hall Skirting level Dampness", "Common Bathroom tile hollowness"),
            area_block(2, "Kitchen wall dampness near sink", "Bathroom tile joints open"),
            area_block(3, "Hall ceiling seepage patches", "Terrace membrane cracked"),
        );
        let parsed = parse_inspection(&text, 20).unwrap();

        assert_eq!(parsed.section_count, 3);
        assert_eq!(parsed.unnamed_sections, 0);
        assert_eq!(parsed.areas.len(), 2);

        let hall = &parsed.areas[0];
        assert_eq!(hall.area_name, "Hall");
        assert_eq!(
            hall.negative_observations,
            vec!["Hall Skirting level Dampness", "Hall ceiling seepage patches"]
        );
        assert_eq!(
            hall.positive_observations,
            vec!["Common Bathroom tile hollowness", "Terrace membrane cracked"]
        );
        assert_eq!(parsed.areas[1].area_name, "Kitchen");
    }

    #[test]
    fn overflow_surfaces_from_parse() {
        let text: String = (1..=25)
            .map(|n| area_block(n, "Hall dampness", "Bathroom tiles"))
            .collect();
        let err = parse_inspection(&text, 20).unwrap_err();
        assert!(matches!(err, SegmentationError::TooManyAreas { count: 25, max: 20, .. }));
    }

    #[test]
    fn sections_fewer_areas_than_markers() {
        // Sections do not imply areas: five Hall sections are one area.
        let text: String = (1..=5)
            .map(|n| area_block(n, &format!("Hall patch {n}"), "Bathroom ok"))
            .collect();
        let parsed = parse_inspection(&text, 20).unwrap();
        assert_eq!(parsed.section_count, 5);
        assert_eq!(parsed.areas.len(), 1);
        assert_eq!(parsed.areas[0].negative_observations.len(), 5);
    }

    #[test]
    fn empty_text_parses_to_nothing() {
        let parsed = parse_inspection("", 20).unwrap();
        assert!(parsed.areas.is_empty());
        assert_eq!(parsed.section_count, 0);
    }
}
