use serde::{Deserialize, Serialize};

/// One numbered section of the inspection report, from its marker up to the
/// next marker (or end of text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaSection {
    pub ordinal: u32,
    pub label: String,
    pub text_span: String,
}

impl AreaSection {
    pub fn new(ordinal: u32, text_span: &str) -> Self {
        Self {
            ordinal,
            label: section_label(ordinal),
            text_span: text_span.to_string(),
        }
    }
}

/// Synthetic label used when no room name can be inferred.
pub fn section_label(ordinal: u32) -> String {
    format!("Impacted Area {ordinal}")
}

/// What the describer found in one section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaDescription {
    pub area_name: Option<String>,
    pub negative_observations: Vec<String>,
    pub positive_observations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionArea {
    pub area_name: String,
    #[serde(default)]
    pub negative_observations: Vec<String>,
    #[serde(default)]
    pub positive_observations: Vec<String>,
}

impl InspectionArea {
    pub fn new(area_name: &str) -> Self {
        Self {
            area_name: area_name.to_string(),
            negative_observations: Vec::new(),
            positive_observations: Vec::new(),
        }
    }
}

/// Result of the deterministic inspection parse.
#[derive(Debug, Clone, Serialize)]
pub struct InspectionParse {
    pub areas: Vec<InspectionArea>,
    /// Numbered sections found before merging.
    pub section_count: usize,
    /// Sections that fell back to their synthetic label.
    pub unnamed_sections: usize,
}
