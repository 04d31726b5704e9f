use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::{is_missing, REQUIRES_INVESTIGATION};

/// Causal connectives, tried in order. Matching is plain substring, so the
/// bare "from" is found before "resulting from" gets a chance. The phrase
/// runs to the next period or comma, or to the end of the text.
static CAUSE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        "due to",
        "caused by",
        "because of",
        "from",
        "resulting from",
        "attributed to",
    ]
    .iter()
    .map(|connective| {
        let connective = regex::escape(connective);
        Regex::new(&format!(r"(?i){connective} ([^.,\n]+)(?:[.,]|\n?\z)")).expect("valid regex")
    })
    .collect()
});

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Root cause for an observation: the provided cause when present, else a
/// causal phrase found in the text, else "Requires further investigation".
pub fn extract_root_cause(observation: &str, provided: Option<&str>) -> String {
    if let Some(cause) = provided.filter(|c| !is_missing(c)) {
        return cause.trim().to_string();
    }

    CAUSE_PATTERNS
        .iter()
        .find_map(|re| re.captures(observation))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().trim_end_matches(['.', ',', ';']))
        .filter(|cause| !cause.is_empty())
        .map(capitalize)
        .unwrap_or_else(|| REQUIRES_INVESTIGATION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_causal_phrases() {
        assert_eq!(
            extract_root_cause("Dampness observed on wall due to water seepage.", None),
            "Water seepage"
        );
        assert_eq!(
            extract_root_cause("Crack in ceiling caused by structural settlement, north side", None),
            "Structural settlement"
        );
        assert_eq!(extract_root_cause("Staining from roof leakage.", None), "Roof leakage");
    }

    #[test]
    fn connectives_tried_in_table_order() {
        // The bare "from" comes before "resulting from" in the table.
        assert_eq!(
            extract_root_cause("Leak from pipe, resulting from corrosion", None),
            "Pipe"
        );
        assert_eq!(
            extract_root_cause("Stains resulting from pipe burst", None),
            "Pipe burst"
        );
        assert_eq!(
            extract_root_cause("Seepage from terrace due to failed membrane", None),
            "Failed membrane"
        );
    }

    #[test]
    fn cause_is_capitalized() {
        assert_eq!(extract_root_cause("Cracks due to RCC corrosion", None), "Rcc corrosion");
        assert_eq!(extract_root_cause("Leak caused by pipe joint;", None), "Pipe joint");
    }

    #[test]
    fn default_when_no_cause() {
        assert_eq!(extract_root_cause("Paint peeling.", None), REQUIRES_INVESTIGATION);
        assert_eq!(extract_root_cause("Minor crack.", None), REQUIRES_INVESTIGATION);
    }

    #[test]
    fn connectives_match_inside_words() {
        assert_eq!(extract_root_cause("Water therefrom the tank", None), "The tank");
    }

    #[test]
    fn provided_cause_wins_unless_missing() {
        assert_eq!(
            extract_root_cause("Dampness due to seepage", Some("Plumbing leak")),
            "Plumbing leak"
        );
        assert_eq!(
            extract_root_cause("Dampness due to seepage", Some("Not Available")),
            "Seepage"
        );
    }
}
