use std::sync::LazyLock;

use regex::Regex;

use super::types::AreaDescription;

/// Observation text shorter than this (after cleanup) is treated as noise.
const MIN_OBSERVATION_CHARS: usize = 4;

static NEGATIVE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Negative side Description\s*").expect("valid regex"));

static NEGATIVE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Negative side photographs|Positive side|Impacted Area").expect("valid regex")
});

static POSITIVE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Positive side Description\s*").expect("valid regex"));

static POSITIVE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Positive side photographs|Impacted Area").expect("valid regex"));

static PHOTO_REF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Photo\s+\d+").expect("valid regex"));

/// How a room rule turns its match into a label.
#[derive(Debug, Clone, Copy)]
pub enum RoomLabel {
    /// Canonical spelling, whatever the source casing.
    Fixed(&'static str),
    /// The matched text itself (e.g. "Flat No. 103").
    Captured,
}

pub struct RoomRule {
    regex: Regex,
    label: RoomLabel,
}

impl RoomRule {
    pub fn apply(&self, text: &str) -> Option<String> {
        let found = self.regex.find(text)?;
        Some(match self.label {
            RoomLabel::Fixed(name) => name.to_string(),
            RoomLabel::Captured => found.as_str().to_string(),
        })
    }
}

fn anchored(name: &'static str) -> RoomRule {
    let words = name
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    RoomRule {
        regex: Regex::new(&format!(r"(?i)^{words}\b")).expect("valid regex"),
        label: RoomLabel::Fixed(name),
    }
}

/// Room-name rules in priority order; the first match wins.
pub static ROOM_RULES: LazyLock<Vec<RoomRule>> = LazyLock::new(|| {
    vec![
        anchored("Hall"),
        anchored("Bedroom"),
        anchored("Master Bedroom"),
        anchored("Common Bedroom"),
        anchored("Kitchen"),
        anchored("Bathroom"),
        anchored("Common Bathroom"),
        anchored("MB Bathroom"),
        anchored("Living Room"),
        anchored("Dining Room"),
        anchored("Balcony"),
        anchored("Parking"),
        anchored("Entrance"),
        RoomRule {
            regex: Regex::new(r"(?i)Flat No\.\s*\d+").expect("valid regex"),
            label: RoomLabel::Captured,
        },
    ]
});

/// Infer a room label from observation text.
pub fn infer_room_label(text: &str) -> Option<String> {
    ROOM_RULES.iter().find_map(|rule| rule.apply(text))
}

/// Text after `start` up to the earliest `end` marker (or end of chunk),
/// with photo references removed. `None` when nothing meaningful remains.
fn section_text(chunk: &str, start: &Regex, end: &Regex) -> Option<String> {
    let content_start = start.find(chunk)?.end();
    let content = &chunk[content_start..];

    // At least one character of content before a terminator can match.
    let first_len = content.chars().next()?.len_utf8();
    let content_end = end
        .find_at(content, first_len)
        .map_or(content.len(), |m| m.start());

    let cleaned = PHOTO_REF.replace_all(&content[..content_end], "");
    let cleaned = cleaned.trim();
    if cleaned.chars().count() < MIN_OBSERVATION_CHARS {
        return None;
    }
    Some(cleaned.to_string())
}

/// Extract negative/positive observations and a room label from one section.
pub fn describe(chunk: &str) -> AreaDescription {
    let negative = section_text(chunk, &NEGATIVE_START, &NEGATIVE_END);
    let positive = section_text(chunk, &POSITIVE_START, &POSITIVE_END);

    let area_name = negative
        .as_deref()
        .and_then(infer_room_label)
        .or_else(|| positive.as_deref().and_then(infer_room_label));

    AreaDescription {
        area_name,
        negative_observations: negative.into_iter().collect(),
        positive_observations: positive.into_iter().collect(),
    }
}
