use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use super::types::AreaSection;
use super::{SegmentationError, OVERFLOW_PREVIEW_LIMIT};

/// "Impacted Area <n>". The "Impacted Areas/Rooms" header does not match.
static AREA_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Impacted Area\s+(\d+)").expect("valid regex"));

/// Split report text into numbered area sections.
///
/// The first occurrence of each ordinal wins; later repeats are dropped.
/// Sections come back in ascending numeric order, each spanning from its
/// marker to the start of the next section's marker. More distinct ordinals
/// than `max_areas` is an error, never a truncation. Ordinals too large to
/// hold still count toward that limit but never become sections.
pub fn segment(text: &str, max_areas: usize) -> Result<Vec<AreaSection>, SegmentationError> {
    let mut first_seen: BTreeMap<u32, usize> = BTreeMap::new();
    let mut oversized: BTreeSet<&str> = BTreeSet::new();

    for caps in AREA_MARKER.captures_iter(text) {
        let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let digits = digits.as_str().trim_start_matches('0');
        if digits.is_empty() {
            tracing::warn!(marker = whole.as_str(), "Skipping area marker numbered zero");
            continue;
        }
        match digits.parse::<u32>() {
            Ok(ordinal) => {
                first_seen.entry(ordinal).or_insert(whole.start());
            }
            Err(_) => {
                tracing::warn!(marker = whole.as_str(), "Area marker number out of range");
                oversized.insert(digits);
            }
        }
    }

    let count = first_seen.len() + oversized.len();
    if count > max_areas {
        let preview = first_seen
            .keys()
            .take(OVERFLOW_PREVIEW_LIMIT)
            .copied()
            .collect();
        tracing::warn!(count, max = max_areas, "Too many area markers");
        return Err(SegmentationError::TooManyAreas {
            count,
            max: max_areas,
            preview,
        });
    }

    if first_seen.is_empty() {
        tracing::debug!("No usable area markers found");
        return Ok(Vec::new());
    }

    let ordered: Vec<(u32, usize)> = first_seen.into_iter().collect();
    let sections = ordered
        .iter()
        .enumerate()
        .map(|(i, &(ordinal, start))| {
            let end = ordered.get(i + 1).map_or(text.len(), |&(_, next)| next);
            // Numeric order can disagree with text order; such a span is empty.
            let span = if end > start { &text[start..end] } else { "" };
            AreaSection::new(ordinal, span)
        })
        .collect::<Vec<_>>();

    tracing::info!(count = sections.len(), "Numbered area sections found");
    Ok(sections)
}
