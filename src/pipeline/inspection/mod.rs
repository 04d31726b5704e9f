pub mod types;
pub mod segment;
pub mod describe;
pub mod merge;

pub use types::*;
pub use segment::*;
pub use describe::*;
pub use merge::*;

use thiserror::Error;

/// Maximum number of ordinals listed in an overflow message.
pub const OVERFLOW_PREVIEW_LIMIT: usize = 30;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentationError {
    #[error(
        "Found {count} distinct area markers, exceeding maximum {max}. \
         The document either repeats content (OCR artifacts) or genuinely has too many areas. \
         Area numbers found: {}. Review the document structure before proceeding.",
        format_preview(.preview, .count)
    )]
    TooManyAreas {
        count: usize,
        max: usize,
        preview: Vec<u32>,
    },
}

fn format_preview(preview: &[u32], count: &usize) -> String {
    let mut list = preview
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    if *count > preview.len() {
        list.push_str(&format!("... (total: {count})"));
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_message_lists_preview() {
        let err = SegmentationError::TooManyAreas {
            count: 3,
            max: 2,
            preview: vec![1, 2, 3],
        };
        let msg = err.to_string();
        assert!(msg.contains("Found 3 distinct area markers, exceeding maximum 2"));
        assert!(msg.contains("Area numbers found: 1, 2, 3."));
        assert!(!msg.contains("total"));
    }

    #[test]
    fn overflow_message_marks_truncation() {
        let err = SegmentationError::TooManyAreas {
            count: 45,
            max: 20,
            preview: (1..=30).collect(),
        };
        let msg = err.to_string();
        assert!(msg.contains("29, 30... (total: 45)"));
    }
}
