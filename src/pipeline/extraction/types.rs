use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Text of a single PDF page (1-based page number).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageText {
    pub page_number: usize,
    pub text: String,
}

/// A rendered page, already encoded for transport to a vision model.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub page_number: usize,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Page-boundary marker placed at the top of each page's text.
pub fn page_marker(page_number: usize) -> String {
    format!("--- Page {page_number} ---")
}

/// Concatenate per-page text in page order, each page prefixed by its marker.
pub fn join_pages(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(|p| format!("{}\n{}", page_marker(p.page_number), p.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// PDF text extraction abstraction
pub trait PdfTextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError>;

    /// Whole-document text with page-boundary markers.
    fn extract_document_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        let pages = self.extract_pages(pdf_bytes)?;
        Ok(join_pages(&pages))
    }
}

/// PDF page rendering abstraction (allows mocking for tests)
pub trait PdfPageRenderer {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, ExtractionError>;

    /// Render one page (0-based index) at `dpi`.
    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_index: usize,
        dpi: u32,
    ) -> Result<EncodedImage, ExtractionError>;

    /// Render the first `max_pages` pages in order.
    fn render_pages(
        &self,
        pdf_bytes: &[u8],
        max_pages: usize,
        dpi: u32,
    ) -> Result<Vec<EncodedImage>, ExtractionError> {
        let count = self.page_count(pdf_bytes)?.min(max_pages);
        (0..count)
            .map(|index| self.render_page(pdf_bytes, index, dpi))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_pages_adds_markers_in_order() {
        let pages = vec![
            PageText { page_number: 1, text: "first".into() },
            PageText { page_number: 2, text: "second".into() },
        ];
        let text = join_pages(&pages);
        assert_eq!(text, "--- Page 1 ---\nfirst\n\n--- Page 2 ---\nsecond");
    }

    #[test]
    fn join_pages_empty_document() {
        assert_eq!(join_pages(&[]), "");
    }
}
