pub mod types;
pub mod pdfium;
pub mod batching;

pub use types::*;
pub use pdfium::*;
pub use batching::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDFium library unavailable: {0}")]
    PdfiumUnavailable(String),

    #[error("PDF is password-protected or encrypted")]
    PdfEncrypted,

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Text extraction failed on page {page}: {reason}")]
    PdfText { page: usize, reason: String },

    #[error("Rendering failed on page {page}: {reason}")]
    PdfRendering { page: usize, reason: String },

    #[error("Image processing error: {0}")]
    ImageProcessing(String),
}
