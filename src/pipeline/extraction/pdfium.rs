//! Page text and page images from Google PDFium.
//!
//! The upstream `Pdfium` handle is `!Send`, so `PdfiumBackend` holds no
//! handle and binds the library per call. Repeat binds hit the loader cache.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::types::{EncodedImage, PageText, PdfPageRenderer, PdfTextExtractor};
use super::ExtractionError;

/// Longest rendered edge, in pixels.
const MAX_EDGE_PX: u32 = 4096;

const PDF_POINTS_PER_INCH: f32 = 72.0;

/// Environment variable naming an explicit PDFium library file.
pub const ENV_PDFIUM_LIB: &str = "PDFIUM_DYNAMIC_LIB_PATH";

pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Extracts page text and renders pages to JPEG using Google PDFium.
pub struct PdfiumBackend {
    jpeg_quality: u8,
}

impl PdfiumBackend {
    /// Fails early when no PDFium library can be bound. Looked up from
    /// `PDFIUM_DYNAMIC_LIB_PATH`, then next to the executable, then on the
    /// system library path.
    pub fn new(jpeg_quality: u8) -> Result<Self, ExtractionError> {
        bind_pdfium()?;
        Ok(Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        })
    }
}

fn bind_pdfium() -> Result<Pdfium, ExtractionError> {
    if let Ok(path) = std::env::var(ENV_PDFIUM_LIB) {
        let bindings = Pdfium::bind_to_library(&path).map_err(|e| {
            ExtractionError::PdfiumUnavailable(format!("Failed to load PDFium from {path}: {e}"))
        })?;
        debug!(path = %path, "PDFium bound from {ENV_PDFIUM_LIB}");
        return Ok(Pdfium::new(bindings));
    }

    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.to_string_lossy().into_owned()))
        .map(|dir| Pdfium::pdfium_platform_library_name_at_path(&dir));
    if let Some(bindings) = beside_exe.and_then(|lib| Pdfium::bind_to_library(&lib).ok()) {
        debug!("PDFium bound from executable directory");
        return Ok(Pdfium::new(bindings));
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| {
            ExtractionError::PdfiumUnavailable(format!(
                "No PDFium library found (set {ENV_PDFIUM_LIB} or install PDFium): {e}"
            ))
        })
}

fn open_document<'p>(pdfium: &'p Pdfium, pdf_bytes: &'p [u8]) -> Result<PdfDocument<'p>, ExtractionError> {
    pdfium.load_pdf_from_byte_slice(pdf_bytes, None).map_err(|e| {
        let msg = e.to_string();
        let lower = msg.to_lowercase();
        if lower.contains("password") || lower.contains("encrypt") {
            ExtractionError::PdfEncrypted
        } else {
            ExtractionError::PdfParsing(format!("Failed to load PDF: {msg}"))
        }
    })
}

/// Pixel size of a rendered page, longest edge capped at `MAX_EDGE_PX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RenderSize {
    width: u32,
    height: u32,
    capped: bool,
}

impl RenderSize {
    fn for_page(width_pts: f32, height_pts: f32, dpi: u32) -> Self {
        let scale = dpi as f32 / PDF_POINTS_PER_INCH;
        let w = (width_pts * scale).max(1.0);
        let h = (height_pts * scale).max(1.0);
        let longest = w.max(h);

        if longest <= MAX_EDGE_PX as f32 {
            return Self {
                width: w as u32,
                height: h as u32,
                capped: false,
            };
        }

        let shrink = MAX_EDGE_PX as f32 / longest;
        Self {
            width: ((w * shrink) as u32).clamp(1, MAX_EDGE_PX),
            height: ((h * shrink) as u32).clamp(1, MAX_EDGE_PX),
            capped: true,
        }
    }
}

/// Flatten onto a white background and encode as JPEG.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ExtractionError> {
    let rgba = image.to_rgba8();
    let flattened = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let px = rgba.get_pixel(x, y);
        let alpha = u16::from(px[3]);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(px[0]), blend(px[1]), blend(px[2])])
    });

    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(flattened)
        .write_to(&mut cursor, ImageOutputFormat::Jpeg(quality))
        .map_err(|e| ExtractionError::ImageProcessing(format!("JPEG encoding failed: {e}")))?;
    Ok(cursor.into_inner())
}

impl PdfTextExtractor for PdfiumBackend {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError> {
        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, pdf_bytes)?;

        let pages = document
            .pages()
            .iter()
            .enumerate()
            .map(|(index, page)| {
                let text = page.text().map_err(|e| ExtractionError::PdfText {
                    page: index + 1,
                    reason: e.to_string(),
                })?;
                Ok(PageText {
                    page_number: index + 1,
                    text: text.all(),
                })
            })
            .collect::<Result<Vec<_>, ExtractionError>>()?;

        debug!(page_count = pages.len(), "Extracted PDF text");
        Ok(pages)
    }
}

impl PdfPageRenderer for PdfiumBackend {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, ExtractionError> {
        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, pdf_bytes)?;
        Ok(usize::from(document.pages().len()))
    }

    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_index: usize,
        dpi: u32,
    ) -> Result<EncodedImage, ExtractionError> {
        let render_error = |reason: String| ExtractionError::PdfRendering {
            page: page_index,
            reason,
        };

        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, pdf_bytes)?;
        let pages = document.pages();
        let page = u16::try_from(page_index)
            .ok()
            .and_then(|index| pages.get(index).ok())
            .ok_or_else(|| {
                render_error(format!(
                    "Page {page_index} out of range (document has {} pages)",
                    pages.len()
                ))
            })?;

        let size = RenderSize::for_page(page.width().value, page.height().value, dpi);
        if size.capped {
            warn!(page = page_index, dpi, width = size.width, height = size.height, "Page render size capped");
        }

        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(size.width as i32)
                    .set_maximum_height(size.height as i32),
            )
            .map_err(|e| render_error(e.to_string()))?;
        let bytes = encode_jpeg(&bitmap.as_image(), self.jpeg_quality)?;

        debug!(
            page = page_index,
            width = size.width,
            height = size.height,
            jpeg_size = bytes.len(),
            "Rendered PDF page to JPEG"
        );

        Ok(EncodedImage {
            page_number: page_index + 1,
            mime_type: "image/jpeg",
            bytes,
        })
    }
}

// ── Mock for testing ──────────────────────────────────────

/// In-memory PDF backend: fixed page texts, and a tiny JPEG per page.
///
/// Lets processor and vision tests run without the PDFium binary.
pub struct MockPdfBackend {
    pages: Vec<String>,
}

impl MockPdfBackend {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// A single-page document holding `text`.
    pub fn single_page(text: &str) -> Self {
        Self::new(vec![text.to_string()])
    }
}

impl PdfTextExtractor for MockPdfBackend {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError> {
        if pdf_bytes.is_empty() {
            return Err(ExtractionError::PdfParsing("Empty document".into()));
        }
        Ok(self
            .pages
            .iter()
            .enumerate()
            .map(|(i, text)| PageText {
                page_number: i + 1,
                text: text.clone(),
            })
            .collect())
    }
}

impl PdfPageRenderer for MockPdfBackend {
    fn page_count(&self, _pdf_bytes: &[u8]) -> Result<usize, ExtractionError> {
        Ok(self.pages.len())
    }

    fn render_page(
        &self,
        _pdf_bytes: &[u8],
        page_index: usize,
        _dpi: u32,
    ) -> Result<EncodedImage, ExtractionError> {
        if page_index >= self.pages.len() {
            return Err(ExtractionError::PdfRendering {
                page: page_index,
                reason: format!(
                    "Page {page_index} out of range (mock has {} pages)",
                    self.pages.len()
                ),
            });
        }
        let white = DynamicImage::new_rgb8(1, 1);
        Ok(EncodedImage {
            page_number: page_index + 1,
            mime_type: "image/jpeg",
            bytes: encode_jpeg(&white, DEFAULT_JPEG_QUALITY)?,
        })
    }
}
