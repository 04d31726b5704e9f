//! Groups rendered pages into fixed-size batches, one model call per batch.

use super::types::EncodedImage;

#[derive(Debug, Clone)]
pub struct ImageBatch {
    pub images: Vec<EncodedImage>,
    /// 1-based, inclusive.
    pub start_page: usize,
    /// 1-based, inclusive.
    pub end_page: usize,
}

impl ImageBatch {
    pub fn page_range(&self) -> String {
        format!("{}-{}", self.start_page, self.end_page)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Split `images` into consecutive batches of at most `per_batch` images.
/// A `per_batch` of zero is treated as one.
pub fn create_image_batches(images: Vec<EncodedImage>, per_batch: usize) -> Vec<ImageBatch> {
    let per_batch = per_batch.max(1);
    let mut batches = Vec::new();
    let mut iter = images.into_iter().peekable();
    let mut offset = 0;

    while iter.peek().is_some() {
        let chunk: Vec<EncodedImage> = iter.by_ref().take(per_batch).collect();
        let start_page = offset + 1;
        offset += chunk.len();
        batches.push(ImageBatch {
            images: chunk,
            start_page,
            end_page: offset,
        });
    }

    batches
}

/// Number of model calls needed to cover `total_pages`.
pub fn estimate_batch_count(total_pages: usize, per_batch: usize) -> usize {
    total_pages.div_ceil(per_batch.max(1))
}
