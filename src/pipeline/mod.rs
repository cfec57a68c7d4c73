//! Pipeline stages for image/PDF-to-text conversion.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ recognize ──▶ postprocess ──▶ assemble ──▶ layout/write
//! (check)  (pdfium)   (PNG)      (tesseract)   (cleanup)       (join)       (txt | pdf)
//! ```
//!
//! 1. [`input`]: validate the path, detect [`crate::InputKind`], load images
//! 2. [`render`]: rasterise PDF pages; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`encode`]: PNG-encode a page for the OCR engine
//! 4. [`recognize`]: run the OCR engine on one page
//! 5. [`postprocess`]: deterministic clean-up of engine output
//! 6. [`assemble`]: order-preserving concatenation of page texts
//! 7. [`layout`] / [`write`]: render a PDF or plain text and persist it atomically

use image::DynamicImage;

pub mod assemble;
pub mod encode;
pub mod input;
pub mod layout;
pub mod postprocess;
pub mod recognize;
pub mod render;
pub mod write;

/// One bitmap to recognise, tagged with its 1-indexed page number.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub page_index: usize,
    pub image: DynamicImage,
}

impl PageImage {
    pub fn new(page_index: usize, image: DynamicImage) -> Self {
        Self { page_index, image }
    }
}
