//! Result types produced by a conversion run.

use crate::error::PageError;
use crate::request::{InputKind, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of recognising one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed page number.
    pub page_index: usize,
    /// Cleaned recognised text. Empty when `ok` is false.
    pub text: String,
    /// Whether recognition succeeded.
    pub ok: bool,
    /// Why recognition failed, when it did.
    pub error: Option<PageError>,
    /// Wall-clock time spent in the recogniser.
    pub duration_ms: u64,
}

impl PageResult {
    pub fn success(page_index: usize, text: String, duration_ms: u64) -> Self {
        Self {
            page_index,
            text,
            ok: true,
            error: None,
            duration_ms,
        }
    }

    /// A failed page keeps its slot with an empty placeholder text.
    pub fn failure(page_index: usize, error: PageError, duration_ms: u64) -> Self {
        Self {
            page_index,
            text: String::new(),
            ok: false,
            error: Some(error),
            duration_ms,
        }
    }
}

/// Everything recognised from one input, before any output writer runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedDocument {
    pub kind: InputKind,
    /// One entry per page, sorted by `page_index`.
    pub pages: Vec<PageResult>,
    /// Page texts joined by the configured separator.
    pub text: String,
}

impl RecognizedDocument {
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn failed_pages(&self) -> usize {
        self.pages.iter().filter(|p| !p.ok).count()
    }

    pub fn processed_pages(&self) -> usize {
        self.total_pages() - self.failed_pages()
    }
}

/// Summary handed back to the caller once the output file is in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub output_path: PathBuf,
    pub output_format: OutputFormat,
    pub total_pages: usize,
    pub pages_processed: usize,
    pub pages_failed: usize,
    pub duration_ms: u64,
}

/// Document information reported by [`crate::convert::inspect`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub kind: Option<InputKind>,
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub producer: Option<String>,
    /// PDF version string, empty for images.
    pub pdf_version: String,
    /// Pixel dimensions, images only.
    pub dimensions: Option<(u32, u32)>,
}
