//! Configuration types for image/PDF-to-text conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. What to convert lives in
//! [`crate::request::ConversionRequest`]; how to convert it lives here.
//!
//! The OCR engine and the PDF rasteriser are injectable: leave them `None` to
//! use tesseract and pdfium, or supply your own implementation of
//! [`TextRecognizer`] / [`PageRasterizer`] (tests do exactly that).

use crate::error::OcrError;
use crate::pipeline::layout::PdfLayout;
use crate::pipeline::recognize::TextRecognizer;
use crate::pipeline::render::PageRasterizer;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a conversion.
///
/// # Example
/// ```rust
/// use edgequake_ocr::{ConversionConfig, PageSeparator};
///
/// let config = ConversionConfig::builder()
///     .dpi(300)
///     .page_separator(PageSeparator::Banner)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–400. Default: 200.
    ///
    /// Tesseract is tuned for roughly 300 DPI scans; below ~150 small print
    /// starts to break up. 200 keeps memory modest for typical Letter/A4 pages.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 4000.
    ///
    /// Caps poster-sized pages independently of DPI.
    pub max_rendered_pixels: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Tesseract executable name or path. Default: `tesseract` (looked up on PATH).
    pub tesseract_program: PathBuf,

    /// Separator inserted between pages in the aggregated text. Default: blank line.
    pub page_separator: PageSeparator,

    /// Page geometry and font used when writing PDF output.
    pub pdf_layout: PdfLayout,

    /// Pre-constructed recogniser. Takes precedence over `tesseract_program`.
    pub recognizer: Option<Arc<dyn TextRecognizer>>,

    /// Pre-constructed rasteriser. Takes precedence over the pdfium default.
    pub rasterizer: Option<Arc<dyn PageRasterizer>>,

    /// Per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 4000,
            password: None,
            tesseract_program: PathBuf::from("tesseract"),
            page_separator: PageSeparator::default(),
            pdf_layout: PdfLayout::default(),
            recognizer: None,
            rasterizer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("tesseract_program", &self.tesseract_program)
            .field("page_separator", &self.page_separator)
            .field("pdf_layout", &self.pdf_layout)
            .field("recognizer", &self.recognizer.as_ref().map(|_| "<dyn TextRecognizer>"))
            .field("rasterizer", &self.rasterizer.as_ref().map(|_| "<dyn PageRasterizer>"))
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn tesseract_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.tesseract_program = program.into();
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn pdf_layout(mut self, layout: PdfLayout) -> Self {
        self.config.pdf_layout = layout;
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.config.recognizer = Some(recognizer);
        self
    }

    pub fn rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.config.rasterizer = Some(rasterizer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, OcrError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(OcrError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.tesseract_program.as_os_str().is_empty() {
            return Err(OcrError::InvalidConfig(
                "Tesseract program must not be empty".into(),
            ));
        }
        c.pdf_layout.validate()?;
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How to separate pages in the aggregated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSeparator {
    /// A blank line: pages joined with "\n\n". (default)
    #[default]
    BlankLine,
    /// A ruled banner naming each page, the first page included.
    Banner,
    /// Custom string inserted between pages, surrounded by blank lines.
    Custom(String),
}

impl PageSeparator {
    /// Render the separator placed before page `page_num` (1-indexed, ≥ 2).
    pub fn render(&self, page_num: usize) -> String {
        match self {
            PageSeparator::BlankLine => "\n\n".to_string(),
            PageSeparator::Banner => {
                let rule = "=".repeat(50);
                format!("\n\n{rule}\nPage {page_num}\n{rule}\n\n")
            }
            PageSeparator::Custom(s) => format!("\n\n{}\n\n", s),
        }
    }

    /// Text placed before the first page, `page_num` being its index.
    /// Only [`PageSeparator::Banner`] labels the first page.
    pub fn leading(&self, page_num: usize) -> String {
        match self {
            PageSeparator::Banner => {
                let rule = "=".repeat(50);
                format!("{rule}\nPage {page_num}\n{rule}\n\n")
            }
            PageSeparator::BlankLine | PageSeparator::Custom(_) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.dpi, 200);
        assert_eq!(c.tesseract_program, PathBuf::from("tesseract"));
        assert_eq!(c.page_separator, PageSeparator::BlankLine);
        assert!(c.recognizer.is_none());
    }

    #[test]
    fn builder_clamps_dpi() {
        let c = ConversionConfig::builder().dpi(10_000).build().unwrap();
        assert_eq!(c.dpi, 400);
        let c = ConversionConfig::builder().dpi(1).build().unwrap();
        assert_eq!(c.dpi, 72);
    }

    #[test]
    fn builder_rejects_empty_program() {
        let err = ConversionConfig::builder()
            .tesseract_program("")
            .build()
            .unwrap_err();
        assert!(matches!(err, OcrError::InvalidConfig(_)));
    }

    #[test]
    fn debug_redacts_password() {
        let c = ConversionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn separator_render() {
        assert_eq!(PageSeparator::BlankLine.render(2), "\n\n");
        let banner = PageSeparator::Banner.render(7);
        assert!(banner.contains("\nPage 7\n"));
        assert!(banner.starts_with("\n\n====="));
        assert_eq!(PageSeparator::Custom("***".into()).render(3), "\n\n***\n\n");
    }

    #[test]
    fn only_banner_labels_the_first_page() {
        let rule = "=".repeat(50);
        assert_eq!(
            PageSeparator::Banner.leading(1),
            format!("{rule}\nPage 1\n{rule}\n\n")
        );
        assert_eq!(PageSeparator::BlankLine.leading(1), "");
        assert_eq!(PageSeparator::Custom("--".into()).leading(1), "");
    }
}
