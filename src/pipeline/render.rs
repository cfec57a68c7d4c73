//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and is not safe to call from async contexts. [`rasterize_pdf`] moves
//! the work onto tokio's blocking pool.
//!
//! ## Why cap pixels as well as DPI?
//!
//! Page sizes vary wildly: an A0 poster at 200 DPI is a ~6,600 × 9,300 px
//! bitmap. `max_rendered_pixels` caps the longest edge regardless of physical
//! size, keeping memory bounded.

use crate::config::ConversionConfig;
use crate::error::OcrError;
use crate::output::DocumentMetadata;
use crate::pipeline::PageImage;
use crate::request::InputKind;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Turns a PDF on disk into one bitmap per page.
///
/// Implementations are blocking and must return pages ordered by
/// `page_index`, starting at 1, without gaps.
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<PageImage>, OcrError>;
}

/// The default rasteriser, backed by pdfium.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    pub dpi: u32,
    pub max_rendered_pixels: u32,
    pub password: Option<String>,
}

impl PdfiumRasterizer {
    pub fn from_config(config: &ConversionConfig) -> Self {
        Self {
            dpi: config.dpi,
            max_rendered_pixels: config.max_rendered_pixels,
            password: config.password.clone(),
        }
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<PageImage>, OcrError> {
        let pdfium = bind_pdfium()?;
        let password = self.password.as_deref();
        let document = open_document(&pdfium, pdf_path, password)?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded: {} pages", total_pages);

        if total_pages == 0 {
            return Err(OcrError::EmptyPdf {
                path: pdf_path.to_path_buf(),
            });
        }

        let max_pixels = self.max_rendered_pixels as i32;
        let mut results = Vec::with_capacity(total_pages);

        for idx in 0..total_pages {
            let page = pages
                .get(idx as u16)
                .map_err(|e| OcrError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

            let target_width = points_to_pixels(page.width().value, self.dpi).min(max_pixels);
            let render_config = PdfRenderConfig::new()
                .set_target_width(target_width)
                .set_maximum_height(max_pixels);

            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                OcrError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );

            results.push(PageImage::new(idx + 1, image));
        }

        Ok(results)
    }
}

/// Run `rasterizer` on the blocking pool.
pub async fn rasterize_pdf(
    rasterizer: Arc<dyn PageRasterizer>,
    pdf_path: &Path,
) -> Result<Vec<PageImage>, OcrError> {
    let path = pdf_path.to_path_buf();
    tokio::task::spawn_blocking(move || rasterizer.rasterize(&path))
        .await
        .map_err(|e| OcrError::Internal(format!("Render task panicked: {}", e)))?
}

/// Convert a length in PDF points (1/72 inch) to pixels at `dpi`.
fn points_to_pixels(points: f32, dpi: u32) -> i32 {
    ((points / 72.0) * dpi as f32).round().max(1.0) as i32
}

/// Bind to a pdfium shared library.
///
/// Resolution order: `PDFIUM_LIB_PATH`, the current directory, then the
/// system loader path.
fn bind_pdfium() -> Result<Pdfium, OcrError> {
    if let Ok(explicit) = std::env::var("PDFIUM_LIB_PATH") {
        if !explicit.is_empty() {
            let path = PathBuf::from(&explicit);
            let lib = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path
            };
            let bindings = Pdfium::bind_to_library(&lib)
                .map_err(|e| OcrError::PdfiumBindingFailed(format!("{}: {:?}", lib.display(), e)))?;
            return Ok(Pdfium::new(bindings));
        }
    }

    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| OcrError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

/// Open a document, translating pdfium's load errors.
fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, OcrError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                OcrError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                OcrError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            OcrError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Extract document metadata from a PDF without rendering pages.
pub async fn extract_metadata(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, OcrError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || extract_metadata_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| OcrError::Internal(format!("Metadata task panicked: {}", e)))?
}

fn extract_metadata_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, OcrError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, pdf_path, password)?;

    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentMetadata {
        kind: Some(InputKind::Pdf),
        page_count: document.pages().len() as usize,
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        pdf_version: format!("{:?}", document.version()),
        dimensions: None,
    })
}
