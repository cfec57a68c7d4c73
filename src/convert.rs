//! Conversion entry points: the pipeline orchestrator.
//!
//! [`convert`] runs one [`ConversionRequest`] end to end:
//!
//! 1. validate the input path and detect its [`InputKind`]
//! 2. turn it into page images (decode an image, or rasterise a PDF)
//! 3. recognise every page, one after another, in page order
//! 4. join page texts into the aggregated document
//! 5. refuse to write anything if every page failed
//! 6. render text or PDF and persist it atomically
//!
//! A page whose recognition fails is recorded and skipped; only input,
//! rasterisation, total-failure, and write errors abort the run.

use crate::config::ConversionConfig;
use crate::error::{OcrError, PageError};
use crate::output::{ConversionResult, DocumentMetadata, PageResult, RecognizedDocument};
use crate::pipeline::recognize::{self, TesseractRecognizer, TextRecognizer};
use crate::pipeline::render::{self, PageRasterizer, PdfiumRasterizer};
use crate::pipeline::{assemble, input, postprocess, write, PageImage};
use crate::request::{ConversionRequest, InputKind, OutputFormat};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert one input document and write the result to `request.output_path`.
///
/// # Returns
/// `Ok(ConversionResult)` on success, even if some pages failed
/// (check `pages_failed`).
///
/// # Errors
/// Returns `Err(OcrError)` only for fatal errors:
/// - input missing, unreadable, or of an unsupported kind
/// - the PDF cannot be opened or rendered
/// - every page failed recognition (nothing is written)
/// - the output cannot be written (nothing is left behind)
pub async fn convert(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<ConversionResult, OcrError> {
    let total_start = Instant::now();
    info!(
        "Starting conversion: {} → {} ({})",
        request.input_path.display(),
        request.output_path.display(),
        request.output_format
    );

    let document = recognize_document(&request.input_path, config).await?;

    // ── Render and persist ───────────────────────────────────────────────
    let format = request.output_format;
    let output_path = request.output_path.clone();
    let layout = config.pdf_layout.clone();
    let written = tokio::task::spawn_blocking(move || {
        match format {
            OutputFormat::Text => write::write_text(&document.text, &output_path)?,
            OutputFormat::Pdf => write::write_pdf(&document.pages, &output_path, &layout)?,
        }
        Ok::<_, OcrError>(document)
    })
    .await
    .map_err(|e| OcrError::Internal(format!("Write task panicked: {}", e)))?;
    let document = written?;

    let result = ConversionResult {
        output_path: request.output_path.clone(),
        output_format: request.output_format,
        total_pages: document.total_pages(),
        pages_processed: document.processed_pages(),
        pages_failed: document.failed_pages(),
        duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {}/{} pages, {}ms total",
        result.pages_processed, result.total_pages, result.duration_ms
    );

    Ok(result)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<ConversionResult, OcrError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| OcrError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(request, config))
}

/// Recognise every page of `input_path` without writing any output.
///
/// Fails with [`OcrError::NoTextRecognized`] when every page failed.
pub async fn recognize_document(
    input_path: &Path,
    config: &ConversionConfig,
) -> Result<RecognizedDocument, OcrError> {
    // ── Step 1: Validate input ───────────────────────────────────────────
    let kind = input::validate_input(input_path)?;

    // ── Step 2: Page images ──────────────────────────────────────────────
    let mut page_images = load_pages(input_path, kind, config).await?;
    page_images.sort_by_key(|p| p.page_index);
    check_page_sequence(&page_images)?;
    let total_pages = page_images.len();
    info!("{:?} input has {} page(s)", kind, total_pages);

    // ── Step 3: Recognise, in page order ─────────────────────────────────
    let recognizer = resolve_recognizer(config);
    let pages = recognize_pages(recognizer, page_images, config).await;

    // ── Step 4: Aggregate ────────────────────────────────────────────────
    let failed = pages.iter().filter(|p| !p.ok).count();

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total_pages, total_pages - failed);
    }

    // ── Step 5: Total failure writes nothing ─────────────────────────────
    if total_pages > 0 && failed == total_pages {
        let first_error = pages
            .iter()
            .find_map(|p| p.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(OcrError::NoTextRecognized {
            total: total_pages,
            first_error,
        });
    }

    let text = assemble::assemble_text(&pages, &config.page_separator);
    debug!("Aggregated text: {} bytes", text.len());

    Ok(RecognizedDocument { kind, pages, text })
}

/// Report page count and basic metadata without running OCR.
pub async fn inspect(
    input_path: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, OcrError> {
    let path = input_path.as_ref();
    match input::validate_input(path)? {
        InputKind::Pdf => render::extract_metadata(path, password).await,
        InputKind::Image => {
            let dims = image::image_dimensions(path).map_err(|e| OcrError::UndecodableImage {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
            Ok(DocumentMetadata {
                kind: Some(InputKind::Image),
                page_count: 1,
                dimensions: Some(dims),
                ..Default::default()
            })
        }
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Use the injected recogniser, else tesseract at the configured path.
fn resolve_recognizer(config: &ConversionConfig) -> Arc<dyn TextRecognizer> {
    match config.recognizer {
        Some(ref r) => Arc::clone(r),
        None => Arc::new(TesseractRecognizer::new(config.tesseract_program.clone())),
    }
}

/// Use the injected rasteriser, else pdfium.
fn resolve_rasterizer(config: &ConversionConfig) -> Arc<dyn PageRasterizer> {
    match config.rasterizer {
        Some(ref r) => Arc::clone(r),
        None => Arc::new(PdfiumRasterizer::from_config(config)),
    }
}

/// Produce the page images for `kind`. Images skip the rasteriser entirely.
async fn load_pages(
    input_path: &Path,
    kind: InputKind,
    config: &ConversionConfig,
) -> Result<Vec<PageImage>, OcrError> {
    match kind {
        InputKind::Image => {
            let path = input_path.to_path_buf();
            let page = tokio::task::spawn_blocking(move || input::load_image(&path))
                .await
                .map_err(|e| OcrError::Internal(format!("Image decode task panicked: {}", e)))??;
            Ok(vec![page])
        }
        InputKind::Pdf => {
            let render_start = Instant::now();
            let pages = render::rasterize_pdf(resolve_rasterizer(config), input_path).await?;
            if pages.is_empty() {
                return Err(OcrError::EmptyPdf {
                    path: input_path.to_path_buf(),
                });
            }
            info!(
                "Rendered {} pages in {}ms",
                pages.len(),
                render_start.elapsed().as_millis()
            );
            Ok(pages)
        }
    }
}

/// Page indices must run 1, 2, .., n with no gaps or repeats. `pages` is
/// already sorted.
fn check_page_sequence(pages: &[PageImage]) -> Result<(), OcrError> {
    for (i, page) in pages.iter().enumerate() {
        let expected = i + 1;
        if page.page_index != expected {
            return Err(OcrError::RasterisationFailed {
                page: expected,
                detail: format!(
                    "rasteriser returned page {} where page {} was expected",
                    page.page_index, expected
                ),
            });
        }
    }
    Ok(())
}

/// Recognise pages one at a time, recording a result for every page.
async fn recognize_pages(
    recognizer: Arc<dyn TextRecognizer>,
    page_images: Vec<PageImage>,
    config: &ConversionConfig,
) -> Vec<PageResult> {
    let total_pages = page_images.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total_pages);
    }

    let mut results = Vec::with_capacity(total_pages);
    for page in page_images {
        let page_num = page.page_index;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, total_pages);
        }

        let start = Instant::now();
        let outcome = recognize::recognize_page(Arc::clone(&recognizer), page).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(raw) => {
                let text = postprocess::clean_text(&raw);
                debug!("Page {}: {} bytes in {}ms", page_num, text.len(), duration_ms);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_complete(page_num, total_pages, text.len());
                }
                PageResult::success(page_num, text, duration_ms)
            }
            Err(e) => {
                warn!("Page {}: recognition failed: {}", page_num, e);
                let err = PageError::from_recognition(page_num, &e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page_num, total_pages, &err.to_string());
                }
                PageResult::failure(page_num, err, duration_ms)
            }
        };
        results.push(result);
    }

    results.sort_by_key(|p| p.page_index);
    results
}
