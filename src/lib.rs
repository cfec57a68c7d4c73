//! # edgequake-ocr
//!
//! Extract text from images and scanned PDFs with OCR, and write it out as a
//! UTF-8 text file or a freshly typeset, text-only PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input (.png / .jpg / .jpeg / .pdf)
//!  │
//!  ├─ 1. Input      validate path, detect kind from the extension
//!  ├─ 2. Render     PDF → one bitmap per page via pdfium (spawn_blocking)
//!  ├─ 3. Recognise  page bitmap → text via tesseract, page by page, in order
//!  ├─ 4. Clean      strip engine artefacts (form feeds, CR, blank runs)
//!  ├─ 5. Assemble   join pages with a separator; failed pages keep an empty slot
//!  └─ 6. Output     .txt (UTF-8) or .pdf (printpdf), written atomically
//! ```
//!
//! A page that fails recognition does not abort the document; the run
//! reports it in [`ConversionResult::pages_failed`]. Only when *every* page
//! fails does [`convert`] return [`OcrError::NoTextRecognized`], and then no
//! output file is created.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_ocr::{convert, ConversionConfig, ConversionRequest, OutputFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = ConversionRequest::new("scan.pdf", "scan.txt", OutputFormat::Text);
//!     let result = convert(&request, &ConversionConfig::default()).await?;
//!     eprintln!("{}/{} pages", result.pages_processed, result.total_pages);
//!     Ok(())
//! }
//! ```
//!
//! ## External engines
//!
//! | Concern | Default | Swap with |
//! |---------|---------|-----------|
//! | Recognition | `tesseract` on PATH (`-l eng`) | [`TextRecognizer`] |
//! | Rasterisation | pdfium via `pdfium-render` | [`PageRasterizer`] |
//! | PDF output | built-in Helvetica via `printpdf` | [`PdfLayout`] settings |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `edgeocr` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PageSeparator};
pub use convert::{convert, convert_sync, inspect, recognize_document};
pub use error::{ErrorKind, OcrError, PageError, RecognitionError};
pub use output::{ConversionResult, DocumentMetadata, PageResult, RecognizedDocument};
pub use pipeline::layout::{LaidOutPage, PdfLayout};
pub use pipeline::recognize::{TesseractRecognizer, TextRecognizer};
pub use pipeline::render::{PageRasterizer, PdfiumRasterizer};
pub use pipeline::PageImage;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use request::{ConversionRequest, InputKind, OutputFormat};
