//! Error types for the edgequake-ocr library.
//!
//! Three error types mirror three failure scopes:
//!
//! * [`OcrError`] is **fatal**: the conversion cannot proceed at all (missing
//!   input, unreadable PDF, every page failed, output not writable). Returned
//!   as `Err(OcrError)` from [`crate::convert::convert`] and friends.
//!
//! * [`PageError`] is **non-fatal**: a single page could not be recognised.
//!   Stored inside [`crate::output::PageResult`]; the run continues with the
//!   next page.
//!
//! * [`RecognitionError`] is what a [`crate::pipeline::recognize::TextRecognizer`]
//!   returns. The orchestrator turns it into a [`PageError`].
//!
//! [`OcrError::kind`] collapses the fatal variants into the small
//! [`ErrorKind`] taxonomy the CLI maps onto exit codes.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-ocr library.
#[derive(Debug, Error)]
pub enum OcrError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The extension does not map to a supported input kind.
    #[error("Unsupported input file '{path}'\nSupported formats are: .jpg, .jpeg, .png, .pdf")]
    UnsupportedInput { path: PathBuf },

    /// The file has an image extension but could not be decoded.
    #[error("Cannot decode image '{path}': {detail}")]
    UndecodableImage { path: PathBuf, detail: String },

    // ── Output format errors ──────────────────────────────────────────────
    /// The requested output format is neither `txt` nor `pdf`.
    #[error("Unsupported output format '{format}'\nSupported formats are: txt, pdf")]
    UnsupportedFormat { format: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The PDF parsed but contains no pages.
    #[error("PDF '{path}' has no pages")]
    EmptyPdf { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Place libpdfium next to the executable or in the current directory.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Recognition errors ────────────────────────────────────────────────
    /// Every page failed recognition; no output was written.
    #[error("No text could be recognised: all {total} page(s) failed.\nFirst error: {first_error}")]
    NoTextRecognized { total: usize, first_error: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// printpdf could not produce the output document.
    #[error("Failed to lay out PDF output: {0}")]
    PdfLayoutFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of an [`OcrError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ErrorKind {
    /// Bad path, unreadable file, or unsupported extension.
    InvalidInput,
    /// Output format other than text or PDF.
    UnsupportedFormat,
    /// The PDF could not be opened or rendered.
    Rasterization,
    /// Every page failed recognition.
    NoTextRecognized,
    /// The output could not be written.
    Io,
    /// Configuration or internal failure.
    Internal,
}

impl OcrError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OcrError::FileNotFound { .. }
            | OcrError::PermissionDenied { .. }
            | OcrError::UnsupportedInput { .. }
            | OcrError::UndecodableImage { .. } => ErrorKind::InvalidInput,
            OcrError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            OcrError::CorruptPdf { .. }
            | OcrError::PasswordRequired { .. }
            | OcrError::WrongPassword { .. }
            | OcrError::EmptyPdf { .. }
            | OcrError::RasterisationFailed { .. }
            | OcrError::PdfiumBindingFailed(_) => ErrorKind::Rasterization,
            OcrError::NoTextRecognized { .. } => ErrorKind::NoTextRecognized,
            OcrError::OutputWriteFailed { .. } | OcrError::PdfLayoutFailed(_) => ErrorKind::Io,
            OcrError::InvalidConfig(_) | OcrError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl ErrorKind {
    /// Process exit code used by the `edgeocr` binary.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Internal => 1,
            ErrorKind::InvalidInput => 2,
            ErrorKind::UnsupportedFormat => 3,
            ErrorKind::Rasterization => 4,
            ErrorKind::NoTextRecognized => 5,
            ErrorKind::Io => 6,
        }
    }
}

/// Failure reported by a text recogniser for one image.
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// The OCR program could not be started (not installed / not on PATH).
    #[error("OCR engine '{program}' is unavailable: {source}\nInstall tesseract-ocr or pass --tesseract <PATH>.")]
    EngineUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The OCR program ran but exited unsuccessfully.
    #[error("OCR engine exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },

    /// The page image could not be encoded for the engine.
    #[error("Failed to encode page image: {0}")]
    Encode(String),

    /// Scratch-file I/O failed.
    #[error("OCR scratch I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A non-fatal error for a single page.
///
/// The overall conversion continues unless ALL pages fail.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The OCR engine could not be run at all.
    #[error("Page {page}: OCR engine unavailable: {detail}")]
    EngineUnavailable { page: usize, detail: String },

    /// Recognition ran and failed.
    #[error("Page {page}: recognition failed: {detail}")]
    RecognitionFailed { page: usize, detail: String },
}

impl PageError {
    /// Wrap a recogniser failure for `page`.
    pub fn from_recognition(page: usize, err: &RecognitionError) -> Self {
        match err {
            RecognitionError::EngineUnavailable { .. } => PageError::EngineUnavailable {
                page,
                detail: err.to_string(),
            },
            _ => PageError::RecognitionFailed {
                page,
                detail: err.to_string(),
            },
        }
    }
}
