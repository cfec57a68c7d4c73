//! The conversion request and the two closed enums it is built from.
//!
//! A [`ConversionRequest`] is the only thing the front end hands to the
//! orchestrator. Input kind is derived from the input extension; the output
//! format is chosen explicitly and parsed from `txt` / `pdf`.

use crate::error::OcrError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What kind of document the input file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    /// A single raster image (`.jpg`, `.jpeg`, `.png`).
    Image,
    /// A PDF document (`.pdf`), rasterised page by page.
    Pdf,
}

impl InputKind {
    /// Extensions recognised as images.
    pub const IMAGE_EXTENSIONS: [&'static str; 3] = ["jpg", "jpeg", "png"];
    /// Extensions recognised as PDFs.
    pub const PDF_EXTENSIONS: [&'static str; 1] = ["pdf"];

    /// Detect the input kind from the path extension (case-insensitive).
    ///
    /// Returns `None` for missing or unsupported extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if Self::IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(InputKind::Image)
        } else if Self::PDF_EXTENSIONS.contains(&ext.as_str()) {
            Some(InputKind::Pdf)
        } else {
            None
        }
    }
}

/// Container the recognised text is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// UTF-8 plain text (`.txt`).
    #[default]
    Text,
    /// A newly authored, text-only PDF (`.pdf`).
    Pdf,
}

impl OutputFormat {
    /// File extension (without the dot) conventionally used for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Pdf => "pdf",
        }
    }

    /// Return `path` with this format's extension appended unless it already
    /// ends with it (case-insensitive).
    ///
    /// `out` → `out.txt`, `notes.TXT` → unchanged, `scan.png` → `scan.png.txt`.
    pub fn ensure_extension(self, path: &Path) -> PathBuf {
        if self.matches_extension(path) {
            return path.to_path_buf();
        }
        let mut os = path.as_os_str().to_os_string();
        os.push(".");
        os.push(self.extension());
        PathBuf::from(os)
    }

    /// Whether `path` already carries this format's extension.
    pub fn matches_extension(self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(self.extension()))
    }
}

impl FromStr for OutputFormat {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(OutputFormat::Text),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(OcrError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One unit of work: convert `input_path` into `output_path` as `output_format`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub output_format: OutputFormat,
}

impl ConversionRequest {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        output_format: OutputFormat,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            output_format,
        }
    }
}
