//! Text recognition: one page bitmap in, recognised text out.
//!
//! The default engine is the `tesseract` command-line program. Each call
//! writes the page as PNG into its own [`tempfile::TempDir`], runs
//! `tesseract <page.png> stdout -l eng` and returns stdout. The scratch
//! directory is removed when the guard drops, on success and on every error
//! path alike.
//!
//! Recognisers are stateless per call: nothing is cached between pages.

use crate::error::RecognitionError;
use crate::pipeline::encode::encode_png;
use crate::pipeline::PageImage;
use image::DynamicImage;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Fixed recognition language.
pub const TESSERACT_LANGUAGE: &str = "eng";

/// Maps one image to text.
///
/// Implementations are blocking. An empty string is a valid result (blank
/// page); errors are recorded per page by the orchestrator and never abort
/// the document.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, RecognitionError>;
}

/// Recogniser that shells out to the tesseract CLI.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    program: PathBuf,
}

impl TesseractRecognizer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl TextRecognizer for TesseractRecognizer {
    #[instrument(level = "debug", skip_all, fields(w = image.width(), h = image.height()))]
    fn recognize(&self, image: &DynamicImage) -> Result<String, RecognitionError> {
        let png = encode_png(image).map_err(|e| RecognitionError::Encode(e.to_string()))?;

        let scratch = tempfile::TempDir::with_prefix("edgeocr-")?;
        let input_path = scratch.path().join("page.png");
        std::fs::write(&input_path, &png)?;

        let output = Command::new(&self.program)
            .arg(&input_path)
            .arg("stdout")
            .arg("-l")
            .arg(TESSERACT_LANGUAGE)
            .output()
            .map_err(|source| RecognitionError::EngineUnavailable {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(RecognitionError::EngineFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("tesseract returned {} bytes", text.len());
        Ok(text)
    }
}

/// Recognise `page` on the blocking pool.
///
/// A panicking recogniser is reported as a failed page rather than taking
/// the whole run down.
pub async fn recognize_page(
    recognizer: Arc<dyn TextRecognizer>,
    page: PageImage,
) -> Result<String, RecognitionError> {
    tokio::task::spawn_blocking(move || recognizer.recognize(&page.image))
        .await
        .unwrap_or_else(|e| {
            Err(RecognitionError::EngineFailed {
                status: "panicked".into(),
                stderr: e.to_string(),
            })
        })
}
