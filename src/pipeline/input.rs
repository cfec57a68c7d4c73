//! Input validation: make sure the path is a readable file of a supported kind.
//!
//! Validation runs before any adapter is touched, so a bad request never
//! spawns tesseract or loads pdfium. The kind comes from the extension alone
//! (case-insensitive); content sniffing is left to the decoders, which report
//! their own errors.

use crate::error::OcrError;
use crate::pipeline::PageImage;
use crate::request::InputKind;
use std::path::Path;
use tracing::debug;

/// Validate `path` and return its [`InputKind`].
///
/// Checks, in order: the file exists, its extension is supported, and it can
/// be opened for reading.
pub fn validate_input(path: &Path) -> Result<InputKind, OcrError> {
    if !path.is_file() {
        return Err(OcrError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let kind = InputKind::from_path(path).ok_or_else(|| OcrError::UnsupportedInput {
        path: path.to_path_buf(),
    })?;

    match std::fs::File::open(path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(OcrError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(OcrError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Resolved {:?} input: {}", kind, path.display());
    Ok(kind)
}

/// Decode an image input into its single page (index 1).
///
/// Blocking: call from `spawn_blocking`.
pub fn load_image(path: &Path) -> Result<PageImage, OcrError> {
    let image = image::open(path).map_err(|e| OcrError::UndecodableImage {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    debug!(
        "Loaded image {} → {}x{} px",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(PageImage::new(1, image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use image::{DynamicImage, Rgb, RgbImage};

    #[test]
    fn missing_file_is_invalid_input() {
        let err = validate_input(Path::new("missing.xyz")).unwrap_err();
        assert!(matches!(err, OcrError::FileNotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn unsupported_extension_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.docx");
        std::fs::write(&path, b"hello").unwrap();

        let err = validate_input(&path).unwrap_err();
        assert!(matches!(err, OcrError::UnsupportedInput { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn directory_is_not_an_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folder.pdf");
        std::fs::create_dir(&path).unwrap();
        assert!(matches!(
            validate_input(&path),
            Err(OcrError::FileNotFound { .. })
        ));
    }

    #[test]
    fn mixed_case_extension_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Scan.PDF");
        std::fs::write(&path, b"%PDF-1.4\n").unwrap();
        assert_eq!(validate_input(&path).unwrap(), InputKind::Pdf);
    }

    #[test]
    fn load_image_yields_page_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 4, Rgb([255, 255, 255])))
            .save(&path)
            .unwrap();

        let page = load_image(&path).unwrap();
        assert_eq!(page.page_index, 1);
        assert_eq!((page.image.width(), page.image.height()), (8, 4));
    }

    #[test]
    fn garbage_image_is_undecodable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, OcrError::UndecodableImage { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
