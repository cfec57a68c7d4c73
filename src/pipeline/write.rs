//! Output writers: serialise recognised text as `.txt` or `.pdf` and persist
//! it atomically.
//!
//! Both writers build the complete file in memory first, then hand it to
//! [`write_atomic`], which writes a named temp file in the destination
//! directory and renames it over the target. A failed write leaves neither a
//! half-written output nor a stray temp file behind, and an existing file at
//! the target is only replaced once the new content is fully on disk.

use crate::error::OcrError;
use crate::output::PageResult;
use crate::pipeline::layout::PdfLayout;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Write the aggregated `text` to `path` as UTF-8, byte for byte.
pub fn write_text(text: &str, path: &Path) -> Result<(), OcrError> {
    write_atomic(path, text.as_bytes())
}

/// Lay out `pages`, one section per source page, and write the PDF to `path`.
pub fn write_pdf(pages: &[PageResult], path: &Path, layout: &PdfLayout) -> Result<(), OcrError> {
    let bytes = layout.render(pages)?;
    write_atomic(path, &bytes)
}

/// Atomically replace `path` with `bytes`.
///
/// Missing parent directories are created.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), OcrError> {
    let fail = |source: std::io::Error| OcrError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(fail)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".edgeocr-")
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(fail)?;
    tmp.write_all(bytes).map_err(fail)?;
    tmp.as_file().sync_all().map_err(fail)?;
    debug!("Staged {} bytes at {}", bytes.len(), tmp.path().display());

    // On error the NamedTempFile inside PersistError drops and removes itself.
    tmp.persist(path).map_err(|e| fail(e.error))?;

    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_text("Hello\nWorld", &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Hello\nWorld");
    }

    #[test]
    fn utf8_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_text("naïve — 東京", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "naïve — 東京");
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "old content that is longer").unwrap();
        write_text("new", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn creates_parent_dirs_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.txt");
        write_text("x", &path).unwrap();

        let names: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("out.txt")]);
    }

    #[test]
    fn target_is_a_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("taken");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "x").unwrap();

        let err = write_text("data", &target).unwrap_err();
        assert!(matches!(err, OcrError::OutputWriteFailed { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);

        // Only the pre-existing directory remains; no temp file leaked.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn pdf_writer_emits_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let pages = [PageResult::success(1, "Hello".into(), 0)];
        write_pdf(&pages, &path, &PdfLayout::default()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn pdf_layout_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let cramped = PdfLayout {
            margin_pt: 400.0,
            ..PdfLayout::default()
        };
        let pages = [PageResult::success(1, "Hello".into(), 0)];

        let err = write_pdf(&pages, &path, &cramped).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
