//! Per-page progress events.
//!
//! Attach an implementation through
//! [`crate::config::ConversionConfigBuilder::progress_callback`]. The
//! `edgeocr` binary drives its terminal progress bar from these events;
//! library callers can use them to collect failed pages as they happen.
//!
//! ```rust
//! use edgequake_ocr::{ConversionConfig, ConversionProgressCallback};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct FailedPages(Mutex<Vec<usize>>);
//!
//! impl ConversionProgressCallback for FailedPages {
//!     fn on_page_error(&self, page_num: usize, _total_pages: usize, error: &str) {
//!         eprintln!("page {page_num}: {error}");
//!         self.0.lock().unwrap().push(page_num);
//!     }
//! }
//!
//! let failed = Arc::new(FailedPages::default());
//! let config = ConversionConfig::builder()
//!     .progress_callback(failed.clone())
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline as it processes each page.
///
/// Every method defaults to a no-op. Events for one run arrive in page
/// order, from the task driving the conversion.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, after the input has been rasterised, before recognition.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is handed to the recogniser.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page is recognised.
    ///
    /// `text_len` is the byte length of the cleaned page text; zero for a
    /// blank page.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
        let _ = (page_num, total_pages, text_len);
    }

    /// Called when recognition of a page fails. The run continues.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after all pages have been attempted.
    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        let _ = (total_pages, success_count);
    }
}

/// Ignores every event.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// The form stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Overrides only the summary event; everything else falls through to
    /// the default no-ops.
    #[derive(Default)]
    struct Summary(Mutex<Option<(usize, usize)>>);

    impl ConversionProgressCallback for Summary {
        fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
            *self.0.lock().unwrap() = Some((total_pages, success_count));
        }
    }

    #[test]
    fn partial_implementation_only_sees_overridden_events() {
        let cb = Summary::default();
        cb.on_conversion_start(2);
        cb.on_page_start(1, 2);
        cb.on_page_error(1, 2, "tesseract exited with 1");
        cb.on_page_start(2, 2);
        cb.on_page_complete(2, 2, 17);
        assert!(cb.0.lock().unwrap().is_none());

        cb.on_conversion_complete(2, 1);
        assert_eq!(*cb.0.lock().unwrap(), Some((2, 1)));
    }

    #[test]
    fn noop_fits_the_config_alias() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_conversion_start(1);
        cb.on_page_complete(1, 1, 0);
        cb.on_conversion_complete(1, 1);
    }
}
