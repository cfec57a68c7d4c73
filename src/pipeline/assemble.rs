//! Aggregation: join per-page text into one document in page order.
//!
//! Every page keeps its slot. A failed page contributes an empty string, so
//! a three-page document always has exactly two separators no matter how
//! many pages were recognised. Pages are never reordered or deduplicated.
//! [`PageSeparator::Banner`] additionally labels the first page.

use crate::config::PageSeparator;
use crate::output::PageResult;

/// Join `pages` by `separator`, ordered by `page_index`.
///
/// The input order does not matter; callers that recognise pages out of
/// order get the same output as a sequential run.
pub fn assemble_text(pages: &[PageResult], separator: &PageSeparator) -> String {
    let mut ordered: Vec<&PageResult> = pages.iter().collect();
    ordered.sort_by_key(|p| p.page_index);

    let mut out = String::with_capacity(ordered.iter().map(|p| p.text.len() + 2).sum());
    for (i, page) in ordered.iter().enumerate() {
        if i == 0 {
            out.push_str(&separator.leading(page.page_index));
        } else {
            out.push_str(&separator.render(page.page_index));
        }
        out.push_str(&page.text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageError;

    fn ok(i: usize, t: &str) -> PageResult {
        PageResult::success(i, t.to_string(), 0)
    }

    fn failed(i: usize) -> PageResult {
        PageResult::failure(
            i,
            PageError::RecognitionFailed {
                page: i,
                detail: "boom".into(),
            },
            0,
        )
    }

    #[test]
    fn three_pages_in_order() {
        let pages = vec![ok(1, "A"), ok(2, "B"), ok(3, "C")];
        assert_eq!(assemble_text(&pages, &PageSeparator::BlankLine), "A\n\nB\n\nC");
    }

    #[test]
    fn out_of_order_input_is_sorted() {
        let pages = vec![ok(3, "C"), ok(1, "A"), ok(2, "B")];
        assert_eq!(assemble_text(&pages, &PageSeparator::BlankLine), "A\n\nB\n\nC");
    }

    #[test]
    fn failed_page_keeps_empty_slot() {
        let pages = vec![ok(1, "A"), failed(2), ok(3, "C")];
        assert_eq!(assemble_text(&pages, &PageSeparator::BlankLine), "A\n\n\n\nC");
    }

    #[test]
    fn separator_count_is_pages_minus_one() {
        let pages: Vec<PageResult> = (1..=5).map(|i| ok(i, "x")).collect();
        let text = assemble_text(&pages, &PageSeparator::Custom("<<break>>".into()));
        assert_eq!(text.matches("<<break>>").count(), 4);
    }

    #[test]
    fn banner_labels_every_page() {
        let pages = vec![ok(1, "A"), ok(2, "B")];
        let text = assemble_text(&pages, &PageSeparator::Banner);
        assert!(text.starts_with("=====") && text.contains("\nPage 1\n"));
        assert!(text.contains("=====\n\nA\n\n====="));
        assert!(text.contains("\nPage 2\n"));
        assert!(text.ends_with("=====\n\nB"));
        assert_eq!(text.matches("\nPage ").count(), 2);
    }

    #[test]
    fn single_page_has_no_separator() {
        assert_eq!(assemble_text(&[ok(1, "only")], &PageSeparator::BlankLine), "only");
        assert_eq!(assemble_text(&[], &PageSeparator::Banner), "");
    }

    #[test]
    fn duplicates_are_kept() {
        let pages = vec![ok(1, "same"), ok(2, "same")];
        assert_eq!(assemble_text(&pages, &PageSeparator::BlankLine), "same\n\nsame");
    }
}
