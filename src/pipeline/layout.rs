//! PDF output: lay recognised text onto fresh pages with `printpdf`.
//!
//! The result is text only. Nothing of the source document's graphics,
//! fonts, or geometry is reproduced. Text is set in the built-in Helvetica
//! faces, which need no embedded font file but can only encode a Latin
//! subset, so anything outside printable ASCII is dropped before layout.
//!
//! Each source page becomes its own section: it starts on a fresh output
//! page under a bold "Page N" heading, and its body overflows onto further
//! pages as needed. Pagination is a pure function ([`PdfLayout::paginate`])
//! so it can be tested without parsing PDF bytes. Lines never move backwards
//! across a page break.

use crate::error::OcrError;
use crate::output::PageResult;
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Average Helvetica advance width as a fraction of the font size.
const AVG_CHAR_WIDTH_EM: f32 = 0.5;

const MM_PER_PT: f32 = 25.4 / 72.0;

/// Page geometry and typography for PDF output. All lengths in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfLayout {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_pt: f32,
    pub font_size_pt: f32,
    pub line_height_pt: f32,
    /// Size of the "Page N" heading opening each source page.
    pub heading_size_pt: f32,
    /// Space from the heading baseline to the first body baseline.
    pub heading_line_height_pt: f32,
    /// Title stored in the document information dictionary.
    pub title: String,
}

impl Default for PdfLayout {
    /// US Letter, one-inch margins, Helvetica 11/14 body, 14/18 headings.
    fn default() -> Self {
        Self {
            page_width_pt: 612.0,
            page_height_pt: 792.0,
            margin_pt: 72.0,
            font_size_pt: 11.0,
            line_height_pt: 14.0,
            heading_size_pt: 14.0,
            heading_line_height_pt: 18.0,
            title: "OCR Output".to_string(),
        }
    }
}

/// One output page: the heading of the section it opens, if any, and its
/// wrapped body lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaidOutPage {
    pub heading: Option<String>,
    pub lines: Vec<String>,
}

impl PdfLayout {
    /// Reject geometry that leaves no room for a heading and a body line.
    pub fn validate(&self) -> Result<(), OcrError> {
        if self.font_size_pt <= 0.0
            || self.line_height_pt <= 0.0
            || self.heading_size_pt <= 0.0
            || self.heading_line_height_pt <= 0.0
        {
            return Err(OcrError::InvalidConfig(
                "PDF font sizes and line heights must be positive".into(),
            ));
        }
        if self.usable_width() < self.font_size_pt
            || self.usable_height() < self.heading_size_pt + self.heading_line_height_pt
        {
            return Err(OcrError::InvalidConfig(format!(
                "PDF margins of {}pt leave no printable area on a {}x{}pt page",
                self.margin_pt, self.page_width_pt, self.page_height_pt
            )));
        }
        Ok(())
    }

    fn usable_width(&self) -> f32 {
        self.page_width_pt - 2.0 * self.margin_pt
    }

    fn usable_height(&self) -> f32 {
        self.page_height_pt - 2.0 * self.margin_pt
    }

    /// Estimated characters that fit on one line.
    pub fn chars_per_line(&self) -> usize {
        ((self.usable_width() / (AVG_CHAR_WIDTH_EM * self.font_size_pt)) as usize).max(1)
    }

    /// Body lines that fit on a continuation page.
    pub fn lines_per_page(&self) -> usize {
        self.lines_below(self.font_size_pt)
    }

    /// Body lines that fit under a section heading.
    pub fn lines_under_heading(&self) -> usize {
        self.lines_below(self.heading_size_pt + self.heading_line_height_pt)
    }

    /// Lines whose baselines fit between `first_drop` below the top margin
    /// and the bottom margin.
    fn lines_below(&self, first_drop: f32) -> usize {
        let room = self.usable_height() - first_drop;
        if room < 0.0 {
            return 0;
        }
        (room / self.line_height_pt).floor() as usize + 1
    }

    /// Split per-page results into output pages, in `page_index` order.
    ///
    /// Every source page opens a new output page headed "Page N"; a failed
    /// page keeps its heading with an empty body. Always returns at least one
    /// page.
    pub fn paginate(&self, pages: &[PageResult]) -> Vec<LaidOutPage> {
        let mut ordered: Vec<&PageResult> = pages.iter().collect();
        ordered.sort_by_key(|p| p.page_index);

        let width = self.chars_per_line();
        let under_heading = self.lines_under_heading();
        let per_page = self.lines_per_page().max(1);

        let mut out = Vec::new();
        for page in ordered {
            let mut body = wrap_text(&sanitize(&page.text), width);
            while body.last().is_some_and(|l| l.is_empty()) {
                body.pop();
            }

            let first: Vec<String> = body.drain(..under_heading.min(body.len())).collect();
            out.push(LaidOutPage {
                heading: Some(format!("Page {}", page.page_index)),
                lines: first,
            });
            for chunk in body.chunks(per_page) {
                out.push(LaidOutPage {
                    heading: None,
                    lines: chunk.to_vec(),
                });
            }
        }

        if out.is_empty() {
            out.push(LaidOutPage::default());
        }
        out
    }

    /// Render per-page results into a complete PDF file.
    #[instrument(skip(self, pages), fields(source_pages = pages.len()))]
    pub fn render(&self, pages: &[PageResult]) -> Result<Vec<u8>, OcrError> {
        self.validate()
            .map_err(|e| OcrError::PdfLayoutFailed(e.to_string()))?;

        let laid_out = self.paginate(pages);
        info!(pages = laid_out.len(), "Laying out text PDF");

        let page_w = Mm(self.page_width_pt * MM_PER_PT);
        let page_h = Mm(self.page_height_pt * MM_PER_PT);
        let top = self.page_height_pt - self.margin_pt;

        let mut doc = PdfDocument::new(&self.title);
        let mut pdf_pages = Vec::with_capacity(laid_out.len());

        for page in &laid_out {
            let mut ops: Vec<Op> = Vec::with_capacity((page.lines.len() + 1) * 5);
            let body_top = match page.heading {
                Some(ref heading) => {
                    let y = top - self.heading_size_pt;
                    push_line(
                        &mut ops,
                        heading,
                        (self.margin_pt, y),
                        self.heading_size_pt,
                        BuiltinFont::HelveticaBold,
                    );
                    y - self.heading_line_height_pt
                }
                None => top - self.font_size_pt,
            };
            for (idx, line) in page.lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let y = body_top - idx as f32 * self.line_height_pt;
                push_line(
                    &mut ops,
                    line,
                    (self.margin_pt, y),
                    self.font_size_pt,
                    BuiltinFont::Helvetica,
                );
            }
            pdf_pages.push(PdfPage::new(page_w, page_h, ops));
        }

        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(
            bytes = bytes.len(),
            warnings = warnings.len(),
            "PDF serialised"
        );
        Ok(bytes)
    }
}

/// Append one positioned line of text in `font`.
fn push_line(ops: &mut Vec<Op>, text: &str, (x, y): (f32, f32), size: f32, font: BuiltinFont) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point { x: Pt(x), y: Pt(y) },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size),
        font,
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_string())],
        font,
    });
    ops.push(Op::EndTextSection);
}

/// Keep printable ASCII and newlines; expand tabs to four spaces.
fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push('\n'),
            '\t' => out.push_str("    "),
            ' '..='~' => out.push(c),
            _ => {}
        }
    }
    out
}

/// Wrap a multi-line string so that no line exceeds `max_width` characters.
///
/// Splits on existing newlines first, then word-wraps each paragraph.
/// Words longer than `max_width` are force-broken. Expects ASCII input.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::with_capacity(max_width);

        for word in words {
            if word.len() > max_width {
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                }
                let mut remaining = word;
                while remaining.len() > max_width {
                    let (chunk, rest) = remaining.split_at(max_width);
                    result.push(chunk.to_string());
                    remaining = rest;
                }
                current_line.push_str(remaining);
            } else if current_line.is_empty() {
                current_line.push_str(word);
            } else if current_line.len() + 1 + word.len() <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                result.push(std::mem::take(&mut current_line));
                current_line.push_str(word);
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(i: usize, text: &str) -> PageResult {
        PageResult::success(i, text.to_string(), 0)
    }

    #[test]
    fn letter_defaults() {
        let l = PdfLayout::default();
        assert_eq!(l.chars_per_line(), 85);
        assert_eq!(l.lines_per_page(), 46);
        assert_eq!(l.lines_under_heading(), 45);
        l.validate().unwrap();
    }

    #[test]
    fn wrap_respects_width_and_order() {
        let lines = wrap_text("the quick brown fox jumps", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn wrap_force_breaks_long_words() {
        let lines = wrap_text("abcdefghijkl", 5);
        assert_eq!(lines, vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn wrap_keeps_blank_lines() {
        assert_eq!(wrap_text("A\n\nB", 10), vec!["A", "", "B"]);
    }

    #[test]
    fn sanitize_drops_non_ascii() {
        assert_eq!(sanitize("café\tok\u{0007}"), "caf    ok");
    }

    #[test]
    fn each_source_page_starts_a_new_output_page() {
        let laid_out = PdfLayout::default().paginate(&[page(1, "P1"), page(2, "P2")]);

        assert_eq!(laid_out.len(), 2);
        assert_eq!(laid_out[0].heading.as_deref(), Some("Page 1"));
        assert_eq!(laid_out[0].lines, vec!["P1"]);
        assert_eq!(laid_out[1].heading.as_deref(), Some("Page 2"));
        assert_eq!(laid_out[1].lines, vec!["P2"]);
    }

    #[test]
    fn sections_follow_page_index_not_input_order() {
        let laid_out = PdfLayout::default().paginate(&[page(2, "B"), page(1, "A")]);
        let headings: Vec<_> = laid_out.iter().filter_map(|p| p.heading.clone()).collect();
        assert_eq!(headings, vec!["Page 1", "Page 2"]);
    }

    #[test]
    fn long_page_overflows_within_its_section() {
        let layout = PdfLayout::default();
        let text: String = (0..100).map(|i| format!("line {i}\n")).collect();
        let laid_out = layout.paginate(&[page(1, &text), page(2, "next")]);

        // 45 under the heading, then 46 and 9 on continuation pages.
        assert_eq!(laid_out.len(), 4);
        assert_eq!(laid_out[0].lines.len(), 45);
        assert!(laid_out[1].heading.is_none());
        assert!(laid_out[2].heading.is_none());
        assert_eq!(laid_out[3].heading.as_deref(), Some("Page 2"));

        let flat: Vec<String> = laid_out[..3].iter().flat_map(|p| p.lines.clone()).collect();
        let expected: Vec<String> = (0..100).map(|i| format!("line {i}")).collect();
        assert_eq!(flat, expected);
    }

    #[test]
    fn failed_page_keeps_its_heading() {
        let failed = PageResult::failure(
            2,
            crate::error::PageError::RecognitionFailed {
                page: 2,
                detail: "boom".into(),
            },
            0,
        );
        let laid_out = PdfLayout::default().paginate(&[page(1, "A"), failed, page(3, "C")]);
        assert_eq!(laid_out.len(), 3);
        assert_eq!(laid_out[1].heading.as_deref(), Some("Page 2"));
        assert!(laid_out[1].lines.is_empty());
    }

    #[test]
    fn no_pages_is_one_blank_page() {
        let laid_out = PdfLayout::default().paginate(&[]);
        assert_eq!(laid_out, vec![LaidOutPage::default()]);
    }

    #[test]
    fn render_produces_pdf_bytes() {
        let bytes = PdfLayout::default()
            .render(&[page(1, "Hello\nWorld"), page(2, "Again")])
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn invalid_geometry_rejected() {
        let layout = PdfLayout {
            margin_pt: 400.0,
            ..PdfLayout::default()
        };
        assert!(layout.validate().is_err());
        assert!(matches!(
            layout.render(&[page(1, "x")]),
            Err(OcrError::PdfLayoutFailed(_))
        ));
    }
}
