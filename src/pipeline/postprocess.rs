//! Post-processing: deterministic cleanup of raw OCR engine output.
//!
//! Tesseract output carries a few artefacts that have nothing to do with the
//! page content: a trailing form feed (its page terminator), stray `\r`,
//! trailing spaces, long runs of empty lines where it found layout gaps, and
//! occasionally zero-width characters. These rules strip them; text without
//! any of them passes through unchanged.
//!
//! Rules run per page, never on the aggregated document, so the empty
//! placeholders of failed pages are left alone.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all clean-up rules, in order:
///
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Drop form feeds
/// 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 4. Trim trailing whitespace per line
/// 5. Collapse 3+ consecutive blank lines down to 2
/// 6. Trim blank lines at the start and end of the page
pub fn clean_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_form_feeds(&s);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    trim_outer_blank_lines(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Form feeds ───────────────────────────────────────────────────────

fn remove_form_feeds(input: &str) -> String {
    input.replace('\u{000C}', "")
}

// ── Rule 3: Invisible characters ─────────────────────────────────────────────

const INVISIBLE: [char; 6] = [
    '\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}', '\u{00AD}',
];

fn remove_invisible_chars(input: &str) -> String {
    input.chars().filter(|c| !INVISIBLE.contains(c)).collect()
}

// ── Rule 4: Trailing whitespace ──────────────────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .split('\n')
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Blank-line runs ──────────────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 6: Outer blank lines ────────────────────────────────────────────────

fn trim_outer_blank_lines(input: &str) -> String {
    input.trim_start_matches('\n').trim_end_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_leaves_plain_text_alone() {
        assert_eq!(clean_text("Hello\nWorld"), "Hello\nWorld");
        assert_eq!(clean_text("A"), "A");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn tesseract_page_terminator_removed() {
        assert_eq!(clean_text("Invoice 42\n\n\u{000C}"), "Invoice 42");
    }

    #[test]
    fn crlf_and_trailing_spaces() {
        assert_eq!(clean_text("one  \r\ntwo\t\rthree"), "one\ntwo\nthree");
    }

    #[test]
    fn blank_runs_collapsed() {
        assert_eq!(clean_text("a\n\n\n\n\n\nb"), "a\n\n\nb");
        assert_eq!(clean_text("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn invisible_chars_stripped() {
        assert_eq!(clean_text("\u{FEFF}co\u{200B}de"), "code");
    }

    #[test]
    fn leading_indentation_kept() {
        assert_eq!(clean_text("\n\n    indented\n"), "    indented");
    }

    #[test]
    fn whitespace_only_page_is_empty() {
        assert_eq!(clean_text(" \n \n\u{000C}"), "");
    }
}
