//! Post-processing: deterministic cleanup of raw tesseract output.
//!
//! ## Why is post-processing necessary?
//!
//! The tesseract CLI terminates its output with a form-feed page marker
//! (`\x0c`), may emit CRLF line endings on some platforms, and pads
//! sparse pages with long runs of blank lines. None of that is text the
//! page contains. This module applies a handful of cheap, ordered
//! string/regex rules that strip the tool's artifacts without touching
//! recognized content. Each rule is a pure `&str → String` function with
//! no shared state, independently testable.
//!
//! ## Rule Order
//!
//! Line endings are normalised before per-line trimming so `\r` never
//! survives as "trailing whitespace", and blank-line collapsing runs
//! after trimming so whitespace-only lines count as blank.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw tesseract output.
///
/// Rules (applied in order):
/// 1. Drop form-feed page terminators
/// 2. Normalise line endings (CRLF → LF)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive blank lines down to 2
/// 5. Trim leading/trailing blank space around the page
pub fn clean_text(input: &str) -> String {
    let s = strip_form_feeds(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

// ── Rule 1: Drop form feeds ──────────────────────────────────────────────────

fn strip_form_feeds(input: &str) -> String {
    input.replace('\u{0c}', "")
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_page_terminator_form_feed() {
        assert_eq!(clean_text("INVOICE 42\n\u{0c}"), "INVOICE 42");
    }

    #[test]
    fn normalises_crlf() {
        assert_eq!(clean_text("one\r\ntwo\rthree"), "one\ntwo\nthree");
    }

    #[test]
    fn trims_trailing_spaces_per_line() {
        assert_eq!(clean_text("total:   \n  due 5.00  "), "total:\n  due 5.00");
    }

    #[test]
    fn collapses_blank_line_runs() {
        let cleaned = clean_text("a\n\n\n\n\n\nb");
        assert_eq!(cleaned, "a\n\n\nb");
    }

    #[test]
    fn clean_text_is_idempotent() {
        let raw = "HEADER  \r\n\r\n\r\n\r\nbody line\n\u{0c}";
        let once = clean_text(raw);
        assert_eq!(clean_text(&once), once);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("\u{0c}\n\n"), "");
    }
}
