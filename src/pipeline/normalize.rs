//! Whitespace normalisation of OCR output and the "enough text" gate.
//!
//! Tesseract output carries the page's line and paragraph breaks. The model
//! only needs the words in reading order, so every whitespace run (spaces,
//! tabs, newlines, form feeds) collapses to a single space.

/// Collapse every whitespace run into one space and trim both ends.
///
/// Idempotent: `clean_text(&clean_text(s)) == clean_text(s)`.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `text` carries at least `min_chars` non-whitespace characters.
///
/// Below this threshold the pipeline stops before the LLM call: a scanned
/// page that OCRs to nothing cannot yield form data.
pub fn has_enough_text(text: &str, min_chars: usize) -> bool {
    text.trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(min_chars)
        .count()
        >= min_chars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_all_whitespace_kinds() {
        assert_eq!(
            clean_text("Name: Jane Doe\nDOB: 1990-01-01\n\nPhone:\t555-1234\n\x0c"),
            "Name: Jane Doe DOB: 1990-01-01 Phone: 555-1234"
        );
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert_eq!(clean_text("   \n\t "), "");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn normalisation_is_idempotent() {
        for s in [
            "  a  b\n\nc ",
            "already normal",
            "",
            "tabs\tand\r\nlines",
            "ünïcödé  \u{2003} spaces",
        ] {
            let once = clean_text(s);
            assert_eq!(clean_text(&once), once, "input: {s:?}");
        }
    }

    #[test]
    fn enough_text_threshold() {
        assert!(!has_enough_text("", 10));
        assert!(!has_enough_text("   ", 10));
        assert!(!has_enough_text("ab", 10));
        assert!(!has_enough_text("a b c d e f g h i", 10));
        assert!(has_enough_text("abcdefghij", 10));
        assert!(has_enough_text("Name: Jane Doe", 10));
    }
}
