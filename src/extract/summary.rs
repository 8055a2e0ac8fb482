use std::sync::LazyLock;

use regex::Regex;

use super::{CLASSIFICATION_CODE, ExtractOptions, collapse_whitespace, scan_window};
use crate::error::{Field, Result};

static END_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)END\s+(?:OF\s+)?SUMMARY").expect("valid end summary regex")
});
static START_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:BEGIN\s+)?SUMMARY(?:\s+AND\s+(?:COMMENT|ACTION\s+REQUEST))?\s*[:.\-]+")
        .expect("valid start summary regex")
});
static DIRECT_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:BEGIN\s+)?SUMMARY\s*[:.\-]+\s*(.+?)(?:\n[ \t]*\n|END\s+SUMMARY)")
        .expect("valid direct summary regex")
});

/// A paragraph number and/or classification code opening a line.
static PARAGRAPH_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?m)^[ \t]*(?:[0-9]{{1,2}}\.[ \t]*)?{CLASSIFICATION_CODE}[ \t]*|^[ \t]*[0-9]{{1,2}}\.[ \t]+"
    ))
    .expect("valid paragraph prefix regex")
});
static SECTION_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\-=_*]{3,}").expect("valid section delimiter regex"));

/// Extracts the cable summary.
///
/// With an END SUMMARY marker the summary runs from the start marker in
/// front of it to the end marker; otherwise it is the paragraph following a
/// SUMMARY marker. The summary must start within the scan window.
pub fn parse_summary(content: &str, options: &ExtractOptions<'_>) -> Result<Option<String>> {
    let limit = scan_window(content).len();

    let raw = match END_SUMMARY.find(content) {
        Some(end) => {
            let before = &content[..end.start()];
            match START_SUMMARY.find(before).filter(|start| start.start() < limit) {
                Some(start) => &before[start.end()..],
                None if end.start() < limit => return options.missing(Field::Summary),
                None => return Ok(None),
            }
        }
        None => {
            let body = DIRECT_SUMMARY
                .captures(content)
                .filter(|captures| captures.get(0).is_some_and(|m| m.start() < limit))
                .and_then(|captures| captures.get(1));
            match body {
                Some(body) => body.as_str(),
                None => return Ok(None),
            }
        }
    };

    let cleaned = PARAGRAPH_PREFIX.replace_all(raw, " ");
    let cleaned = SECTION_DELIMITER.replace_all(&cleaned, " ");
    let summary = collapse_whitespace(&cleaned)
        .trim_start_matches(|c: char| c == '.' || c == ':' || c == '-' || c.is_whitespace())
        .to_string();

    if summary.is_empty() {
        return Ok(None);
    }
    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CableError;

    fn summary(text: &str) -> Option<String> {
        parse_summary(text, &ExtractOptions::default()).unwrap()
    }

    #[test]
    fn span_between_start_and_end_markers() {
        let text = "1. (C) SUMMARY: The minister agreed.\n\nHe will travel. END SUMMARY.\n\n2. (C) Body";
        assert_eq!(
            summary(text).as_deref(),
            Some("The minister agreed. He will travel.")
        );
    }

    #[test]
    fn begin_summary_variant_and_delimiters() {
        let text = "BEGIN SUMMARY: -------\nTalks stalled\n-------\nEnd Summary.";
        assert_eq!(summary(text).as_deref(), Some("Talks stalled"));
    }

    #[test]
    fn direct_capture_without_end_marker() {
        let text = "SUBJECT: X\n\n1. (SBU) Summary: Elections are on track.\n\n2. (SBU) More.";
        assert_eq!(summary(text), None);

        let text = "SUBJECT: X\n\n1. (SBU) SUMMARY: Elections are\non track.\n\n2. (SBU) More.";
        assert_eq!(summary(text).as_deref(), Some("Elections are on track."));
    }

    #[test]
    fn end_marker_without_start_is_an_error() {
        let text = "1. Some text. END SUMMARY.";
        let err = parse_summary(text, &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, CableError::FieldNotFound { field: Field::Summary, .. }));

        let lenient = ExtractOptions::default().ignoring_errors();
        assert_eq!(parse_summary(text, &lenient).unwrap(), None);
    }

    #[test]
    fn acronyms_inside_the_summary_survive() {
        let text = "SUMMARY: The International Atomic Energy Agency (IAEA) and NATO (ISAF) met.\n\n\
                    2. (C) Talks continue (S). END SUMMARY.";
        assert_eq!(
            summary(text).as_deref(),
            Some("The International Atomic Energy Agency (IAEA) and NATO (ISAF) met. Talks continue (S).")
        );
    }

    #[test]
    fn markers_beyond_the_scan_window_are_ignored() {
        let direct = format!("{}\n\nSUMMARY: Deep text.\n\n2. More.", "x".repeat(1300));
        assert_eq!(summary(&direct), None);

        let spanned = format!("{}\nSUMMARY: Deep text. END SUMMARY.", "x ".repeat(700));
        assert_eq!(summary(&spanned), None);
    }

    #[test]
    fn summary_starting_in_the_window_may_run_past_it() {
        let text = format!("SUMMARY: {}END SUMMARY.", "word ".repeat(300));
        let value = summary(&text).unwrap();
        assert!(value.starts_with("word word"));
        assert!(value.len() > 1200);
    }

    #[test]
    fn no_summary_at_all() {
        assert_eq!(summary("1. (C) Plain cable body.\n"), None);
    }
}
