use std::sync::LazyLock;

use regex::Regex;

use super::{CLASSIFICATION_CODE, ExtractOptions, collapse_whitespace, scan_window};
use crate::error::{Field, Result};

static SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?s)\bSUBJ(?:ECT)?\b\s*:?\s*(.+?)",
        r"(?:\n[ \t]*\n",
        r"|\n\s*REF(?:S|\(S\)|TELS?)?\s*:",
        r"|\s+REFS?:\s",
        r"|REF\(S\):?",
        r"|\s*[Cc]lassified\s+[Bb]y",
        r"|\s*CLASSIFIED\s+BY",
        r"|\n\s*PAGE\s+[0-9]+",
        r"|\n\s*(?:MONDAY|TUESDAY|WEDNESDAY|THURSDAY|FRIDAY|SATURDAY|SUNDAY)\b",
        r"|\n\s*(?:C O N F I D E N T I A L|S E C R E T|UNCLAS\b)",
        r"|\n\s*TAGS?\b",
        r"|\n\s*1\.\s",
        r"|\z)",
    ))
    .expect("valid subject regex")
});

static LEADING_CLASSIFICATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{CLASSIFICATION_CODE}\s*")).expect("valid leading classification regex")
});
static TRAILING_CLASSIFICATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\s*{CLASSIFICATION_CODE}$")).expect("valid trailing classification regex")
});
static HTML_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#?[A-Za-z0-9]+;").expect("valid html entity regex"));

/// Extracts the subject line from the header zone of the content.
pub fn parse_subject(text: &str, options: &ExtractOptions<'_>) -> Result<Option<String>> {
    let Some(captures) = SUBJECT.captures(scan_window(text)) else {
        return options.missing(Field::Subject);
    };

    let mut subject = collapse_whitespace(&captures[1]);
    if options.clean_subject {
        subject = LEADING_CLASSIFICATION.replace(&subject, "").into_owned();
        subject = TRAILING_CLASSIFICATION.replace(&subject, "").into_owned();
    }

    if subject.is_empty() {
        return options.missing(Field::Subject);
    }

    if let Some(entity) = HTML_ENTITY.find(&subject) {
        let detail = format!("unresolved HTML entity {}", entity.as_str());
        return options.malformed(Field::Subject, detail, Some(subject));
    }

    Ok(Some(subject))
}
