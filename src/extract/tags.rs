use std::sync::LazyLock;

use regex::Regex;

use super::{ExtractOptions, scan_window};
use crate::error::{Field, Result};

static TAGS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bTAGS?\b[ \t]*:?[ \t]*([^\n]*)").expect("valid tags line regex")
});

/// Person tags as `(surname, given name, canonical tag)`.
const PERSON_TAGS: [(&str, &str, &str); 6] = [
    ("STEINBERG", "JAMES", "STEINBERG, JAMES B."),
    ("CLINTON", "HILLARY", "CLINTON, HILLARY"),
    ("RICE", "CONDOLEEZZA", "RICE, CONDOLEEZZA"),
    ("BIDEN", "JOSEPH", "BIDEN, JOSEPH"),
    ("GATES", "ROBERT", "GATES, ROBERT"),
    ("BURNS", "WILLIAM", "BURNS, WILLIAM"),
];

const TAG_FIXES: [(&str, &str); 3] = [("MOPPS", "MOPS"), ("POGOV", "PGOV"), ("RU", "RS")];

const IGNORED_TAGS: [&str; 1] = ["SIPDIS"];

static TAG_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    let people = PERSON_TAGS
        .iter()
        .map(|(surname, given, _)| format!(r"{surname},?\s+{given}(?:\s+[A-Z](?:\.|\b))?"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)(?:{people})|[A-Z][A-Z0-9_\-]*")).expect("valid tag token regex")
});

/// Extracts the TAGS line, following it onto the next line when it ends in a comma.
pub fn parse_tags(text: &str, options: &ExtractOptions<'_>) -> Result<Vec<String>> {
    let window = scan_window(text);
    let Some(captures) = TAGS_LINE.captures(window) else {
        return options.missing(Field::Tags);
    };
    let Some(first_line) = captures.get(1) else {
        return options.missing(Field::Tags);
    };

    let mut raw = first_line.as_str().trim_end().to_string();
    let mut following = window[first_line.end()..].lines().skip(1);
    while raw.is_empty() || raw.ends_with(',') {
        let Some(next) = following.next() else {
            break;
        };
        raw.push(' ');
        raw.push_str(next.trim());
        raw = raw.trim().to_string();
    }

    if let Some(subject_at) = raw.find("SUBJECT") {
        raw.truncate(subject_at);
    }

    let mut tags = Vec::<String>::new();
    for token in TAG_TOKEN.find_iter(&raw) {
        let tag = canonical_tag(token.as_str());
        if IGNORED_TAGS.contains(&tag.as_str()) || tags.contains(&tag) {
            continue;
        }
        tags.push(tag);
    }

    if tags.is_empty() {
        return options.missing(Field::Tags);
    }
    Ok(tags)
}

fn canonical_tag(token: &str) -> String {
    let upper = token.to_uppercase();

    if let Some((_, _, person)) = PERSON_TAGS.iter().find(|(surname, given, _)| {
        upper.starts_with(surname) && upper.contains(given) && upper.len() > surname.len()
    }) {
        return (*person).to_string();
    }

    TAG_FIXES
        .iter()
        .find(|(wrong, _)| *wrong == upper)
        .map(|(_, right)| (*right).to_string())
        .unwrap_or(upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CableError;

    fn tags(text: &str) -> Vec<String> {
        parse_tags(text, &ExtractOptions::default()).unwrap()
    }

    #[test]
    fn comma_continues_onto_next_line() {
        assert_eq!(tags("TAGS: something, \nhere"), vec!["SOMETHING", "HERE"]);
    }

    #[test]
    fn space_and_comma_separated_tags() {
        assert_eq!(
            tags("E.O. 12958: DECL: 12/18/2019\nTAGS: PREL, PGOV ECON,KNNP\nSUBJECT: X"),
            vec!["PREL", "PGOV", "ECON", "KNNP"]
        );
    }

    #[test]
    fn person_tags_and_misspellings_are_normalized() {
        assert_eq!(
            tags("TAGS: OVIP (STEINBERG JAMES) MOPPS POGOV RU PGOV\n"),
            vec!["OVIP", "STEINBERG, JAMES B.", "MOPS", "PGOV", "RS"]
        );
        assert_eq!(
            tags("TAGS: OVIP (STEINBERG, JAMES B.) PREL"),
            vec!["OVIP", "STEINBERG, JAMES B.", "PREL"]
        );
    }

    #[test]
    fn sipdis_and_trailing_subject_are_dropped() {
        assert_eq!(
            tags("TAGS: PREL SIPDIS PREL SUBJECT: TALKS"),
            vec!["PREL"]
        );
    }

    #[test]
    fn missing_tags_line_is_an_error() {
        let err = parse_tags("SUBJECT: NOTHING\n\n", &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, CableError::FieldNotFound { field: Field::Tags, .. }));
        let lenient = ExtractOptions::default().ignoring_errors();
        assert!(parse_tags("SUBJECT: NOTHING", &lenient).unwrap().is_empty());
    }
}
