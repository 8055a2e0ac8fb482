use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{ExtractOptions, HEADER_SCAN_LIMIT};
use crate::c14n::canonicalize_id;
use crate::error::Result;
use crate::model::{Reference, ReferenceKind};

static REF_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bREF(?:\(S\)|TELS?|S)?(?:[\s:.]|$)").expect("valid reference start regex")
});
static CLASSIFIED_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)classified\s+by").expect("valid classified-by regex"));
static ENUM_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^|[ \t])\(?([A-Z])[.)][ \t]+").expect("valid enumeration marker regex")
});
static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("valid blank line regex"));
static CABLE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\b([0-9]{4}|[0-9]{2})\s*)?([A-Z]+(?:[ \-][A-Z]+){0,2})\s*([0-9]{1,6})\b")
        .expect("valid cable reference regex")
});
/// A further serial of the same station: `TBILISI 1605 AND 1352`.
static SERIAL_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*(?:,|&|AND\b)[ \t]*([0-9]{1,6})\b").expect("valid serial continuation regex")
});
static EMAIL_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("valid email regex")
});
static BOOK_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ISBN(?:-1[03])?:?\s*([0-9][0-9\- ]{8,15}[0-9Xx])").expect("valid isbn regex")
});
static QUOTED_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*[,:\-]?\s*["“]([^"”\n]+)["”]"#).expect("valid quoted title regex")
});

const MONTHS: [&str; 24] = [
    "JAN", "JANUARY", "FEB", "FEBRUARY", "MAR", "MARCH", "APR", "APRIL", "MAY", "JUN", "JUNE",
    "JUL", "JULY", "AUG", "AUGUST", "SEP", "SEPT", "SEPTEMBER", "OCT", "OCTOBER", "NOV",
    "NOVEMBER", "DEC", "DECEMBER",
];

/// Words that precede or surround a cited cable but never name a station.
const NON_PLACE_WORDS: [&str; 32] = [
    "REF", "REFS", "REFTEL", "REFTELS", "TEL", "TELS", "CABLE", "NOTAL", "PARA", "PARAS",
    "PARAGRAPH", "PAGE", "SECTION", "NO", "NUMBER", "AND", "OR", "OF", "THE", "SEE", "ALSO",
    "IN", "ON", "FROM", "TO", "AT", "BY", "FOR", "DATED", "EMAIL", "MEMO", "LETTER",
];

const PLACE_LENGTH: Range<usize> = 3..26;

/// Extracts cited cables, e-mails and books, in the order they are listed.
///
/// `year` is the four-digit year of the citing cable; it fills in citations
/// that carry no year of their own.
pub fn parse_references(
    text: &str,
    year: i32,
    options: &ExtractOptions<'_>,
) -> Result<Vec<Reference>> {
    let Some(start) = REF_START.find(text).map(|m| m.start()) else {
        return Ok(Vec::new());
    };

    let span = reference_span(&text[start..]);
    let bullets = enumeration_markers(span);
    let default_year = format!("{:02}", year.rem_euclid(100));

    let mut found = Vec::<(usize, Reference)>::new();
    let mut claimed = Vec::<Range<usize>>::new();

    for m in EMAIL_REF.find_iter(span) {
        claimed.push(m.range());
        found.push((
            m.start(),
            Reference {
                value: m.as_str().to_lowercase(),
                kind: ReferenceKind::Email,
                bullet: bullet_at(&bullets, m.start()),
                title: None,
            },
        ));
    }

    for captures in BOOK_REF.captures_iter(span) {
        let (Some(whole), Some(isbn)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        claimed.push(whole.range());
        found.push((
            whole.start(),
            Reference {
                value: isbn.as_str().replace([' ', '-'], "").to_uppercase(),
                kind: ReferenceKind::Book,
                bullet: bullet_at(&bullets, whole.start()),
                title: title_after(span, whole.end(), &bullets),
            },
        ));
    }

    for captures in CABLE_REF.captures_iter(span) {
        let (Some(whole), Some(place), Some(serial)) =
            (captures.get(0), captures.get(2), captures.get(3))
        else {
            continue;
        };
        if claimed.iter().any(|range| range.start < whole.end() && whole.start() < range.end) {
            continue;
        }

        let Some(place) = place_name(place.as_str()) else {
            debug!(candidate = %whole.as_str(), "rejected reference candidate");
            continue;
        };
        let year = captures
            .get(1)
            .and_then(|y| two_digit_year(y.as_str()))
            .unwrap_or_else(|| default_year.clone());
        found.push((
            whole.start(),
            cable_reference(span, &bullets, &year, &place, serial.as_str(), whole.end()),
        ));

        let mut cursor = whole.end();
        while let Some(next) = SERIAL_CONTINUATION
            .captures(&span[cursor..])
            .and_then(|captures| captures.get(1))
        {
            let start = cursor + next.start();
            // A number opening a citation of its own is a year, not a serial.
            if CABLE_REF
                .find_at(span, start)
                .is_some_and(|citation| citation.start() == start)
            {
                break;
            }
            cursor += next.end();
            found.push((
                start,
                cable_reference(span, &bullets, &year, &place, next.as_str(), cursor),
            ));
        }
    }

    found.sort_by_key(|(offset, _)| *offset);

    let own_id = options.reference_id.map(canonicalize_id);
    let mut references = Vec::<Reference>::new();
    for (_, reference) in found {
        if own_id.as_deref() == Some(reference.value.as_str()) {
            continue;
        }
        if references.iter().any(|seen| seen.value == reference.value) {
            continue;
        }
        references.push(reference);
    }
    Ok(references)
}

fn cable_reference(
    span: &str,
    bullets: &[(usize, char)],
    year: &str,
    place: &str,
    serial: &str,
    end: usize,
) -> Reference {
    let serial = serial.trim_start_matches('0');
    let serial = if serial.is_empty() { "0" } else { serial };
    Reference {
        value: canonicalize_id(&format!("{year}{place}{serial}")),
        kind: ReferenceKind::Cable,
        bullet: bullet_at(bullets, end),
        title: title_after(span, end, bullets),
    }
}

/// Cuts the text starting at the REF marker down to the reference block.
///
/// The block is bounded by a "Classified By" marker or the scan limit, and
/// ends with the line of the last enumerated item (or the first blank line
/// when nothing is enumerated).
fn reference_span(text: &str) -> &str {
    let mut ceiling = text.len().min(HEADER_SCAN_LIMIT);
    while !text.is_char_boundary(ceiling) {
        ceiling -= 1;
    }
    if let Some(classified) = CLASSIFIED_BY.find(&text[..ceiling]) {
        ceiling = classified.start();
    }
    let window = &text[..ceiling];

    let markers = enumeration_markers(window);
    let end = match markers.last() {
        Some((offset, _)) => window[*offset..]
            .find('\n')
            .map(|line_end| offset + line_end)
            .unwrap_or(window.len()),
        None => BLANK_LINE
            .find(window)
            .map(|m| m.start())
            .unwrap_or(window.len()),
    };
    &window[..end]
}

/// Enumeration markers `A.`, `B)`, ... accepted only in alphabetical sequence.
fn enumeration_markers(text: &str) -> Vec<(usize, char)> {
    let mut markers = Vec::new();
    let mut expected = 'A';
    for captures in ENUM_MARKER.captures_iter(text) {
        let Some(letter) = captures.get(1) else {
            continue;
        };
        let Some(bullet) = letter.as_str().chars().next() else {
            continue;
        };
        if bullet == expected {
            markers.push((letter.start(), bullet));
            expected = char::from(expected as u8 + 1);
        }
    }
    markers
}

fn bullet_at(markers: &[(usize, char)], offset: usize) -> Option<String> {
    markers
        .iter()
        .take_while(|(start, _)| *start <= offset)
        .last()
        .map(|(_, bullet)| bullet.to_string())
}

fn title_after(span: &str, offset: usize, markers: &[(usize, char)]) -> Option<String> {
    let limit = markers
        .iter()
        .map(|(start, _)| *start)
        .find(|start| *start > offset)
        .unwrap_or(span.len());
    QUOTED_TITLE
        .captures(&span[offset..limit])
        .and_then(|captures| captures.get(1))
        .map(|title| title.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Validates a place-name candidate and joins its words.
fn place_name(candidate: &str) -> Option<String> {
    let is_noise = |word: &str| {
        word.len() == 1 || MONTHS.contains(&word) || NON_PLACE_WORDS.contains(&word)
    };

    let words = candidate
        .split([' ', '-'])
        .filter(|word| !word.is_empty())
        .skip_while(|word| is_noise(word))
        .collect::<Vec<_>>();
    if words.is_empty() || words.iter().any(|word| is_noise(word)) {
        return None;
    }

    let place = words.concat();
    PLACE_LENGTH.contains(&place.len()).then_some(place)
}

fn two_digit_year(raw: &str) -> Option<String> {
    match raw.len() {
        2 => Some(raw.to_string()),
        4 => {
            let year = raw.parse::<u32>().ok()?;
            (1960..2040).contains(&year).then(|| format!("{:02}", year % 100))
        }
        _ => None,
    }
}
