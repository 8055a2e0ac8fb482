use std::sync::LazyLock;

use regex::Regex;

use super::{ExtractOptions, collapse_whitespace};
use crate::c14n::canonicalize_signer;
use crate::error::Result;

static CLASSIFIED_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)classified\s+by\s*:?[ \t]*([^\n]*)").expect("valid classified by regex")
});
static REASON_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfor\s+reasons?\b|\breasons?\b|\(|\b1\.[45]\b|\bE\.\s?O\.")
        .expect("valid reason clause regex")
});
static NAME_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*[,;]\s*|\s+and\s+").expect("valid name separator regex"));

static SIGNER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Z'\-]+\.?(?:(?:\s*[,/]\s*|\s+AND\s+)[A-Z][A-Z'\-]+\.?)*$")
        .expect("valid signer line regex")
});
static SIGNER_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[,/]\s*|\s+AND\s+").expect("valid signer separator regex"));

/// Lower-cased words that describe a role rather than name a person.
const TITLE_WORDS: [&str; 30] = [
    "ambassador", "acting", "charge", "d'affaires", "a.i.", "cda", "dcm", "polcouns",
    "polcounselor", "poloff", "econoff", "counselor", "political", "economic", "officer",
    "chief", "deputy", "consul", "general", "principal", "director", "minister", "secretary",
    "section", "mission", "head", "of", "the", "amb.", "ambassador.",
];

const NOT_SIGNERS: [&str; 7] = ["SIPDIS", "NOFORN", "UNCLAS", "CONFIDENTIAL", "SECRET", "END", "COMMENT"];

/// Collects the officials named on `Classified By:` lines, in order of
/// appearance, without their titles.
pub fn parse_classificationists(
    content: &str,
    options: &ExtractOptions<'_>,
) -> Result<Vec<String>> {
    let mut names = Vec::<String>::new();

    for captures in CLASSIFIED_BY.captures_iter(content) {
        let line = &captures[1];
        let line = match REASON_CLAUSE.find(line) {
            Some(reason) => &line[..reason.start()],
            None => line,
        };

        for part in NAME_SEPARATOR.split(line) {
            let Some(name) = person_name(part) else {
                continue;
            };
            let name = if options.normalize_names {
                normalize_name(&name)
            } else {
                name
            };
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    Ok(names)
}

fn person_name(part: &str) -> Option<String> {
    let words: Vec<&str> = part
        .split_whitespace()
        .map(|word| word.trim_end_matches(','))
        .filter(|word| !word.contains('/'))
        .filter(|word| !TITLE_WORDS.contains(&word.to_lowercase().as_str()))
        .collect();

    let is_name = (1..=5).contains(&words.len())
        && words
            .iter()
            .all(|word| word.starts_with(|c: char| c.is_uppercase()));
    if !is_name {
        return None;
    }
    let name = collapse_whitespace(&words.join(" "));
    Some(name.trim_end_matches('.').to_string()).filter(|name| !name.is_empty())
}

/// Title-cases words written entirely in capitals; mixed-case words are left alone.
fn normalize_name(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let letters = word.chars().filter(|c| c.is_alphabetic()).count();
            let shouting = letters > 1 && !word.chars().any(|c| c.is_lowercase());
            if !shouting {
                return word.to_string();
            }
            let mut titled = String::with_capacity(word.len());
            let mut start_of_part = true;
            for c in word.chars() {
                if start_of_part {
                    titled.extend(c.to_uppercase());
                } else {
                    titled.extend(c.to_lowercase());
                }
                start_of_part = !c.is_alphabetic();
            }
            titled
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reads the signature line that closes a cable body (`CLINTON`,
/// `RICE/BOLTON`). A body that does not end in one has no signers.
pub fn parse_signers(content: &str) -> Vec<String> {
    let Some(last_line) = content.lines().rev().map(str::trim).find(|line| {
        !line.is_empty() && *line != "BT" && *line != "NNNN" && !line.starts_with('#')
    }) else {
        return Vec::new();
    };

    if !SIGNER_LINE.is_match(last_line) {
        return Vec::new();
    }

    let names: Vec<&str> = SIGNER_SEPARATOR
        .split(last_line)
        .map(|name| name.trim_end_matches('.'))
        .collect();
    if names.iter().any(|name| NOT_SIGNERS.contains(name)) {
        return Vec::new();
    }

    let mut signers = Vec::<String>::new();
    for name in names {
        let signer = canonicalize_signer(name);
        if !signers.contains(&signer) {
            signers.push(signer);
        }
    }
    signers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classificationists(text: &str) -> Vec<String> {
        parse_classificationists(text, &ExtractOptions::default()).unwrap()
    }

    #[test]
    fn titles_and_reasons_are_dropped() {
        let text = "Classified By: Ambassador Louis B. Susman, reasons 1.4 (b) and (d)";
        assert_eq!(classificationists(text), vec!["Louis B. Susman"]);

        let text = "Classified By: DCM Richard LeBaron for reasons 1.4 (b/d)";
        assert_eq!(classificationists(text), vec!["Richard LeBaron"]);
    }

    #[test]
    fn several_officials_and_lines() {
        let text = "Classified By: PolCouns Jane Roe and A/DCM John Doe, Reason 1.4(d)\n\
                    text\nClassified by: Jane Roe for reasons 1.4 (b)";
        assert_eq!(classificationists(text), vec!["Jane Roe", "John Doe"]);
    }

    #[test]
    fn capitalised_names_are_normalised_on_request() {
        let text = "CLASSIFIED BY: AMBASSADOR JOHN O'BRIEN, REASON 1.4 (D)";
        assert_eq!(classificationists(text), vec!["John O'Brien"]);

        let raw = ExtractOptions {
            normalize_names: false,
            ..ExtractOptions::default()
        };
        assert_eq!(
            parse_classificationists(text, &raw).unwrap(),
            vec!["JOHN O'BRIEN"]
        );
    }

    #[test]
    fn no_classified_by_line() {
        assert!(classificationists("UNCLAS SECTION 01 OF 02").is_empty());
    }

    #[test]
    fn signature_line_closes_the_body() {
        assert_eq!(parse_signers("9. (C) Comment ends.\n\nSUSMAN\n"), vec!["SUSMAN"]);
        assert_eq!(parse_signers("text\nRICE/BOLTON\nBT\n#2803\nNNNN"), vec!["RICE", "BOLTON"]);
        assert_eq!(parse_signers("text\n\nCLINTION"), vec!["CLINTON"]);
        assert_eq!(parse_signers("text\n\nNEGREPONTE."), vec!["NEGROPONTE"]);
    }

    #[test]
    fn non_signature_endings() {
        assert!(parse_signers("text\nEND COMMENT.").is_empty());
        assert!(parse_signers("text\nSIPDIS").is_empty());
        assert!(parse_signers("He will travel tomorrow.").is_empty());
        assert!(parse_signers("").is_empty());
    }
}
