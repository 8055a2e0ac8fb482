use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::ExtractOptions;
use crate::config::CableConfig;
use crate::error::{Field, Result};
use crate::model::Recipient;

static RECIPIENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:([A-Z][A-Z0-9]{3,})/)?",
        r"(.+?)",
        r"(?:\s+(NIACT\s+IMMEDIATE|IMMEDIATE|PRIORITY|ROUTINE|NIACT|FLASH))?",
        r"(?:\s+([0-9]{1,6}))?\s*$",
    ))
    .expect("valid recipient line regex")
});

/// Lines that close the routing block of a header.
static BLOCK_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:BT\b|SUBJECT\b|SUBJ\b|E\.?\s?O\.?\s|TAGS?\b|C O N F|S E C R E T|UNCLAS\b",
        r"|CONFIDENTIAL\b|SECRET\b|UNCLASSIFIED\b|FOR OFFICIAL USE|SENSITIVE\b|NNNN|Cable Text)",
    ))
    .expect("valid routing block end regex")
});

const PLACEHOLDERS: [&str; 3] = ["PAGE", "RHMFISS", "RHMFIUU"];

#[derive(Copy, Clone, PartialEq, Eq)]
enum Block {
    To,
    Info,
}

/// Extracts the `TO` addressees of a cable header.
pub fn parse_recipients(
    header: &str,
    config: &CableConfig,
    options: &ExtractOptions<'_>,
) -> Result<Vec<Recipient>> {
    if header.trim().is_empty() {
        return Ok(Vec::new());
    }
    let (to, _, saw_to) = parse_routing(header, config);
    if !saw_to {
        return options.missing(Field::Recipients);
    }
    Ok(to)
}

/// Extracts the `INFO` addressees of a cable header. Absence is not an error.
pub fn parse_info_recipients(
    header: &str,
    config: &CableConfig,
    _options: &ExtractOptions<'_>,
) -> Result<Vec<Recipient>> {
    let (_, info, _) = parse_routing(header, config);
    Ok(info)
}

fn parse_routing(header: &str, config: &CableConfig) -> (Vec<Recipient>, Vec<Recipient>, bool) {
    let mut to = Vec::<Recipient>::new();
    let mut info = Vec::<Recipient>::new();
    let mut block: Option<Block> = None;
    let mut saw_to = false;

    for raw_line in header.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let rest = if let Some(rest) = strip_keyword(line, "TO") {
            block = Some(Block::To);
            saw_to = true;
            rest
        } else if let Some(rest) = strip_keyword(line, "INFO") {
            block = Some(Block::Info);
            rest
        } else if block.is_some() && BLOCK_END.is_match(line) {
            block = None;
            continue;
        } else {
            line
        };

        let Some(current) = block else {
            continue;
        };
        let target = match current {
            Block::To => &mut to,
            Block::Info => &mut info,
        };

        if let Some(station) = strip_keyword(rest, "XMT") {
            match target.last_mut() {
                Some(previous) => previous.excluded.push(collapse(station)),
                None => debug!(station = %station, "XMT line without a preceding recipient"),
            }
            continue;
        }

        if let Some(recipient) = parse_recipient_line(rest, config) {
            target.push(recipient);
        }
    }

    (to, info, saw_to)
}

fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.starts_with(char::is_whitespace).then(|| rest.trim_start())
}

fn parse_recipient_line(line: &str, config: &CableConfig) -> Option<Recipient> {
    let first_token = line.split_whitespace().next()?;
    if PLACEHOLDERS.contains(&first_token) && !line.contains('/') {
        return None;
    }

    let captures = RECIPIENT_LINE.captures(line)?;
    let name = collapse(captures.get(2)?.as_str());
    if name.is_empty() || PLACEHOLDERS.contains(&name.as_str()) {
        return None;
    }

    let route = captures
        .get(1)
        .map(|m| m.as_str().to_string())
        .filter(|route| !PLACEHOLDERS.contains(&route.as_str()))
        .or_else(|| config.route_for(&name).map(str::to_string));

    Some(Recipient {
        route,
        name,
        precedence: captures.get(3).map(|m| collapse(m.as_str())),
        mcn: captures.get(4).map(|m| m.as_str().to_string()),
        excluded: Vec::new(),
    })
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
