use std::sync::LazyLock;

use regex::Regex;

use super::ExtractOptions;
use crate::config::CableConfig;
use crate::error::{Field, Result};

static TRANSMISSION_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A\s*(?:Cable Text:\s*)?([A-Z]+[0-9]+)\b").expect("valid transmission id regex")
});

/// Returns the transmission id that opens a cable header (`VZCZCXRO1234`).
pub fn parse_transmission_id(
    header: &str,
    config: &CableConfig,
    options: &ExtractOptions<'_>,
) -> Result<Option<String>> {
    if let Some(fixed) = options
        .reference_id
        .and_then(|reference_id| config.transmission_id_override(reference_id))
    {
        return Ok(Some(fixed.to_string()));
    }

    if header.trim().is_empty() {
        return Ok(None);
    }

    match TRANSMISSION_ID.captures(header) {
        Some(captures) => Ok(Some(captures[1].to_string())),
        None => options.missing(Field::TransmissionId),
    }
}
