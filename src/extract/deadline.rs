use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};
use tracing::debug;

use super::ExtractOptions;
use crate::error::Result;

static DEADLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)E\.?\s?O\.?\s*(?:12958|13526)\s*:?\s*(?:AS\s+AMENDED\s*:?\s*)?",
        r"DECL(?:ASSIFY)?(?:\s+ON)?\s*:?\s*([0-9]{1,2})/([0-9]{1,2})/([0-9]{4}|[0-9]{2})\b",
        r"|\b([0-9]{4})/([0-9]{2})/([0-9]{2})\b",
    ))
    .expect("valid nondisclosure deadline regex")
});

/// Returns the declassification date as `YYYY-MM-DD`, if the cable has one.
pub fn parse_nondisclosure_deadline(
    content: &str,
    options: &ExtractOptions<'_>,
) -> Result<Option<String>> {
    for captures in DEADLINE.captures_iter(content) {
        match deadline_from(&captures) {
            Some(date) => return Ok(Some(date.format("%Y-%m-%d").to_string())),
            None => debug!(
                reference_id = %options.reference_label(),
                candidate = %&captures[0],
                "skipping invalid declassification date"
            ),
        }
    }
    Ok(None)
}

fn deadline_from(captures: &Captures<'_>) -> Option<NaiveDate> {
    let number = |index: usize| -> Option<u32> { captures.get(index)?.as_str().parse().ok() };

    let (year, month, day) = if captures.get(1).is_some() {
        (captures.get(3)?.as_str(), number(1)?, number(2)?)
    } else {
        (captures.get(4)?.as_str(), number(5)?, number(6)?)
    };

    let year = match year.len() {
        2 => 2000 + year.parse::<i32>().ok()?,
        _ => year.parse::<i32>().ok()?,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}
