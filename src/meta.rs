//! The metadata table at the top of a cable page.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{CableError, Result};

static CABLE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<table\s+class=['"]cable['"][^>]*>(.*?)</table>"#)
        .expect("valid cable table regex")
});
static LINKED_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<td[^>]*>\s*<a[^>]*>([^<]*)</a>").expect("valid linked cell regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CableMetadata {
    pub reference_id: String,
    pub created: String,
    pub released: String,
    pub classification: Vec<String>,
    pub origin: String,
}

pub fn parse_metadata(html: &str) -> Result<CableMetadata> {
    let table = CABLE_TABLE
        .captures(html)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| CableError::Structural("metadata table not found".to_string()))?
        .as_str();

    let cells = LINKED_CELL
        .captures_iter(table)
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>();

    let [reference_id, created, released, classification, origin] = cells.as_slice() else {
        return Err(CableError::Structural(format!(
            "metadata table has {} linked cells, expected 5",
            cells.len()
        )));
    };

    for (name, value) in [
        ("reference id", reference_id),
        ("created", created),
        ("released", released),
        ("classification", classification),
        ("origin", origin),
    ] {
        if value.is_empty() {
            return Err(CableError::Structural(format!(
                "metadata table has an empty {name} cell"
            )));
        }
    }

    Ok(CableMetadata {
        reference_id: reference_id.clone(),
        created: created.clone(),
        released: released.clone(),
        classification: parse_classification(classification),
        origin: origin.clone(),
    })
}

/// `SECRET//NOFORN` -> `["SECRET", "NOFORN"]`.
pub fn parse_classification(raw: &str) -> Vec<String> {
    raw.split("//")
        .map(|token| token.trim().to_uppercase())
        .filter(|token| !token.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"<table class="cable">
<tr><th>Reference ID</th><th>Created</th><th>Released</th><th>Classification</th><th>Origin</th></tr>
<tr>
<td><a href="/cable/2009/12/09LONDON2803.html">09LONDON2803</a></td>
<td><a href="/date/2009-12_0.html">2009-12-18 07:07</a></td>
<td><a href="/date/2011-02_0.html">2011-02-04 18:06</a></td>
<td><a href="/classification/SECRET_NOFORN_0.html">SECRET//NOFORN</a></td>
<td><a href="/origin/46_0.html">Embassy London</a></td>
</tr>
</table>"#;

    #[test]
    fn parses_all_five_cells() {
        let meta = parse_metadata(TABLE).unwrap();
        assert_eq!(meta.reference_id, "09LONDON2803");
        assert_eq!(meta.created, "2009-12-18 07:07");
        assert_eq!(meta.released, "2011-02-04 18:06");
        assert_eq!(meta.classification, vec!["SECRET", "NOFORN"]);
        assert_eq!(meta.origin, "Embassy London");
    }

    #[test]
    fn missing_table_is_structural() {
        assert!(matches!(
            parse_metadata("<html><body></body></html>"),
            Err(CableError::Structural(_))
        ));
    }

    #[test]
    fn short_table_is_structural() {
        let html = r#"<table class="cable"><tr><td><a href="x">09LONDON2803</a></td></tr></table>"#;
        assert!(matches!(parse_metadata(html), Err(CableError::Structural(_))));
    }

    #[test]
    fn classification_keeps_multiword_caveats() {
        assert_eq!(
            parse_classification("unclassified//for official use only"),
            vec!["UNCLASSIFIED", "FOR OFFICIAL USE ONLY"]
        );
        assert_eq!(parse_classification("CONFIDENTIAL"), vec!["CONFIDENTIAL"]);
    }
}
