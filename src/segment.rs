//! Splits a cable page into its header and content text, and the content
//! into a header zone and a body zone.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CableError, Result};

static PRE_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<code><pre>(.*?)</pre></code>").expect("valid pre region regex")
});
static PILCROW_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<a[^>]*>(?:¶|&para;|&#182;)[0-9]*</a>[ \t]*").expect("valid pilcrow anchor regex")
});
static ANCHOR_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?a\b[^>]*>").expect("valid anchor tag regex"));
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid html tag regex"));

static CLASSIFIED_BY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)classified\s+by[^\n]*").expect("valid classified-by regex")
});
static SUMMARY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:BEGIN\s+)?SUMMARY").expect("valid summary marker regex"));

const FIRST_PARAGRAPH: &str = "\n1. ";

const NEWLINE_ENTITIES: [&str; 3] = ["&#x000A;", "&#x000a;", "&#10;"];
const NAMED_ENTITIES: [(&str, &str); 6] = [
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&amp;", "&"),
];

/// Returns `(header_text, content_text)` of a cable page.
///
/// With two `<code><pre>` regions the first is the header and the second the
/// content; with one, the header is empty. Any other count is structural.
pub fn split_html(html: &str) -> Result<(String, String)> {
    let regions = PRE_REGION
        .captures_iter(html)
        .filter_map(|captures| captures.get(1).map(|m| m.as_str()))
        .collect::<Vec<_>>();

    match regions.as_slice() {
        [content] => Ok((String::new(), clean_html(content))),
        [header, content] => Ok((clean_html(header), clean_html(content))),
        _ => Err(CableError::Structural(format!(
            "expected one or two <code><pre> regions, found {}",
            regions.len()
        ))),
    }
}

pub fn header_text(html: &str) -> Result<String> {
    split_html(html).map(|(header, _)| header)
}

pub fn content_text(html: &str) -> Result<String> {
    split_html(html).map(|(_, content)| content)
}

/// Turns a `<pre>` region into plain text.
pub fn clean_html(raw: &str) -> String {
    let mut text = raw.to_string();
    for entity in NEWLINE_ENTITIES {
        text = text.replace(entity, "\n");
    }

    let text = PILCROW_ANCHOR.replace_all(&text, "");
    let text = ANCHOR_TAG.replace_all(&text, "");
    let mut text = HTML_TAG.replace_all(&text, "").into_owned();

    for (entity, replacement) in NAMED_ENTITIES {
        text = text.replace(entity, replacement);
    }
    text
}

/// Byte offset where the content's header zone ends and its body begins.
///
/// The split never precedes the end of the "Classified By" line and sits at
/// the earlier of the first summary marker and the first `1. ` paragraph.
pub fn content_split_offset(content: &str) -> Option<usize> {
    let floor = CLASSIFIED_BY_LINE
        .find(content)
        .map(|m| m.end())
        .unwrap_or(0);
    let summary = SUMMARY_MARKER.find(content).map(|m| m.start());
    let paragraph = content.find(FIRST_PARAGRAPH);

    let marker = match (summary, paragraph) {
        (Some(summary), Some(paragraph)) => summary.min(paragraph),
        (Some(offset), None) | (None, Some(offset)) => offset,
        (None, None) => return None,
    };

    let offset = floor.max(marker);
    if offset == 0 {
        return None;
    }
    Some(offset)
}

/// Splits the content into `(header_zone, body_zone)`.
pub fn split_content(content: &str) -> Option<(&str, &str)> {
    content_split_offset(content).map(|offset| content.split_at(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_regions_yield_header_and_content() {
        let html = "<p>x</p><code><pre>VZCZCXRO1234&#x000A;PP RUEHC</pre></code>\
                    <code><pre>SUBJECT: TEST&#x000A;&#x000A;1. Body</pre></code>";
        let (header, content) = split_html(html).unwrap();
        assert_eq!(header, "VZCZCXRO1234\nPP RUEHC");
        assert_eq!(content, "SUBJECT: TEST\n\n1. Body");
    }

    #[test]
    fn single_region_has_empty_header() {
        let html = "<code><pre>only content</pre></code>";
        assert_eq!(header_text(html).unwrap(), "");
        assert_eq!(content_text(html).unwrap(), "only content");
    }

    #[test]
    fn zero_or_three_regions_are_structural_errors() {
        assert!(matches!(
            split_html("<html></html>"),
            Err(CableError::Structural(_))
        ));
        let three = "<code><pre>a</pre></code>".repeat(3);
        assert!(matches!(split_html(&three), Err(CableError::Structural(_))));
    }

    #[test]
    fn cleanup_drops_pilcrows_anchors_and_tags() {
        let raw = "<a class='coders' name='par1' href='#par1'>¶1</a> 1. See \
                   <a href='/cable/2009/12/09LONDON2803.html'>LONDON 2803</a> &amp; <b>more</b>";
        assert_eq!(clean_html(raw), "1. See LONDON 2803 & more");
    }

    #[test]
    fn split_prefers_earliest_marker_after_classified_by() {
        let content = "SUBJECT: X\nClassified By: Ambassador Jane Doe\n\n\
                       SUMMARY: short.\n1. Body";
        let (header, body) = split_content(content).unwrap();
        assert!(header.ends_with("Jane Doe\n\n"));
        assert!(body.starts_with("SUMMARY"));
    }

    #[test]
    fn split_never_precedes_classified_by_line() {
        let content = "SUMMARY OF TALKS\nClassified By: DCM John Smith\n1. Body";
        let offset = content_split_offset(content).unwrap();
        assert_eq!(&content[offset..], "\n1. Body");
    }

    #[test]
    fn split_uses_paragraph_marker_without_summary() {
        let content = "SUBJECT: X\n\n1. First paragraph";
        let (header, body) = split_content(content).unwrap();
        assert_eq!(header, "SUBJECT: X\n");
        assert_eq!(body, "\n1. First paragraph");
    }

    #[test]
    fn no_marker_means_no_split() {
        assert_eq!(split_content("SUBJECT: X\nClassified By: A B\nplain text"), None);
    }
}
