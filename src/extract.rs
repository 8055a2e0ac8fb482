//! Field extractors. Each one is a pure function of the text it is handed
//! plus an [`ExtractOptions`] carrying the cable id and error policy.

mod deadline;
mod recipients;
mod references;
mod signers;
mod subject;
mod summary;
mod tags;
mod transmission;

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::{CableOptions, Exceptions};
use crate::error::{CableError, Field, Result};

pub use deadline::parse_nondisclosure_deadline;
pub use recipients::{parse_info_recipients, parse_recipients};
pub use references::parse_references;
pub use signers::{parse_classificationists, parse_signers};
pub use subject::parse_subject;
pub use summary::parse_summary;
pub use tags::parse_tags;
pub use transmission::parse_transmission_id;

/// Heuristic searches for subject, tags and references stop here.
pub const HEADER_SCAN_LIMIT: usize = 1200;

/// Paragraph classification marker such as `(C)` or `(S/NF)`.
pub(crate) const CLASSIFICATION_CODE: &str =
    r"\((?:U|C|S|TS|SBU|FOUO|NF|[CSU]\s*/{1,2}\s*(?:NF|NOFORN|SBU|FOUO|REL))\)";

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

#[derive(Copy, Clone, Debug)]
pub struct ExtractOptions<'a> {
    pub reference_id: Option<&'a str>,
    pub ignore_errors: bool,
    pub clean_subject: bool,
    pub normalize_names: bool,
    pub exceptions: Option<&'a Exceptions>,
}

impl Default for ExtractOptions<'_> {
    fn default() -> Self {
        Self::from_cable_options(CableOptions::default())
    }
}

impl<'a> ExtractOptions<'a> {
    pub fn from_cable_options(options: CableOptions) -> Self {
        Self {
            reference_id: None,
            ignore_errors: options.ignore_errors,
            clean_subject: options.clean_subject,
            normalize_names: options.normalize_names,
            exceptions: None,
        }
    }

    pub fn with_reference_id(mut self, reference_id: &'a str) -> Self {
        self.reference_id = Some(reference_id);
        self
    }

    pub fn with_exceptions(mut self, exceptions: &'a Exceptions) -> Self {
        self.exceptions = Some(exceptions);
        self
    }

    pub fn ignoring_errors(mut self) -> Self {
        self.ignore_errors = true;
        self
    }

    pub(crate) fn reference_label(&self) -> &str {
        self.reference_id.unwrap_or("<unknown>")
    }

    fn is_excepted(&self, field: Field) -> bool {
        match (self.exceptions, self.reference_id) {
            (Some(exceptions), Some(reference_id)) => exceptions.allows(field, reference_id),
            _ => false,
        }
    }

    /// Applies the error policy to a field that matched nothing.
    pub(crate) fn missing<T: Default>(&self, field: Field) -> Result<T> {
        if self.is_excepted(field) {
            debug!(reference_id = %self.reference_label(), field = %field, "field absent on known exception");
            return Ok(T::default());
        }
        if self.ignore_errors {
            warn!(reference_id = %self.reference_label(), field = %field, "field not found, ignoring");
            return Ok(T::default());
        }
        Err(CableError::FieldNotFound {
            field,
            reference_id: self.reference_label().to_string(),
        })
    }

    /// Applies the error policy to a field that matched but is unusable.
    pub(crate) fn malformed<T>(&self, field: Field, detail: String, fallback: T) -> Result<T> {
        if self.is_excepted(field) || self.ignore_errors {
            warn!(reference_id = %self.reference_label(), field = %field, detail = %detail, "malformed field, ignoring");
            return Ok(fallback);
        }
        Err(CableError::MalformedField {
            field,
            reference_id: self.reference_label().to_string(),
            detail,
        })
    }
}

/// The first [`HEADER_SCAN_LIMIT`] bytes of `text`, cut on a char boundary.
pub(crate) fn scan_window(text: &str) -> &str {
    if text.len() <= HEADER_SCAN_LIMIT {
        return text;
    }
    let mut end = HEADER_SCAN_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_window_respects_char_boundaries() {
        let text = format!("{}é tail", "a".repeat(HEADER_SCAN_LIMIT - 1));
        let window = scan_window(&text);
        assert_eq!(window.len(), HEADER_SCAN_LIMIT - 1);
        assert_eq!(scan_window("short"), "short");
    }

    #[test]
    fn missing_field_policy() {
        let mut exceptions = Exceptions::default();
        exceptions.without_tags.insert("06BRASILIA1".to_string());

        let strict = ExtractOptions::default().with_reference_id("06BRASILIA1");
        assert!(matches!(
            strict.missing::<Vec<String>>(Field::Tags),
            Err(CableError::FieldNotFound { field: Field::Tags, .. })
        ));

        let excepted = strict.with_exceptions(&exceptions);
        assert_eq!(excepted.missing::<Vec<String>>(Field::Tags).unwrap(), Vec::<String>::new());

        let lenient = ExtractOptions::default().ignoring_errors();
        assert_eq!(lenient.missing::<Option<String>>(Field::Subject).unwrap(), None);
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(collapse_whitespace("  A \n\n B\tC  "), "A B C");
    }
}
