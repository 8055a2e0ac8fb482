//! The cable aggregate: raw text plus lazily extracted, memoized fields.

use std::cell::OnceCell;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::c14n::canonicalize_id;
use crate::config::{CableConfig, CableOptions};
use crate::error::{CableError, Result};
use crate::extract::{self, ExtractOptions};
use crate::meta::{CableMetadata, parse_metadata};
use crate::model::{Recipient, Reference};
use crate::segment::{content_split_offset, split_html};


/// Marker line WikiLeaks put into the header of cables released only in part.
pub const PARTIAL_MARKER: &str = "This record is a partial extract of the original cable";

/// One cable page, parsed.
///
/// The raw fields are fixed at construction. Every derived field is computed
/// on first access and cached; failed extractions are not cached, so a
/// strict caller sees the same error on every access.
#[derive(Debug)]
pub struct Cable {
    reference_id: String,
    origin: String,
    created: String,
    released: String,
    classification: Vec<String>,
    header: String,
    content: String,
    options: CableOptions,
    config: Arc<CableConfig>,

    canonical_id: OnceCell<String>,
    partial: OnceCell<bool>,
    split_offset: OnceCell<Option<usize>>,
    subject: OnceCell<Option<String>>,
    tags: OnceCell<Vec<String>>,
    summary: OnceCell<Option<String>>,
    references: OnceCell<Vec<Reference>>,
    recipients: OnceCell<Vec<Recipient>>,
    info_recipients: OnceCell<Vec<Recipient>>,
    transmission_id: OnceCell<Option<String>>,
    nondisclosure_deadline: OnceCell<Option<String>>,
    signers: OnceCell<Vec<String>>,
    classificationists: OnceCell<Vec<String>>,
}

/// Which fields [`Cable::to_record`] carries.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RecordMode {
    Full,
    /// Drops `header` and `body`; `summary` only when asked for.
    MetadataOnly { include_summary: bool },
}

/// Serializable snapshot of a cable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CableRecord {
    pub identifier: String,
    pub canonical_identifier: String,
    pub created: String,
    pub released: String,
    pub origin: String,
    pub classification: Vec<String>,
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub tags: Vec<String>,
    pub references: Vec<Reference>,
    pub recipients: Vec<Recipient>,
    pub info_recipients: Vec<Recipient>,
    pub transmission_id: Option<String>,
    pub nondisclosure_deadline: Option<String>,
    pub partial: bool,
    pub signers: Vec<String>,
    pub classificationists: Vec<String>,
}

fn memoize<'a, T>(cell: &'a OnceCell<T>, init: impl FnOnce() -> Result<T>) -> Result<&'a T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = init()?;
    Ok(cell.get_or_init(|| value))
}

impl Cable {
    /// Parses a cable page. Without `reference_id` the id from the metadata
    /// table is used.
    pub fn from_html(
        html: &str,
        reference_id: Option<&str>,
        config: Arc<CableConfig>,
        options: CableOptions,
    ) -> Result<Self> {
        let mut metadata = parse_metadata(html)?;
        if let Some(reference_id) = reference_id {
            metadata.reference_id = reference_id.to_string();
        }
        let (header, content) = split_html(html)?;
        Self::from_parts(metadata, header, content, config, options)
    }

    /// Builds a cable from already segmented text.
    pub fn from_parts(
        metadata: CableMetadata,
        header: String,
        content: String,
        config: Arc<CableConfig>,
        options: CableOptions,
    ) -> Result<Self> {
        if metadata.reference_id.trim().is_empty() {
            return Err(CableError::Structural(
                "cable has an empty reference id".to_string(),
            ));
        }

        debug!(
            reference_id = %metadata.reference_id,
            header_len = header.len(),
            content_len = content.len(),
            "cable constructed"
        );

        Ok(Self {
            reference_id: metadata.reference_id,
            origin: metadata.origin,
            created: metadata.created,
            released: metadata.released,
            classification: metadata.classification,
            header,
            content,
            options,
            config,
            canonical_id: OnceCell::new(),
            partial: OnceCell::new(),
            split_offset: OnceCell::new(),
            subject: OnceCell::new(),
            tags: OnceCell::new(),
            summary: OnceCell::new(),
            references: OnceCell::new(),
            recipients: OnceCell::new(),
            info_recipients: OnceCell::new(),
            transmission_id: OnceCell::new(),
            nondisclosure_deadline: OnceCell::new(),
            signers: OnceCell::new(),
            classificationists: OnceCell::new(),
        })
    }

    pub fn reference_id(&self) -> &str {
        &self.reference_id
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn created(&self) -> &str {
        &self.created
    }

    pub fn released(&self) -> &str {
        &self.released
    }

    pub fn classification(&self) -> &[String] {
        &self.classification
    }

    /// Text of the routing header (`<pre>` region before the content).
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn options(&self) -> CableOptions {
        self.options
    }

    pub fn canonical_id(&self) -> &str {
        self.canonical_id
            .get_or_init(|| canonicalize_id(&self.reference_id))
    }

    pub fn is_partial(&self) -> bool {
        *self
            .partial
            .get_or_init(|| self.header.contains(PARTIAL_MARKER))
    }

    fn split_offset(&self) -> Option<usize> {
        *self
            .split_offset
            .get_or_init(|| content_split_offset(&self.content))
    }

    /// Preamble of the content (classification banner, TAGS, SUBJECT, REF).
    pub fn content_header(&self) -> Option<&str> {
        self.split_offset().map(|offset| &self.content[..offset])
    }

    pub fn content_body(&self) -> Option<&str> {
        self.split_offset().map(|offset| &self.content[offset..])
    }

    /// The content header, or the whole content when it cannot be split.
    fn header_zone(&self) -> &str {
        self.content_header().unwrap_or(&self.content)
    }

    fn extract_options(&self) -> ExtractOptions<'_> {
        ExtractOptions::from_cable_options(self.options)
            .with_reference_id(&self.reference_id)
            .with_exceptions(&self.config.exceptions)
    }

    /// Four-digit year the cable was written in.
    fn year(&self) -> i32 {
        let from_created = self.created.get(..4).and_then(|year| year.parse().ok());
        let from_id = || {
            self.reference_id
                .get(..2)
                .and_then(|year| year.parse::<i32>().ok())
                .map(|year| 2000 + year)
        };
        from_created.or_else(from_id).unwrap_or(2000)
    }

    pub fn subject(&self) -> Result<Option<&str>> {
        memoize(&self.subject, || {
            extract::parse_subject(self.header_zone(), &self.extract_options())
        })
        .map(Option::as_deref)
    }

    pub fn tags(&self) -> Result<&[String]> {
        memoize(&self.tags, || {
            extract::parse_tags(self.header_zone(), &self.extract_options())
        })
        .map(Vec::as_slice)
    }

    pub fn summary(&self) -> Result<Option<&str>> {
        memoize(&self.summary, || {
            extract::parse_summary(&self.content, &self.extract_options())
        })
        .map(Option::as_deref)
    }

    pub fn references(&self) -> Result<&[Reference]> {
        memoize(&self.references, || {
            extract::parse_references(self.header_zone(), self.year(), &self.extract_options())
        })
        .map(Vec::as_slice)
    }

    /// Always `None` for partial cables.
    pub fn transmission_id(&self) -> Result<Option<&str>> {
        memoize(&self.transmission_id, || {
            if self.is_partial() {
                return Ok(None);
            }
            extract::parse_transmission_id(&self.header, &self.config, &self.extract_options())
        })
        .map(Option::as_deref)
    }

    /// Always empty for partial cables.
    pub fn recipients(&self) -> Result<&[Recipient]> {
        memoize(&self.recipients, || {
            if self.is_partial() {
                return Ok(Vec::new());
            }
            extract::parse_recipients(&self.header, &self.config, &self.extract_options())
        })
        .map(Vec::as_slice)
    }

    pub fn info_recipients(&self) -> Result<&[Recipient]> {
        memoize(&self.info_recipients, || {
            extract::parse_info_recipients(&self.header, &self.config, &self.extract_options())
        })
        .map(Vec::as_slice)
    }

    pub fn nondisclosure_deadline(&self) -> Result<Option<&str>> {
        memoize(&self.nondisclosure_deadline, || {
            extract::parse_nondisclosure_deadline(&self.content, &self.extract_options())
        })
        .map(Option::as_deref)
    }

    pub fn signers(&self) -> &[String] {
        self.signers
            .get_or_init(|| extract::parse_signers(&self.content))
    }

    pub fn classificationists(&self) -> Result<&[String]> {
        memoize(&self.classificationists, || {
            extract::parse_classificationists(&self.content, &self.extract_options())
        })
        .map(Vec::as_slice)
    }

    /// Runs every extractor and collects the results.
    pub fn to_record(&self, mode: RecordMode) -> Result<CableRecord> {
        let (summary, header, body) = match mode {
            RecordMode::Full => (
                Some(self.summary()?.map(str::to_string)),
                Some(self.header.clone()),
                Some(self.content.clone()),
            ),
            RecordMode::MetadataOnly { include_summary } => {
                let summary = if include_summary {
                    Some(self.summary()?.map(str::to_string))
                } else {
                    None
                };
                (summary, None, None)
            }
        };

        Ok(CableRecord {
            identifier: self.reference_id.clone(),
            canonical_identifier: self.canonical_id().to_string(),
            created: self.created.clone(),
            released: self.released.clone(),
            origin: self.origin.clone(),
            classification: self.classification.clone(),
            subject: self.subject()?.map(str::to_string),
            summary,
            header,
            body,
            tags: self.tags()?.to_vec(),
            references: self.references()?.to_vec(),
            recipients: self.recipients()?.to_vec(),
            info_recipients: self.info_recipients()?.to_vec(),
            transmission_id: self.transmission_id()?.map(str::to_string),
            nondisclosure_deadline: self.nondisclosure_deadline()?.map(str::to_string),
            partial: self.is_partial(),
            signers: self.signers().to_vec(),
            classificationists: self.classificationists()?.to_vec(),
        })
    }
}
