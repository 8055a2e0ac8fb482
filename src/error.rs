use std::fmt;
use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CableError>;

/// Names one field extractor; used in errors, logs and exception lists.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Field {
    Subject,
    Tags,
    Summary,
    References,
    Recipients,
    InfoRecipients,
    TransmissionId,
    NondisclosureDeadline,
    Signers,
    Classificationists,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Tags => "tags",
            Self::Summary => "summary",
            Self::References => "references",
            Self::Recipients => "recipients",
            Self::InfoRecipients => "info_recipients",
            Self::TransmissionId => "transmission_id",
            Self::NondisclosureDeadline => "nondisclosure_deadline",
            Self::Signers => "signers",
            Self::Classificationists => "classificationists",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum CableError {
    /// The page does not have the expected shape. Never suppressed.
    #[error("structural error: {0}")]
    Structural(String),

    #[error("{field} not found in cable {reference_id}")]
    FieldNotFound { field: Field, reference_id: String },

    #[error("malformed {field} in cable {reference_id}: {detail}")]
    MalformedField {
        field: Field,
        reference_id: String,
        detail: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CableError {
    /// True for errors an `ignore_errors` caller may turn into an empty result.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FieldNotFound { .. } | Self::MalformedField { .. }
        )
    }
}

impl From<serde_json::Error> for CableError {
    fn from(e: serde_json::Error) -> Self {
        CableError::Config(e.to_string())
    }
}
