use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CableError, Field, Result};

const BUILTIN_NAME2ROUTE: &str = include_str!("../resources/name2route.json");
const BUILTIN_EXCEPTIONS: &str = include_str!("../resources/exceptions.json");

/// Immutable lookup data shared by every cable of a run.
///
/// Built once (usually from the bundled resources) and handed to cables
/// behind an `Arc`; nothing mutates it afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CableConfig {
    /// Station name (as written in a `TO`/`INFO` line) to routing indicator.
    #[serde(default)]
    pub name2route: BTreeMap<String, String>,

    #[serde(default)]
    pub exceptions: Exceptions,

    /// Transmission ids for cables whose header is known to be garbled.
    #[serde(default)]
    pub transmission_id_overrides: BTreeMap<String, String>,
}

/// Per-field lists of reference ids whose missing field is accepted as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Exceptions {
    #[serde(default)]
    pub without_subject: BTreeSet<String>,
    #[serde(default)]
    pub without_tags: BTreeSet<String>,
    #[serde(default)]
    pub without_transmission_id: BTreeSet<String>,
    #[serde(default)]
    pub malformed_summary: BTreeSet<String>,
    #[serde(default)]
    pub without_recipients: BTreeSet<String>,
}

impl Exceptions {
    pub fn allows(&self, field: Field, reference_id: &str) -> bool {
        let list = match field {
            Field::Subject => &self.without_subject,
            Field::Tags => &self.without_tags,
            Field::TransmissionId => &self.without_transmission_id,
            Field::Summary => &self.malformed_summary,
            Field::Recipients => &self.without_recipients,
            _ => return false,
        };
        list.contains(reference_id)
    }
}

impl CableConfig {
    /// Parses the tables bundled with the crate.
    pub fn builtin() -> Result<Self> {
        let mut config: CableConfig = serde_json::from_str(BUILTIN_EXCEPTIONS)
            .map_err(|e| CableError::Config(format!("bundled exceptions: {e}")))?;
        config.name2route = serde_json::from_str(BUILTIN_NAME2ROUTE)
            .map_err(|e| CableError::Config(format!("bundled name2route table: {e}")))?;

        debug!(
            routes = config.name2route.len(),
            overrides = config.transmission_id_overrides.len(),
            "loaded builtin cable config"
        );
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
            .map_err(|e| CableError::Config(format!("{}: {e}", path.display())))
    }

    /// Looks up the routing indicator for a station name, ignoring spacing.
    pub fn route_for(&self, name: &str) -> Option<&str> {
        let key = name.split_whitespace().collect::<Vec<_>>().join(" ");
        self.name2route
            .get(&key.to_ascii_uppercase())
            .map(String::as_str)
    }

    pub fn transmission_id_override(&self, reference_id: &str) -> Option<&str> {
        self.transmission_id_overrides
            .get(reference_id)
            .map(String::as_str)
    }
}

/// Per-cable extraction switches.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CableOptions {
    /// Log and return an empty value instead of failing on a missing field.
    pub ignore_errors: bool,
    /// Drop a leading/trailing classification marker such as `(C)` from subjects.
    pub clean_subject: bool,
    /// Title-case all-caps classificationist names.
    pub normalize_names: bool,
}

impl Default for CableOptions {
    fn default() -> Self {
        Self {
            ignore_errors: false,
            clean_subject: true,
            normalize_names: true,
        }
    }
}
