use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Cable,
    Email,
    Book,
}

/// A document cited in a cable's REF block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Canonical cable id, e-mail address or ISBN.
    pub value: String,
    pub kind: ReferenceKind,
    /// Enumeration letter (`A`, `B`, ...) the reference is listed under.
    pub bullet: Option<String>,
    pub title: Option<String>,
}

/// One addressee from the `TO` or `INFO` block of a cable header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    /// Routing indicator, e.g. `RUEHC`.
    pub route: Option<String>,
    pub name: String,
    pub precedence: Option<String>,
    /// Message center number.
    pub mcn: Option<String>,
    /// Stations exempted from a collective address (`XMT` lines).
    pub excluded: Vec<String>,
}
