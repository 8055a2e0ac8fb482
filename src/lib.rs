//! Metadata extraction for diplomatic cables published as HTML pages.
//!
//! A [`Cable`] is built from one page and exposes its fields (subject, tags,
//! references, recipients, ...) as lazily computed, cached values. Identifiers
//! are mapped to a canonical form by [`c14n`]. Exporters consume cables
//! through the [`CableHandler`] event interface.

pub mod c14n;
pub mod cable;
pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod meta;
pub mod model;
pub mod segment;

pub use c14n::{canonicalize_id, canonicalize_origin, canonicalize_signer};
pub use cable::{Cable, CableRecord, RecordMode};
pub use config::{CableConfig, CableOptions, Exceptions};
pub use error::{CableError, Field, Result};
pub use handler::{
    CableHandler, FilteringHandler, LoggingHandler, NoopHandler, TeeHandler, handle_cable,
    handle_cables,
};
pub use model::{Recipient, Reference, ReferenceKind};
