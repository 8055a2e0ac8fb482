use std::io::{self, Write};

use anyhow::{Context, Result};
use cablemap::c14n::{canonicalize_id, canonicalize_origin, canonicalize_signer};
use tracing::debug;

use crate::cli::{CanonicalKind, CanonicalizeArgs};

pub fn run(args: CanonicalizeArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for value in &args.values {
        let canonical = canonicalize(args.kind, value);
        if canonical != *value {
            debug!(original = %value, canonical = %canonical, "value rewritten");
        }
        writeln!(out, "{value}\t{canonical}").context("failed to write to stdout")?;
    }

    out.flush().context("failed to flush stdout")
}

fn canonicalize(kind: CanonicalKind, value: &str) -> String {
    match kind {
        CanonicalKind::Id => canonicalize_id(value),
        CanonicalKind::Origin => canonicalize_origin(value),
        CanonicalKind::Signer => canonicalize_signer(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_on_kind() {
        assert_eq!(canonicalize(CanonicalKind::Id, "05RIO123"), "05RIODEJANEIRO123");
        assert_eq!(canonicalize(CanonicalKind::Origin, "AMEMBASSYUSUN"), "USUNNEWYORK");
        assert_eq!(canonicalize(CanonicalKind::Signer, "clintion"), "CLINTON");
    }
}
