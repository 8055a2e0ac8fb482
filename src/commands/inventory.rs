use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use cablemap::c14n::canonicalize_id;
use cablemap::meta::parse_metadata;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cli::InventoryArgs;
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CableEntry {
    pub filename: String,
    pub sha256: String,
    pub reference_id: String,
    pub canonical_id: String,
    pub created: String,
    pub classification: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CableInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub cable_count: usize,
    pub cables: Vec<CableEntry>,
}

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.source_dir)?;

    if args.dry_run {
        info!(
            cable_count = manifest.cable_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| args.source_dir.join("manifests").join("cable_inventory.json"));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(cable_count = manifest.cable_count, "inventory completed");

    Ok(())
}

pub fn build_manifest(source_dir: &Path) -> Result<CableInventoryManifest> {
    let html_paths = discover_html(source_dir)?;

    if html_paths.is_empty() {
        bail!("no cable pages found in {}", source_dir.display());
    }

    let mut cables = Vec::with_capacity(html_paths.len());
    for path in html_paths {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
            .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;

        let html = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let metadata = parse_metadata(&html)
            .with_context(|| format!("failed to read metadata table of {}", path.display()))?;
        let sha256 = sha256_file(&path)?;

        cables.push(CableEntry {
            filename,
            sha256,
            canonical_id: canonicalize_id(&metadata.reference_id),
            reference_id: metadata.reference_id,
            created: metadata.created,
            classification: metadata.classification,
        });
    }

    cables.sort_by(|a, b| {
        a.canonical_id
            .cmp(&b.canonical_id)
            .then(a.filename.cmp(&b.filename))
    });

    Ok(CableInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: source_dir.display().to_string(),
        cable_count: cables.len(),
        cables,
    })
}

/// `*.html` files directly inside `dir`, sorted by path.
pub fn discover_html(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages = Vec::new();

    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let is_html = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
            .unwrap_or(false);

        if is_html {
            pages.push(path);
        }
    }

    pages.sort();
    Ok(pages)
}
