use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "cablemap",
    version,
    about = "Metadata extraction and identifier canonicalization for diplomatic cables"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hash and identify the cable pages in a directory.
    Inventory(InventoryArgs),
    /// Extract cable records from HTML pages.
    Parse(ParseArgs),
    /// Print canonical forms of identifiers, origins or signer names.
    Canonicalize(CanonicalizeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long, default_value = "cables")]
    pub source_dir: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON record per line.
    Jsonl,
    /// A single pretty-printed JSON array.
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// HTML files or directories of HTML files.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub ignore_errors: bool,

    #[arg(long, default_value_t = false)]
    pub metadata_only: bool,

    /// Keep the summary in metadata-only records.
    #[arg(long, default_value_t = false, requires = "metadata_only")]
    pub with_summary: bool,

    /// JSON file replacing the bundled route table and exception lists.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Jsonl)]
    pub format: OutputFormat,

    /// Emit only cables with these canonical ids.
    #[arg(long = "only")]
    pub only: Vec<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CanonicalKind {
    Id,
    Origin,
    Signer,
}

#[derive(Args, Debug, Clone)]
pub struct CanonicalizeArgs {
    #[arg(required = true)]
    pub values: Vec<String>,

    #[arg(long, value_enum, default_value_t = CanonicalKind::Id)]
    pub kind: CanonicalKind,
}
