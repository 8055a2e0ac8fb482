use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cablemap::{
    Cable, CableConfig, CableHandler, CableOptions, CableRecord, FilteringHandler, LoggingHandler,
    RecordMode, TeeHandler, handle_cables,
};
use tracing::info;

use crate::cli::{OutputFormat, ParseArgs};
use crate::commands::inventory::discover_html;
use crate::util::open_output;

pub fn run(args: ParseArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => CableConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => CableConfig::builtin().context("failed to load bundled config")?,
    };
    let config = Arc::new(config);
    let options = CableOptions {
        ignore_errors: args.ignore_errors,
        ..CableOptions::default()
    };
    let mode = if args.metadata_only {
        RecordMode::MetadataOnly {
            include_summary: args.with_summary,
        }
    } else {
        RecordMode::Full
    };

    let paths = expand_paths(&args.paths)?;
    info!(page_count = paths.len(), "parsing cable pages");

    let cables = paths
        .iter()
        .map(|path| {
            let html = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Cable::from_html(&html, None, Arc::clone(&config), options)
                .with_context(|| format!("failed to parse {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let writer = open_output(args.output.as_deref())?;
    let mut tee = TeeHandler::default();
    tee.push(Box::new(RecordWriter::new(writer, mode, args.format)));
    tee.push(Box::new(LoggingHandler::new()));

    let only = args.only.into_iter().collect::<BTreeSet<_>>();
    let mut handler = FilteringHandler::new(tee, move |cable: &Cable| {
        only.is_empty() || only.contains(cable.canonical_id())
    });
    handle_cables(&cables, &mut handler)?;

    if let Some(path) = &args.output {
        info!(path = %path.display(), "wrote cable records");
    }
    Ok(())
}

/// Files named on the command line plus the `*.html` pages of named directories.
fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut expanded = Vec::new();
    for path in paths {
        if path.is_dir() {
            expanded.extend(discover_html(path)?);
        } else {
            expanded.push(path.clone());
        }
    }
    Ok(expanded)
}

/// Serializes each handled cable as a [`CableRecord`].
pub struct RecordWriter<W: Write> {
    writer: W,
    mode: RecordMode,
    format: OutputFormat,
    pending: Vec<CableRecord>,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(writer: W, mode: RecordMode, format: OutputFormat) -> Self {
        Self {
            writer,
            mode,
            format,
            pending: Vec::new(),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CableHandler for RecordWriter<W> {
    fn end_cable(&mut self, cable: &Cable) -> Result<()> {
        let record = cable.to_record(self.mode)?;
        match self.format {
            OutputFormat::Jsonl => {
                serde_json::to_writer(&mut self.writer, &record)
                    .context("failed to serialize cable record")?;
                self.writer
                    .write_all(b"\n")
                    .context("failed to write cable record")?;
            }
            OutputFormat::Json => self.pending.push(record),
        }
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, &self.pending)
                .context("failed to serialize cable records")?;
            self.writer
                .write_all(b"\n")
                .context("failed to write cable records")?;
            self.pending.clear();
        }
        self.writer.flush().context("failed to flush cable records")
    }
}
