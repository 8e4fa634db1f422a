// 📦 Batch Runner - newline-delimited loads in, one decision per line out
// A bad line is logged and skipped; only I/O on the streams themselves aborts.

use crate::error::IngestError;
use crate::ingest::LoadIngestor;
use crate::load::LoadResponse;
use crate::parser::parse_load;
use crate::store::LoadStore;
use crate::velocity::LoadValidator;
use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

/// Per-run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Lines that produced an output record
    pub processed: usize,
    pub accepted: usize,
    pub declined: usize,
    pub duplicates: usize,
    pub invalid: usize,
    pub store_errors: usize,
}

impl BatchSummary {
    pub fn skipped(&self) -> usize {
        self.duplicates + self.invalid + self.store_errors
    }
}

/// Output sink for a run: the file at `path` opened for append (created if
/// missing), or stdout when no path is given.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Unable to open output file {:?}", path))?;
            info!("writing results to {:?}", path);
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Process every line of `reader`, writing one JSON output per evaluated load.
///
/// Output order follows input order. Blank lines are ignored.
pub fn run_batch<S, V, R, W>(
    ingestor: &LoadIngestor<S, V>,
    mut reader: R,
    mut writer: W,
) -> Result<BatchSummary>
where
    S: LoadStore,
    V: LoadValidator,
    R: BufRead,
    W: Write,
{
    let mut summary = BatchSummary::default();
    let mut line = Vec::new();
    let mut line_number = 0usize;

    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .context("Failed to read input")?;
        if read == 0 {
            break;
        }
        line_number += 1;

        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }

        let candidate = match parse_load(trimmed) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(
                    "line {}: skipping unparseable record {}: {}",
                    line_number,
                    String::from_utf8_lossy(trimmed),
                    e
                );
                summary.invalid += 1;
                continue;
            }
        };

        let record = match ingestor.ingest(candidate) {
            Ok(record) => record,
            Err(e @ IngestError::Duplicate { .. }) => {
                warn!("line {}: {}", line_number, e);
                summary.duplicates += 1;
                continue;
            }
            Err(IngestError::Store(e)) => {
                warn!("line {}: store error, record skipped: {}", line_number, e);
                summary.store_errors += 1;
                continue;
            }
        };

        serde_json::to_writer(&mut writer, &LoadResponse::from(&record))
            .context("Failed to write output record")?;
        writer.write_all(b"\n").context("Failed to write output record")?;

        summary.processed += 1;
        if record.accepted {
            summary.accepted += 1;
        } else {
            summary.declined += 1;
        }
    }

    writer.flush().context("Failed to flush output")?;

    info!(
        "batch complete: {} processed ({} accepted, {} declined), {} skipped ({} duplicate, {} invalid, {} store errors)",
        summary.processed,
        summary.accepted,
        summary.declined,
        summary.skipped(),
        summary.duplicates,
        summary.invalid,
        summary.store_errors
    );

    Ok(summary)
}
