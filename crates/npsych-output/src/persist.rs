//! Multi-format persistence with per-format fallback chains.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use npsych_model::{Dataset, DatasetKind, OutputFormat, OutputMode};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PersistenceError, Result};
use crate::writers::{
    ArrowIpcWriter, ArrowParquetWriter, DatasetWriter, PolarsCsvWriter, PolarsIpcWriter,
    PolarsParquetWriter,
};

/// One artifact successfully written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenArtifact {
    pub dataset: DatasetKind,
    pub format: OutputFormat,
    pub path: PathBuf,
    pub rows: usize,
    /// Name of the strategy that succeeded.
    pub writer: &'static str,
    /// True when a strategy other than the first produced the file.
    pub fallback: bool,
}

/// Writes datasets to `<dir>/<dataset>.<ext>` using an ordered chain of
/// writer strategies per format.
pub struct PersistenceWriter {
    chains: BTreeMap<OutputFormat, Vec<Box<dyn DatasetWriter>>>,
}

impl Default for PersistenceWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistenceWriter {
    /// Polars-native writers first, arrow-rs as fallback for the binary
    /// formats. CSV has no fallback.
    pub fn new() -> Self {
        let mut chains: BTreeMap<OutputFormat, Vec<Box<dyn DatasetWriter>>> = BTreeMap::new();
        chains.insert(OutputFormat::Csv, vec![Box::new(PolarsCsvWriter)]);
        chains.insert(
            OutputFormat::Parquet,
            vec![Box::new(PolarsParquetWriter), Box::new(ArrowParquetWriter)],
        );
        chains.insert(
            OutputFormat::Feather,
            vec![Box::new(PolarsIpcWriter), Box::new(ArrowIpcWriter)],
        );
        Self { chains }
    }

    /// Replaces the strategy chain for one format.
    pub fn with_chain(mut self, format: OutputFormat, chain: Vec<Box<dyn DatasetWriter>>) -> Self {
        self.chains.insert(format, chain);
        self
    }

    /// Strategy names for `format`, in the order they are tried.
    pub fn chain_names(&self, format: OutputFormat) -> Vec<&'static str> {
        self.chains
            .get(&format)
            .map(|chain| chain.iter().map(|writer| writer.name()).collect())
            .unwrap_or_default()
    }

    /// Writes every dataset in every format selected by `mode`.
    ///
    /// Stops at the first format whose chain is exhausted.
    pub fn write_all(
        &self,
        datasets: &[Dataset],
        mode: OutputMode,
        output_dir: &Path,
    ) -> Result<Vec<WrittenArtifact>> {
        let start = Instant::now();
        fs::create_dir_all(output_dir).map_err(|e| PersistenceError::io(output_dir, e))?;

        let formats = mode.formats();
        let mut written = Vec::with_capacity(datasets.len() * formats.len());
        for dataset in datasets {
            for &format in &formats {
                written.push(self.write_dataset(dataset, format, output_dir)?);
            }
        }

        info!(
            output_dir = %output_dir.display(),
            artifact_count = written.len(),
            fallback_count = written.iter().filter(|artifact| artifact.fallback).count(),
            duration_ms = start.elapsed().as_millis(),
            "datasets persisted"
        );
        Ok(written)
    }

    /// Writes one dataset in one format, trying each strategy in turn.
    pub fn write_dataset(
        &self,
        dataset: &Dataset,
        format: OutputFormat,
        output_dir: &Path,
    ) -> Result<WrittenArtifact> {
        let path = format.artifact_path(output_dir, dataset.kind);
        let chain = self.chains.get(&format).map(Vec::as_slice).unwrap_or_default();
        let mut attempts = Vec::with_capacity(chain.len());

        for (position, writer) in chain.iter().enumerate() {
            match writer.write(&dataset.data, &path) {
                Ok(()) => {
                    debug!(
                        dataset = %dataset.kind,
                        format = %format,
                        writer = writer.name(),
                        rows = dataset.record_count(),
                        path = %path.display(),
                        "artifact written"
                    );
                    return Ok(WrittenArtifact {
                        dataset: dataset.kind,
                        format,
                        path,
                        rows: dataset.record_count(),
                        writer: writer.name(),
                        fallback: position > 0,
                    });
                }
                Err(err) => {
                    warn!(
                        dataset = %dataset.kind,
                        format = %format,
                        writer = writer.name(),
                        error = %err,
                        "writer failed; trying next strategy"
                    );
                    attempts.push(format!("{}: {err}", writer.name()));
                }
            }
        }

        remove_partial(&path)?;
        Err(PersistenceError::FallbacksExhausted {
            dataset: dataset.kind,
            format,
            attempts,
        })
    }
}

fn remove_partial(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(PersistenceError::io(path, err)),
    }
}
