//! Score processing pipeline with explicit stages.
//!
//! 1. **Ingest**: discover and reconcile the source score files
//! 2. **Normalize**: dedupe, classify, derive z and grouped statistics
//! 3. **Output**: write every dataset in the selected formats plus a manifest
//!
//! Each stage takes the output of the previous stage and returns typed results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use npsych_ingest::{IngestError, Reconciled, reconcile_directory};
use npsych_model::{DatasetKind, OutputMode, SCALE, Z};
use npsych_output::{
    PersistenceError, PersistenceWriter, WrittenArtifact, remove_manifest, write_manifest,
};
use npsych_query::QueryError;
use npsych_transform::{DatasetBundle, NormalizeOptions, TransformError};
use polars::prelude::DataFrame;
use thiserror::Error;
use tracing::{Level, debug, enabled, info, info_span, trace};

use crate::logging::redact_value;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Everything a run needs.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub mode: OutputMode,
    pub normalize: NormalizeOptions,
    /// Process and report without writing files.
    pub dry_run: bool,
}

impl PipelineOptions {
    /// Options with the output directory defaulting to `<source_dir>/output`.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        let source_dir = source_dir.into();
        Self {
            output_dir: source_dir.join("output"),
            source_dir,
            mode: OutputMode::default(),
            normalize: NormalizeOptions::default(),
            dry_run: false,
        }
    }
}

// ============================================================================
// Stage 1: Ingest
// ============================================================================

pub fn ingest(source_dir: &Path) -> Result<Reconciled, PipelineError> {
    let span = info_span!("ingest", source_dir = %source_dir.display());
    let _guard = span.enter();
    Ok(reconcile_directory(source_dir)?)
}

// ============================================================================
// Stage 2: Normalize
// ============================================================================

pub fn normalize(frame: DataFrame, options: &NormalizeOptions) -> Result<DatasetBundle, PipelineError> {
    let span = info_span!("normalize", record_count = frame.height());
    let _guard = span.enter();
    let bundle = npsych_transform::normalize(frame, options)?;
    if enabled!(Level::TRACE) {
        trace_scores(&bundle);
    }
    Ok(bundle)
}

fn trace_scores(bundle: &DatasetBundle) {
    let Some(dataset) = bundle.get(DatasetKind::Neuropsych) else {
        return;
    };
    let (Ok(scales), Ok(z)) = (dataset.data.column(SCALE), dataset.data.column(Z)) else {
        return;
    };
    let (Ok(scales), Ok(z)) = (scales.str(), z.f64()) else {
        return;
    };
    for (scale, z) in scales.into_iter().zip(z) {
        let z = z.map(|value| format!("{value:.4}")).unwrap_or_default();
        trace!(
            scale = redact_value(scale.unwrap_or_default()),
            z = redact_value(&z),
            "normalized score"
        );
    }
}

// ============================================================================
// Stage 3: Output
// ============================================================================

/// Result of the output stage.
#[derive(Debug, Default)]
pub struct OutputResult {
    pub artifacts: Vec<WrittenArtifact>,
    pub manifest: Option<PathBuf>,
}

pub fn output(
    bundle: &DatasetBundle,
    mode: OutputMode,
    output_dir: &Path,
    writer: &PersistenceWriter,
) -> Result<OutputResult, PipelineError> {
    let span = info_span!("output", output_dir = %output_dir.display());
    let _guard = span.enter();
    remove_manifest(output_dir)?;
    let artifacts = writer.write_all(&bundle.datasets, mode, output_dir)?;
    let manifest = write_manifest(output_dir, &artifacts)?;
    debug!(manifest = %manifest.display(), "manifest written");
    Ok(OutputResult {
        artifacts,
        manifest: Some(manifest),
    })
}

// ============================================================================
// Full run
// ============================================================================

/// Result of a full run.
#[derive(Debug)]
pub struct PipelineResult {
    pub reconciled: Reconciled,
    pub bundle: DatasetBundle,
    pub output: OutputResult,
}

pub fn run_pipeline(options: &PipelineOptions) -> Result<PipelineResult, PipelineError> {
    run_pipeline_with_writer(options, &PersistenceWriter::new())
}

/// Runs every stage with a caller-supplied persistence writer.
pub fn run_pipeline_with_writer(
    options: &PipelineOptions,
    writer: &PersistenceWriter,
) -> Result<PipelineResult, PipelineError> {
    let start = Instant::now();
    let reconciled = ingest(&options.source_dir)?;
    let bundle = normalize(reconciled.frame.clone(), &options.normalize)?;
    let output = if options.dry_run {
        info!("dry run; no files written");
        OutputResult::default()
    } else {
        output(&bundle, options.mode, &options.output_dir, writer)?
    };
    info!(
        record_count = reconciled.record_count(),
        artifact_count = output.artifacts.len(),
        duration_ms = start.elapsed().as_millis(),
        "run complete"
    );
    Ok(PipelineResult {
        reconciled,
        bundle,
        output,
    })
}

/// Runs a SQL expression over the artifacts in `data_dir`.
pub fn query(expression: &str, data_dir: &Path) -> Result<DataFrame, PipelineError> {
    let span = info_span!("query", data_dir = %data_dir.display());
    let _guard = span.enter();
    Ok(npsych_query::query(expression, data_dir)?)
}
