use anyhow::{Context, Result};
use tracing::info_span;

use npsych_cli::config::PipelineConfig;
use npsych_cli::pipeline::{PipelineOptions, query, run_pipeline};
use npsych_model::{DatasetKind, OutputMode};
use npsych_query::discover_relations;
use npsych_transform::OutOfRangePolicy;

use crate::cli::{QueryArgs, RunArgs, TablesArgs};
use crate::summary::{print_frame, print_relations};
use crate::types::{ArtifactSummary, DatasetSummary, RunResult};

/// Builds pipeline options from the config file (if any) and CLI flags.
/// Flags win over the file.
pub fn pipeline_options(args: &RunArgs) -> Result<PipelineOptions> {
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path).context("load config")?,
        None => PipelineConfig::default(),
    };

    let mut options = PipelineOptions::new(&args.source_dir);
    if let Some(output_dir) = &args.output_dir {
        options.output_dir.clone_from(output_dir);
    }
    options.normalize = config.normalize_options();
    if args.nullify_out_of_range {
        options.normalize.out_of_range = OutOfRangePolicy::Nullify;
    }
    options.mode = args
        .format
        .map_or(config.output.format, OutputMode::from);
    options.dry_run = args.dry_run;
    Ok(options)
}

pub fn run_pipeline_command(args: &RunArgs) -> Result<RunResult> {
    let span = info_span!("run", source_dir = %args.source_dir.display());
    let _guard = span.enter();

    let options = pipeline_options(args)?;
    let result = run_pipeline(&options)
        .with_context(|| format!("process {}", options.source_dir.display()))?;

    let datasets = DatasetKind::ALL
        .iter()
        .map(|&kind| DatasetSummary {
            kind,
            records: result
                .bundle
                .get(kind)
                .map_or(0, |dataset| dataset.record_count()),
            outputs: result
                .output
                .artifacts
                .iter()
                .filter(|artifact| artifact.dataset == kind)
                .map(|artifact| ArtifactSummary {
                    format: artifact.format,
                    writer: artifact.writer,
                    fallback: artifact.fallback,
                })
                .collect(),
        })
        .collect();

    Ok(RunResult {
        source_dir: options.source_dir,
        output_dir: options.output_dir,
        dry_run: options.dry_run,
        files: result.reconciled.files,
        datasets,
        coercions: result.reconciled.coercions,
        normalize: result.bundle.report,
        manifest: result.output.manifest,
    })
}

pub fn run_query(args: &QueryArgs) -> Result<()> {
    let df = query(&args.expression, &args.data_dir)?;
    print_frame(&df);
    Ok(())
}

pub fn run_tables(args: &TablesArgs) -> Result<()> {
    let relations = discover_relations(&args.data_dir)
        .with_context(|| format!("list relations in {}", args.data_dir.display()))?;
    if relations.is_empty() {
        println!("No datasets found in {}", args.data_dir.display());
        return Ok(());
    }
    print_relations(&relations);
    Ok(())
}
