//! End-to-end tests for the pipeline stages.

use std::path::Path;

use npsych_cli::config::PipelineConfig;
use npsych_cli::pipeline::{PipelineError, PipelineOptions, query, run_pipeline, run_pipeline_with_writer};
use npsych_ingest::IngestError;
use npsych_model::{DatasetKind, OutputFormat, OutputMode};
use npsych_output::{ArrowParquetWriter, DatasetWriter, PersistenceError, PersistenceWriter};
use npsych_transform::TransformError;
use polars::prelude::DataFrame;
use tempfile::TempDir;

const WISC: &str = "test,test_name,scale,score,percentile,domain,test_type,score_type\n\
                    wisc5,WISC-V,WISC-V FSIQ,100,50,General Intelligence,npsych_test,standard_score\n";
const BASC: &str = "test,test_name,scale,score,percentile,domain,test_type,score_type\n\
                    basc3,BASC-3,BASC Anxiety,60,84,Emotional,rating_scale,t_score\n";

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn scenario() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "wisc5.csv", WISC);
    write(dir.path(), "basc3.csv", BASC);
    dir
}

fn f64_at(df: &DataFrame, column: &str, idx: usize) -> Option<f64> {
    df.column(column).unwrap().f64().unwrap().get(idx)
}

fn str_at<'a>(df: &'a DataFrame, column: &str, idx: usize) -> Option<&'a str> {
    df.column(column).unwrap().str().unwrap().get(idx)
}

#[test]
fn wisc_and_basc_end_to_end() {
    let dir = scenario();
    let options = PipelineOptions::new(dir.path());
    let result = run_pipeline(&options).unwrap();
    let bundle = &result.bundle;

    assert_eq!(bundle.get(DatasetKind::Neuropsych).unwrap().record_count(), 2);

    let neurocog = &bundle.get(DatasetKind::Neurocog).unwrap().data;
    assert_eq!(neurocog.height(), 1);
    assert_eq!(str_at(neurocog, "scale", 0), Some("WISC-V FSIQ"));
    assert_eq!(f64_at(neurocog, "z", 0), Some(0.0));

    let neurobehav = &bundle.get(DatasetKind::Neurobehav).unwrap().data;
    assert_eq!(neurobehav.height(), 1);
    assert_eq!(str_at(neurobehav, "scale", 0), Some("BASC Anxiety"));
    let z = f64_at(neurobehav, "z", 0).unwrap();
    assert!((z - 1.0).abs() < 0.01, "z = {z}");

    assert_eq!(bundle.get(DatasetKind::Validity).unwrap().record_count(), 0);

    // Default mode writes every format for every dataset, plus the manifest.
    assert_eq!(result.output.artifacts.len(), 4 * 3);
    let output_dir = dir.path().join("output");
    for kind in DatasetKind::ALL {
        for format in OutputFormat::ALL {
            assert!(format.artifact_path(&output_dir, kind).exists());
        }
    }
    assert!(output_dir.join("manifest.json").exists());
}

#[test]
fn written_datasets_are_queryable() {
    let dir = scenario();
    run_pipeline(&PipelineOptions::new(dir.path())).unwrap();

    let output_dir = dir.path().join("output");
    let df = query(
        "SELECT scale, z, z_mean_domain FROM neurobehav",
        &output_dir,
    )
    .unwrap();
    assert_eq!(df.height(), 1);
    let z = f64_at(&df, "z", 0).unwrap();
    assert!((z - 0.9945).abs() < 1e-3);

    let empty = query("SELECT * FROM validity", &output_dir).unwrap();
    assert_eq!(empty.height(), 0);
}

#[test]
fn rerun_does_not_ingest_previous_outputs() {
    let dir = scenario();
    let mut options = PipelineOptions::new(dir.path());
    options.output_dir = dir.path().to_path_buf();
    options.mode = OutputMode::single(OutputFormat::Csv);
    run_pipeline(&options).unwrap();

    let second = run_pipeline(&options).unwrap();
    assert_eq!(second.reconciled.record_count(), 2);
    assert_eq!(second.reconciled.files.len(), 2);
}

#[test]
fn dry_run_writes_nothing() {
    let dir = scenario();
    let mut options = PipelineOptions::new(dir.path());
    options.dry_run = true;
    let result = run_pipeline(&options).unwrap();
    assert!(result.output.artifacts.is_empty());
    assert!(!dir.path().join("output").exists());
}

#[test]
fn empty_source_dir_is_an_input_error() {
    let dir = TempDir::new().unwrap();
    let err = run_pipeline(&PipelineOptions::new(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Ingest(IngestError::NoSourceFiles { .. })
    ));
}

#[test]
fn out_of_range_percentile_fails_unless_nullified() {
    let dir = scenario();
    write(
        dir.path(),
        "cvlt.csv",
        "scale,percentile,test_type\nCVLT Total,101,npsych_test\n",
    );

    let err = run_pipeline(&PipelineOptions::new(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Transform(TransformError::PercentileOutOfRange { .. })
    ));
    assert!(err.to_string().contains("cvlt.csv"));

    let config = PipelineConfig::parse("[percentile]\nout_of_range = \"nullify\"\n").unwrap();
    let mut options = PipelineOptions::new(dir.path());
    options.normalize = config.normalize_options();
    options.dry_run = true;
    let result = run_pipeline(&options).unwrap();
    assert_eq!(result.bundle.report.z.nullified, 1);
    assert_eq!(result.bundle.get(DatasetKind::Neurocog).unwrap().record_count(), 2);
}

struct BrokenWriter;

impl DatasetWriter for BrokenWriter {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn write(&self, _df: &DataFrame, _path: &Path) -> npsych_output::Result<()> {
        Err(PersistenceError::Writer {
            writer: "broken",
            message: "disk on fire".to_string(),
        })
    }
}

#[test]
fn primary_writer_failure_falls_back() {
    let dir = scenario();
    let mut options = PipelineOptions::new(dir.path());
    options.mode = OutputMode::single(OutputFormat::Parquet);
    let writer = PersistenceWriter::new().with_chain(
        OutputFormat::Parquet,
        vec![Box::new(BrokenWriter), Box::new(ArrowParquetWriter)],
    );

    let result = run_pipeline_with_writer(&options, &writer).unwrap();
    assert_eq!(result.output.artifacts.len(), 4);
    assert!(result.output.artifacts.iter().all(|artifact| artifact.fallback));

    let df = query("SELECT * FROM neuropsych", &options.output_dir).unwrap();
    assert_eq!(df.height(), 2);
}

#[test]
fn exhausted_chain_names_dataset_and_format() {
    let dir = scenario();
    let mut options = PipelineOptions::new(dir.path());
    options.mode = OutputMode::single(OutputFormat::Csv);
    let writer = PersistenceWriter::new().with_chain(OutputFormat::Csv, vec![Box::new(BrokenWriter)]);

    let err = run_pipeline_with_writer(&options, &writer).unwrap_err();
    match err {
        PipelineError::Persistence(PersistenceError::FallbacksExhausted { dataset, format, .. }) => {
            assert_eq!(dataset, DatasetKind::Neuropsych);
            assert_eq!(format, OutputFormat::Csv);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn config_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("npsych.toml");
    write(
        dir.path(),
        "npsych.toml",
        "[output]\nformat = \"parquet\"\n\n[score_types]\n\"BASC Anxiety\" = \"t_score\"\n",
    );
    let config = PipelineConfig::load(&path).unwrap();
    assert_eq!(config.output.format, OutputMode::Parquet);
    assert_eq!(config.score_types.len(), 1);

    assert!(PipelineConfig::load(&dir.path().join("missing.toml")).is_err());
}

#[test]
fn csv_only_outputs_query_with_pipeline_types() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "wisc5.csv",
        "test,scale,percentile,domain,test_type\n01,WISC-V FSIQ,50,General Intelligence,npsych_test\n",
    );
    let mut options = PipelineOptions::new(dir.path());
    options.mode = OutputMode::single(OutputFormat::Csv);
    run_pipeline(&options).unwrap();

    let df = query("SELECT test, z, z_sd_domain FROM neurocog", &options.output_dir).unwrap();
    assert_eq!(str_at(&df, "test", 0), Some("01"));
    assert_eq!(f64_at(&df, "z", 0), Some(0.0));
    assert_eq!(f64_at(&df, "z_sd_domain", 0), None);
}

#[test]
fn failed_rerun_leaves_no_stale_manifest() {
    let dir = scenario();
    let mut options = PipelineOptions::new(dir.path());
    options.mode = OutputMode::single(OutputFormat::Csv);
    let first = run_pipeline(&options).unwrap();
    let manifest = first.output.manifest.unwrap();
    assert!(manifest.exists());

    let writer = PersistenceWriter::new().with_chain(OutputFormat::Csv, vec![Box::new(BrokenWriter)]);
    assert!(run_pipeline_with_writer(&options, &writer).is_err());
    assert!(!manifest.exists());
}
