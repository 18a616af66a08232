use std::path::PathBuf;

use npsych_ingest::{CoercionReport, SourceFileSummary};
use npsych_model::{DatasetKind, OutputFormat};
use npsych_transform::NormalizeReport;

#[derive(Debug)]
pub struct RunResult {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub files: Vec<SourceFileSummary>,
    pub datasets: Vec<DatasetSummary>,
    pub coercions: CoercionReport,
    pub normalize: NormalizeReport,
    pub manifest: Option<PathBuf>,
}

#[derive(Debug)]
pub struct DatasetSummary {
    pub kind: DatasetKind,
    pub records: usize,
    pub outputs: Vec<ArtifactSummary>,
}

#[derive(Debug)]
pub struct ArtifactSummary {
    pub format: OutputFormat,
    pub writer: &'static str,
    pub fallback: bool,
}

impl DatasetSummary {
    pub fn output(&self, format: OutputFormat) -> Option<&ArtifactSummary> {
        self.outputs.iter().find(|artifact| artifact.format == format)
    }
}
