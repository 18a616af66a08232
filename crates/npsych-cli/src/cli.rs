//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use npsych_model::{OutputFormat, OutputMode};

#[derive(Parser)]
#[command(
    name = "npsych",
    version,
    about = "Neuropsych score pipeline - reconcile, normalize and query score exports",
    long_about = "Reconcile per-instrument neuropsychological score exports into one dataset.\n\n\
                  Converts percentiles to z-scores, partitions records by test type,\n\
                  attaches grouped z statistics and writes CSV, Parquet and Feather outputs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow score values in trace logs (redacted by default).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Process a directory of score files and write the datasets.
    Run(RunArgs),

    /// Run a SQL query against written datasets.
    Query(QueryArgs),

    /// List the relations available to `query`.
    Tables(TablesArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Directory containing one CSV/TSV export per instrument.
    #[arg(value_name = "SOURCE_DIR")]
    pub source_dir: PathBuf,

    /// Output directory (default: <SOURCE_DIR>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format to write (default: all, or the config file's choice).
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormatArg>,

    /// TOML configuration file.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Store null z for percentiles outside [0, 100] instead of failing.
    #[arg(long = "nullify-out-of-range")]
    pub nullify_out_of_range: bool,

    /// Process and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct QueryArgs {
    /// SQL expression, e.g. "SELECT scale, z FROM neurocog".
    #[arg(value_name = "SQL")]
    pub expression: String,

    /// Directory holding the written datasets.
    #[arg(long = "data-dir", value_name = "DIR", default_value = "output")]
    pub data_dir: PathBuf,
}

#[derive(Parser)]
pub struct TablesArgs {
    /// Directory holding the written datasets.
    #[arg(long = "data-dir", value_name = "DIR", default_value = "output")]
    pub data_dir: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Parquet,
    Feather,
    All,
}

impl From<OutputFormatArg> for OutputMode {
    fn from(value: OutputFormatArg) -> Self {
        match value {
            OutputFormatArg::Csv => OutputMode::single(OutputFormat::Csv),
            OutputFormatArg::Parquet => OutputMode::single(OutputFormat::Parquet),
            OutputFormatArg::Feather => OutputMode::single(OutputFormat::Feather),
            OutputFormatArg::All => OutputMode::All,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
