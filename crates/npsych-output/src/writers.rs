//! Writer strategies, one per concrete library writer.
//!
//! A logical format is written by an ordered chain of these; see
//! [`PersistenceWriter`](crate::PersistenceWriter).

use std::fs::File;
use std::path::Path;

use arrow::ipc::writer::FileWriter;
use parquet::arrow::ArrowWriter;
use polars::prelude::{CsvWriter, DataFrame, IpcWriter, ParquetWriter, SerWriter};

use crate::arrow_bridge::to_record_batch;
use crate::error::{PersistenceError, Result};

/// Writes a whole frame to `path`, replacing any existing file.
pub trait DatasetWriter: Send + Sync {
    /// Stable name used in logs and the run manifest.
    fn name(&self) -> &'static str;

    fn write(&self, df: &DataFrame, path: &Path) -> Result<()>;
}

fn create(name: &'static str, path: &Path) -> Result<File> {
    File::create(path).map_err(|e| PersistenceError::writer(name, e))
}

pub struct PolarsCsvWriter;

impl DatasetWriter for PolarsCsvWriter {
    fn name(&self) -> &'static str {
        "polars-csv"
    }

    fn write(&self, df: &DataFrame, path: &Path) -> Result<()> {
        let mut file = create(self.name(), path)?;
        let mut df = df.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)
            .map_err(|e| PersistenceError::writer(self.name(), e))
    }
}

pub struct PolarsParquetWriter;

impl DatasetWriter for PolarsParquetWriter {
    fn name(&self) -> &'static str {
        "polars-parquet"
    }

    fn write(&self, df: &DataFrame, path: &Path) -> Result<()> {
        let file = create(self.name(), path)?;
        let mut df = df.clone();
        ParquetWriter::new(file)
            .finish(&mut df)
            .map(|_| ())
            .map_err(|e| PersistenceError::writer(self.name(), e))
    }
}

pub struct ArrowParquetWriter;

impl DatasetWriter for ArrowParquetWriter {
    fn name(&self) -> &'static str {
        "arrow-parquet"
    }

    fn write(&self, df: &DataFrame, path: &Path) -> Result<()> {
        let batch = to_record_batch(df)?;
        let file = create(self.name(), path)?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)
            .map_err(|e| PersistenceError::writer(self.name(), e))?;
        writer
            .write(&batch)
            .map_err(|e| PersistenceError::writer(self.name(), e))?;
        writer
            .close()
            .map(|_| ())
            .map_err(|e| PersistenceError::writer(self.name(), e))
    }
}

pub struct PolarsIpcWriter;

impl DatasetWriter for PolarsIpcWriter {
    fn name(&self) -> &'static str {
        "polars-ipc"
    }

    fn write(&self, df: &DataFrame, path: &Path) -> Result<()> {
        let file = create(self.name(), path)?;
        let mut df = df.clone();
        IpcWriter::new(file)
            .finish(&mut df)
            .map_err(|e| PersistenceError::writer(self.name(), e))
    }
}

pub struct ArrowIpcWriter;

impl DatasetWriter for ArrowIpcWriter {
    fn name(&self) -> &'static str {
        "arrow-ipc"
    }

    fn write(&self, df: &DataFrame, path: &Path) -> Result<()> {
        let batch = to_record_batch(df)?;
        let file = create(self.name(), path)?;
        let mut writer = FileWriter::try_new(file, &batch.schema())
            .map_err(|e| PersistenceError::writer(self.name(), e))?;
        writer
            .write(&batch)
            .map_err(|e| PersistenceError::writer(self.name(), e))?;
        writer
            .finish()
            .map_err(|e| PersistenceError::writer(self.name(), e))
    }
}
