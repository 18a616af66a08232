//! Dataset persistence.
//!
//! Each dataset is written as `<dataset>.csv`, `<dataset>.parquet` and/or
//! `<dataset>.feather`. Every format owns an ordered chain of writer
//! strategies; a failing strategy is logged and the next one is tried.

mod arrow_bridge;
mod error;
mod manifest;
mod persist;
mod writers;

pub use arrow_bridge::to_record_batch;
pub use error::{PersistenceError, Result};
pub use manifest::{
    MANIFEST_FILE_NAME, MANIFEST_SCHEMA, MANIFEST_SCHEMA_VERSION, ManifestArtifact, RunManifest,
    load_manifest, remove_manifest, sha256_hex, write_manifest,
};
pub use persist::{PersistenceWriter, WrittenArtifact};
pub use writers::{
    ArrowIpcWriter, ArrowParquetWriter, DatasetWriter, PolarsCsvWriter, PolarsIpcWriter,
    PolarsParquetWriter,
};
