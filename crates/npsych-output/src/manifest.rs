//! `manifest.json`: what a run wrote and the digest of each file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use npsych_model::{DatasetKind, OutputFormat};
use serde::{Deserialize, Serialize};
use sha2::Digest;

use crate::error::{PersistenceError, Result};
use crate::persist::WrittenArtifact;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";
pub const MANIFEST_SCHEMA: &str = "npsych.run-manifest";
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema: String,
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub artifacts: Vec<ManifestArtifact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestArtifact {
    pub dataset: DatasetKind,
    pub format: OutputFormat,
    /// File name relative to the manifest.
    pub file: String,
    pub rows: usize,
    pub writer: String,
    pub sha256: String,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

impl RunManifest {
    /// Hashes each written artifact and records it.
    pub fn from_artifacts(artifacts: &[WrittenArtifact]) -> Result<Self> {
        let mut entries = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let bytes = fs::read(&artifact.path).map_err(|e| PersistenceError::io(&artifact.path, e))?;
            let file = artifact
                .path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string();
            entries.push(ManifestArtifact {
                dataset: artifact.dataset,
                format: artifact.format,
                file,
                rows: artifact.rows,
                writer: artifact.writer.to_string(),
                sha256: sha256_hex(&bytes),
            });
        }
        Ok(Self {
            schema: MANIFEST_SCHEMA.to_string(),
            schema_version: MANIFEST_SCHEMA_VERSION,
            generated_at: Utc::now(),
            artifacts: entries,
        })
    }
}

/// Writes `manifest.json` into `output_dir` and returns its path.
pub fn write_manifest(output_dir: &Path, artifacts: &[WrittenArtifact]) -> Result<PathBuf> {
    let manifest = RunManifest::from_artifacts(artifacts)?;
    let json = serde_json::to_string_pretty(&manifest).map_err(|e| PersistenceError::Manifest {
        message: e.to_string(),
    })?;
    let path = output_dir.join(MANIFEST_FILE_NAME);
    fs::write(&path, json).map_err(|e| PersistenceError::io(&path, e))?;
    Ok(path)
}

/// Removes a previous run's manifest from `output_dir`, if there is one.
///
/// Called before artifacts are overwritten so that a failed run never
/// leaves a manifest describing files it has partly replaced.
pub fn remove_manifest(output_dir: &Path) -> Result<()> {
    let path = output_dir.join(MANIFEST_FILE_NAME);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PersistenceError::io(&path, e)),
    }
}

/// Reads a manifest written by [`write_manifest`].
pub fn load_manifest(path: &Path) -> Result<RunManifest> {
    let text = fs::read_to_string(path).map_err(|e| PersistenceError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| PersistenceError::Manifest {
        message: format!("{}: {e}", path.display()),
    })
}
