//! Finds queryable artifacts and picks one per relation name.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use npsych_model::OutputFormat;
use tracing::debug;

use crate::error::{QueryError, Result};

/// A relation name and the artifact chosen to back it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// File stem, used as the SQL table name.
    pub name: String,
    pub path: PathBuf,
    pub format: OutputFormat,
    /// Same-stem artifacts that lost on precedence.
    pub shadowed: Vec<PathBuf>,
}

fn precedence(format: OutputFormat, path: &Path) -> (u8, bool) {
    let secondary_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| !ext.eq_ignore_ascii_case(format.extension()));
    (format.read_rank(), secondary_extension)
}

/// Lists `*.parquet`, `*.feather`, `*.arrow` and `*.csv` files directly in
/// `dir`, one relation per stem, sorted by name.
///
/// When a stem exists in several formats the typed formats win:
/// parquet, then feather/arrow, then csv.
pub fn discover_relations(dir: &Path) -> Result<Vec<Relation>> {
    let entries = fs::read_dir(dir).map_err(|e| QueryError::Discovery {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| QueryError::Discovery {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut relations: BTreeMap<String, Relation> = BTreeMap::new();
    for path in paths {
        let Some(format) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(OutputFormat::from_extension)
        else {
            continue;
        };
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }

        match relations.get_mut(name) {
            None => {
                relations.insert(
                    name.to_string(),
                    Relation {
                        name: name.to_string(),
                        path,
                        format,
                        shadowed: Vec::new(),
                    },
                );
            }
            Some(current) => {
                if precedence(format, &path) < precedence(current.format, &current.path) {
                    let previous = std::mem::replace(&mut current.path, path);
                    current.format = format;
                    current.shadowed.push(previous);
                } else {
                    current.shadowed.push(path);
                }
            }
        }
    }

    for relation in relations.values() {
        if !relation.shadowed.is_empty() {
            debug!(
                relation = %relation.name,
                chosen = %relation.path.display(),
                shadowed = relation.shadowed.len(),
                "several artifacts for one relation; using highest precedence"
            );
        }
    }
    Ok(relations.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_precedence_parquet_first() {
        let dir = TempDir::new().unwrap();
        for name in ["neuropsych.csv", "neuropsych.feather", "neuropsych.parquet"] {
            touch(dir.path(), name);
        }
        let relations = discover_relations(dir.path()).unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].format, OutputFormat::Parquet);
        assert_eq!(relations[0].shadowed.len(), 2);
    }

    #[test]
    fn test_feather_beats_csv_and_arrow_extension() {
        let dir = TempDir::new().unwrap();
        for name in ["validity.csv", "validity.arrow", "validity.feather"] {
            touch(dir.path(), name);
        }
        let relations = discover_relations(dir.path()).unwrap();
        assert_eq!(relations[0].path, dir.path().join("validity.feather"));
    }

    #[test]
    fn test_other_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "manifest.json");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "neurocog.csv");
        std::fs::create_dir(dir.path().join("nested.csv")).unwrap();
        let relations = discover_relations(dir.path()).unwrap();
        let names: Vec<&str> = relations.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["neurocog"]);
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = discover_relations(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, QueryError::Discovery { .. }));
    }
}
