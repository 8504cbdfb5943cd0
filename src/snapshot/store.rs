use crate::model::{Snapshot, TestResult};
use log::{debug, info, warn};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Save a snapshot as a JSON array of results, creating parent directories as needed.
pub fn save(snapshot: &Snapshot, path: &Path) -> Result<(), SnapshotError> {
    write_json(&snapshot.results, path)?;
    info!(
        "Saved {} snapshot ({} tests) to {}",
        snapshot.name,
        snapshot.len(),
        path.display()
    );
    Ok(())
}

/// Load a snapshot from disk.
///
/// A missing file and an unparseable file both yield `None`: having no
/// baseline yet is a normal state for a new suite. Records inside a valid
/// array that do not look like test results are skipped.
pub fn load(path: &Path, name: &str) -> Option<Snapshot> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No {} snapshot at {}", name, path.display());
            return None;
        }
        Err(e) => {
            warn!("Could not read {} snapshot {}: {}", name, path.display(), e);
            return None;
        }
    };

    let records: Vec<serde_json::Value> = match serde_json::from_str(&content) {
        Ok(records) => records,
        Err(e) => {
            warn!(
                "Ignoring {} snapshot {}: not a JSON array of results ({})",
                name,
                path.display(),
                e
            );
            return None;
        }
    };

    let total = records.len();
    let results: Vec<TestResult> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(
                    "Skipping malformed record #{} in {}: {}",
                    index,
                    path.display(),
                    e
                );
                None
            }
        })
        .collect();

    debug!(
        "Loaded {} of {} records from {}",
        results.len(),
        total,
        path.display()
    );
    Some(Snapshot::new(name, results))
}

/// Pretty-print `value` as JSON into `path`.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| SnapshotError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(value).map_err(|source| SnapshotError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    std::fs::write(path, json).map_err(|source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    })
}
