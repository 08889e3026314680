//! File and directory entry points.
//!
//! Input errors (unreadable path, malformed JSON) are returned as `Err`
//! before any import starts. Once a batch is assembled the run always yields
//! an [`Outcome`].

use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::partition::{ImportBatch, RawRecord};
use crate::{ImportError, ImportResult, Orchestrator, Outcome};

impl Orchestrator {
    /// Imports a combined export: one JSON object mapping batch names to
    /// record lists.
    pub async fn load_json(&self, path: impl AsRef<Path>) -> ImportResult<Outcome> {
        let path = path.as_ref();
        let bytes = read_file(path).await?;
        let batch = ImportBatch::from_json_slice(&bytes).map_err(|e| ImportError::InvalidJson {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if self.config().trace {
            info!("Loaded {} batches from {}", batch.len(), path.display());
        }
        Ok(self.run(batch).await)
    }

    /// Imports every visible regular file in `path`, one batch per file.
    pub async fn load_directory(&self, path: impl AsRef<Path>) -> ImportResult<Outcome> {
        let path = path.as_ref();
        let dir_error = |source: io::Error| ImportError::CannotReadDirectory {
            path: path.to_path_buf(),
            source,
        };

        let mut entries = tokio::fs::read_dir(path).await.map_err(dir_error)?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(dir_error)? {
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            if !entry.file_type().await.map_err(dir_error)?.is_file() {
                continue;
            }
            files.push(entry.path());
        }
        files.sort();
        debug!("Found {} files in {}", files.len(), path.display());

        self.load_files(&files).await
    }

    /// Imports an explicit list of per-batch files.
    ///
    /// The batch name is the file name without its extension, so
    /// `_Join:friends:Player:Player.json` is a relation batch and
    /// `Player.json` holds `Player` objects. Each file holds either a list of
    /// records or an object wrapping that list under the results key.
    pub async fn load_files<P: AsRef<Path>>(&self, files: &[P]) -> ImportResult<Outcome> {
        let mut batch = ImportBatch::new();
        for file in files {
            let path = file.as_ref();
            let name = batch_name(path)?;
            let bytes = read_file(path).await?;
            let records =
                parse_records(&bytes, &self.config().results_key).map_err(|reason| {
                    ImportError::InvalidJson {
                        path: path.to_path_buf(),
                        reason,
                    }
                })?;
            batch.insert(name, records);
        }
        Ok(self.run(batch).await)
    }
}

async fn read_file(path: &Path) -> ImportResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|source| ImportError::CannotLoadFile {
            path: path.to_path_buf(),
            source,
        })
}

fn batch_name(path: &Path) -> ImportResult<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ImportError::CannotLoadFile {
            path: PathBuf::from(path),
            source: io::Error::new(io::ErrorKind::InvalidInput, "file name is not a batch name"),
        })
}

fn parse_records(bytes: &[u8], results_key: &str) -> Result<Vec<RawRecord>, String> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
    match value {
        Value::Array(records) => Ok(records),
        Value::Object(mut wrapper) => match wrapper.remove(results_key) {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(format!("expected a \"{results_key}\" list of records")),
        },
        _ => Err("expected a list of records".to_string()),
    }
}
