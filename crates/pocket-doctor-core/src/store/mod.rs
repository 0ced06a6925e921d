//! JSON persistence for reports.
//!
//! Reports are the only persisted state: a combined collection file, or a
//! directory with one single-report document per file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::models::{Report, ReportCollection};

/// Extensions scanned in a reports directory.
const REPORT_EXTENSIONS: [&str; 2] = ["json", "txt"];

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

fn read_to_string(path: &Path) -> StoreResult<String> {
    fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and deserialize a JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let data = read_to_string(path)?;
    serde_json::from_str(&data).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a value as pretty JSON, overwriting the file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a combined report collection.
pub fn load_collection(path: &Path) -> StoreResult<ReportCollection> {
    let collection: ReportCollection = read_json(path)?;
    tracing::debug!(path = %path.display(), reports = collection.len(), "Loaded report collection");
    Ok(collection)
}

pub fn save_collection(path: &Path, collection: &ReportCollection) -> StoreResult<()> {
    write_json(path, collection)
}

pub fn save_report(path: &Path, report: &Report) -> StoreResult<()> {
    write_json(path, report)
}

/// Files in `dir` with one of `extensions`, sorted by file name.
fn list_files(dir: &Path, extensions: &[&str]) -> StoreResult<Vec<PathBuf>> {
    let read_err = |source| StoreError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)));
        if path.is_file() && matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load every single-report document in a directory, in file-name order.
///
/// Files that are not valid report JSON are logged and skipped; the scan
/// continues with the remaining files.
pub fn load_reports_dir(dir: &Path) -> StoreResult<Vec<(PathBuf, Report)>> {
    let mut reports = Vec::new();

    for path in list_files(dir, &REPORT_EXTENSIONS)? {
        let data = read_to_string(&path)?;
        match serde_json::from_str::<Report>(&data) {
            Ok(mut report) => {
                if report.file.is_empty() {
                    report.file = file_name(&path);
                }
                reports.push((path, report));
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping file with invalid JSON");
            }
        }
    }

    Ok(reports)
}

/// Read every `.txt` file in a directory as `(file name, content)`.
pub fn read_text_files(dir: &Path) -> StoreResult<Vec<(String, String)>> {
    list_files(dir, &["txt"])?
        .into_iter()
        .map(|path| Ok((file_name(&path), read_to_string(&path)?)))
        .collect()
}

/// Treat the input as a path if such a file exists, otherwise as the text.
pub fn read_text_input(path_or_text: &str) -> StoreResult<String> {
    let path = Path::new(path_or_text);
    if path.is_file() {
        read_to_string(path)
    } else {
        Ok(path_or_text.to_string())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
