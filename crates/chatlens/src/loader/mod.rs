use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::Document;

pub const JSON_EXTENSION: &str = ".json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub source_file: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOutcome {
    pub documents: Vec<Document>,
    pub failures: Vec<LoadFailure>,
}

impl LoadOutcome {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.documents.len() + self.failures.len()
    }
}

/// Lists regular files in `dir` whose name ends in `.json`, sorted by path.
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read data directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("failed to enumerate data directory: {}", dir.display()))?;
    entries.sort_by_key(|entry| entry.path());

    Ok(entries
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_json_name(path))
        .collect())
}

/// Loads every JSON file in `dir`. A file that cannot be read or parsed is
/// recorded as a failure and the rest of the batch still loads.
pub fn load_documents(dir: &Path) -> Result<LoadOutcome> {
    let mut outcome = LoadOutcome::default();

    for path in list_json_files(dir)? {
        let source_file = file_name(&path);
        match load_document(&path) {
            Ok(content) => {
                debug!(source_file = %source_file, "loaded chat log");
                outcome.documents.push(Document::new(source_file, content));
            }
            Err(error) => {
                let message = format!("{error:#}");
                warn!(source_file = %source_file, error = %message, "failed to load chat log");
                outcome.failures.push(LoadFailure {
                    source_file,
                    message,
                });
            }
        }
    }

    Ok(outcome)
}

pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read chat log file: {}", path.display()))?;
    let value =
        serde_json::from_str::<Value>(&content).context("chat log payload must be valid JSON")?;
    if !value.is_object() {
        bail!("chat log root must be a JSON object, found {}", json_kind(&value));
    }
    Ok(value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn has_json_name(path: &Path) -> bool {
    path.file_name()
        .and_then(std::ffi::OsStr::to_str)
        .is_some_and(|name| name.ends_with(JSON_EXTENSION))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
