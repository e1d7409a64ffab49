use std::collections::HashSet;

use anyhow::{Context, Result};

use crate::models::{Document, FlatRecord, RawRecord};
use crate::utils::time::parse_timestamp;

/// All flattened chat turns, in document, session and turn order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    records: Vec<FlatRecord>,
}

impl Table {
    #[must_use]
    pub fn new(records: Vec<FlatRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[FlatRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct source files in first-appearance order.
    #[must_use]
    pub fn source_files(&self) -> Vec<&str> {
        unique_in_order(self.records.iter().map(|record| record.source_file.as_str()))
    }

    #[must_use]
    pub fn rows_for_source(&self, source_file: &str) -> Vec<&FlatRecord> {
        self.records
            .iter()
            .filter(|record| record.source_file == source_file)
            .collect()
    }
}

/// Distinct session ids across `records`, in first-appearance order.
#[must_use]
pub fn session_ids<'a>(records: &[&'a FlatRecord]) -> Vec<&'a str> {
    unique_in_order(records.iter().map(|record| record.session_id.as_str()))
}

/// Distinct session ids across `records`, numeric ids by value first and then
/// text ids in string order.
#[must_use]
pub fn sorted_session_ids<'a>(records: &[&'a FlatRecord]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut sessions: Vec<&FlatRecord> = records
        .iter()
        .copied()
        .filter(|record| seen.insert(record.session_id.as_str()))
        .collect();
    sessions.sort_by(|left, right| left.session_key.compare(&right.session_key));
    sessions
        .into_iter()
        .map(|record| record.session_id.as_str())
        .collect()
}

fn unique_in_order<'a, I>(values: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(*value))
        .collect()
}

/// One record per chat turn across all documents.
#[must_use]
pub fn flatten_documents(documents: &[Document]) -> Vec<RawRecord> {
    let mut records = Vec::new();
    for document in documents {
        for session in document.sessions() {
            for turn in &session.turns {
                records.push(RawRecord::from_turn(&document.source_file, &session, turn));
            }
        }
    }
    records
}

/// Parses both timestamp columns. One unparseable value fails the whole build.
pub fn build_table(records: Vec<RawRecord>) -> Result<Table> {
    let mut rows = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let timestamp = parse_timestamp(&record.timestamp).with_context(|| {
            format!(
                "failed to parse `timestamp` at row {index} (source_file={} session_id={} value={:?})",
                record.source_file, record.session_id, record.timestamp
            )
        })?;
        let session_datetime = parse_timestamp(&record.session_datetime).with_context(|| {
            format!(
                "failed to parse `session_datetime` at row {index} (source_file={} session_id={} value={:?})",
                record.source_file, record.session_id, record.session_datetime
            )
        })?;

        rows.push(FlatRecord {
            user_id: record.user_id,
            project_id: record.project_id,
            session_id: record.session_id,
            session_key: record.session_key,
            session_datetime,
            session_total_tokens: record.session_total_tokens,
            source_file: record.source_file,
            input_prompt: record.input_prompt,
            output_response: record.output_response,
            timestamp,
            input_tokens: record.input_tokens,
            output_tokens: record.output_tokens,
            total_tokens: record.total_tokens,
        });
    }

    Ok(Table::new(rows))
}

pub fn table_from_documents(documents: &[Document]) -> Result<Table> {
    build_table(flatten_documents(documents))
}
