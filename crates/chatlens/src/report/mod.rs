use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::FlatRecord;
use crate::table::Table;
use crate::utils::format::token_amount;
use crate::utils::text::{self, WordCount};

pub const TOP_WORDS_LIMIT: usize = 5;
pub const SUMMARY_ARTIFACT_NAME: &str = "summary.json";

const RULE_WIDTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    pub total_sessions: usize,
    pub total_interactions: usize,
    pub total_tokens: f64,
    pub average_tokens_per_interaction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileBreakdown {
    pub source_file: String,
    pub sessions: usize,
    pub interactions: usize,
    pub total_tokens: f64,
    pub average_response_length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub overall: OverallStats,
    pub files: Vec<FileBreakdown>,
    /// `None` when no row carries a timestamp.
    pub busiest_hour: Option<u8>,
    pub top_words: Vec<WordCount>,
}

#[must_use]
pub fn build_summary_report(table: &Table) -> SummaryReport {
    let records: Vec<&FlatRecord> = table.records().iter().collect();

    let files = table
        .source_files()
        .into_iter()
        .map(|source_file| {
            let rows = table.rows_for_source(source_file);
            let response_lengths: Vec<f64> = rows
                .iter()
                .map(|record| record.response_length() as f64)
                .collect();
            FileBreakdown {
                source_file: source_file.to_string(),
                sessions: distinct_sessions(&rows),
                interactions: rows.len(),
                total_tokens: total_tokens(&rows),
                average_response_length: mean(&response_lengths),
            }
        })
        .collect();

    let token_counts: Vec<f64> = records
        .iter()
        .map(|record| record.total_tokens)
        .collect();

    SummaryReport {
        overall: OverallStats {
            total_sessions: distinct_sessions(&records),
            total_interactions: records.len(),
            total_tokens: total_tokens(&records),
            average_tokens_per_interaction: mean(&token_counts),
        },
        files,
        busiest_hour: busiest_hour(records.iter().filter_map(|record| record.hour())),
        top_words: text::top_words(
            records.iter().map(|record| record.input_prompt.as_str()),
            TOP_WORDS_LIMIT,
        ),
    }
}

/// Hour with the most rows; the earliest hour wins a tie.
#[must_use]
pub fn busiest_hour<I>(hours: I) -> Option<u8>
where
    I: IntoIterator<Item = u8>,
{
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for hour in hours {
        *counts.entry(hour).or_default() += 1;
    }

    let mut busiest: Option<(u8, usize)> = None;
    for (hour, count) in counts {
        if busiest.is_none_or(|(_, best)| count > best) {
            busiest = Some((hour, count));
        }
    }
    busiest.map(|(hour, _)| hour)
}

#[must_use]
pub fn render_summary_report(report: &SummaryReport) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "CHAT DATA ANALYSIS SUMMARY REPORT");
    let _ = writeln!(out, "{rule}");

    let _ = writeln!(out);
    let _ = writeln!(out, "Overall Statistics:");
    let _ = writeln!(
        out,
        "   • Total Sessions Analyzed: {}",
        report.overall.total_sessions
    );
    let _ = writeln!(
        out,
        "   • Total Interactions: {}",
        report.overall.total_interactions
    );
    let _ = writeln!(
        out,
        "   • Total Tokens Used: {}",
        token_amount(report.overall.total_tokens)
    );
    let _ = writeln!(
        out,
        "   • Average Tokens per Interaction: {:.2}",
        report.overall.average_tokens_per_interaction
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "File Breakdown:");
    for file in &report.files {
        let _ = writeln!(out);
        let _ = writeln!(out, "   • File: {}", file.source_file);
        let _ = writeln!(out, "     - Sessions: {}", file.sessions);
        let _ = writeln!(out, "     - Total Interactions: {}", file.interactions);
        let _ = writeln!(
            out,
            "     - Total Tokens: {}",
            token_amount(file.total_tokens)
        );
        let _ = writeln!(
            out,
            "     - Average Response Length: {:.0} characters",
            file.average_response_length
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Time Analysis:");
    match report.busiest_hour {
        Some(hour) => {
            let _ = writeln!(out, "   • Busiest Hour: {hour}:00");
        }
        None => {
            let _ = writeln!(out, "   • Busiest Hour: n/a");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Top Topics (Most Common Words):");
    for entry in &report.top_words {
        let _ = writeln!(out, "   • '{}': {} times", entry.word, entry.count);
    }

    out
}

#[must_use]
pub fn summary_artifact_path(out_dir: &Path) -> PathBuf {
    out_dir.join(SUMMARY_ARTIFACT_NAME)
}

pub fn write_summary_artifact(path: &Path, report: &SummaryReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create summary artifact directory")?;
    }

    let encoded = serde_json::to_vec_pretty(report).context("failed to encode summary json")?;
    std::fs::write(path, encoded).context("failed to write summary artifact")
}

fn distinct_sessions(rows: &[&FlatRecord]) -> usize {
    rows.iter()
        .map(|record| record.session_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

fn total_tokens(rows: &[&FlatRecord]) -> f64 {
    rows.iter().map(|record| record.total_tokens).sum()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::busiest_hour;

    #[test]
    fn busiest_hour_picks_most_rows() {
        assert_eq!(busiest_hour([3, 3, 3, 7, 7]), Some(3));
        assert_eq!(busiest_hour([7, 22, 22, 7, 22]), Some(22));
    }

    #[test]
    fn busiest_hour_ties_go_to_earliest_hour() {
        assert_eq!(busiest_hour([18, 18, 4, 4]), Some(4));
    }

    #[test]
    fn busiest_hour_is_none_without_timestamps() {
        assert_eq!(busiest_hour(std::iter::empty()), None);
    }
}
