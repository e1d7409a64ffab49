//! Per-source-file chart datasets and the artifacts rendered from them.
//!
//! Each chart is backed by a pure dataset function over a file's rows so the
//! aggregation can be checked without reading images back.

pub mod render;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::models::FlatRecord;
use crate::table::{Table, session_ids, sorted_session_ids};
use crate::utils::kde::{self, DensityCurve};
use crate::utils::text::{self, WordCount};

pub const COMMON_WORDS_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifactLayout {
    pub dir: PathBuf,
    pub interaction_frequency: PathBuf,
    pub token_distribution: PathBuf,
    pub common_words: PathBuf,
    pub response_length: PathBuf,
    pub activity_heatmap: PathBuf,
}

impl ChartArtifactLayout {
    #[must_use]
    pub fn files(&self) -> [&Path; 5] {
        [
            self.interaction_frequency.as_path(),
            self.token_distribution.as_path(),
            self.common_words.as_path(),
            self.response_length.as_path(),
            self.activity_heatmap.as_path(),
        ]
    }
}

/// `<out_dir>/<file stem>/` plus the five fixed artifact names.
#[must_use]
pub fn build_artifact_layout(out_dir: &Path, source_file: &str) -> ChartArtifactLayout {
    let stem = Path::new(source_file)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| source_file.to_string());
    let dir = out_dir.join(stem);

    ChartArtifactLayout {
        interaction_frequency: dir.join("multi_session_interaction_frequency.svg"),
        token_distribution: dir.join("multi_session_token_distribution.svg"),
        common_words: dir.join("common_words_analysis.svg"),
        response_length: dir.join("multi_session_response_length.svg"),
        activity_heatmap: dir.join("session_activity_heatmap.svg"),
        dir,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHourlySeries {
    pub session_id: String,
    /// `(hour, rows)` for each hour that has at least one row, ascending.
    pub points: Vec<(u8, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionTokenTotals {
    pub session_id: String,
    pub input_tokens: f64,
    pub output_tokens: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionDensity {
    pub session_id: String,
    pub lengths: Vec<usize>,
    pub curve: Option<DensityCurve>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyActivity {
    pub hours: Vec<u8>,
    pub session_ids: Vec<String>,
    /// `counts[hour_index][session_index]`
    pub counts: Vec<Vec<usize>>,
}

impl HourlyActivity {
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.counts
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// Rows per hour-of-day for each session, sessions in first-appearance order.
#[must_use]
pub fn hourly_interactions(rows: &[&FlatRecord]) -> Vec<SessionHourlySeries> {
    session_ids(rows)
        .into_iter()
        .map(|session_id| {
            let mut per_hour: BTreeMap<u8, usize> = BTreeMap::new();
            for hour in rows
                .iter()
                .filter(|record| record.session_id == session_id)
                .filter_map(|record| record.hour())
            {
                *per_hour.entry(hour).or_default() += 1;
            }
            SessionHourlySeries {
                session_id: session_id.to_string(),
                points: per_hour.into_iter().collect(),
            }
        })
        .collect()
}

/// Input and output token sums per session, sorted by session id.
#[must_use]
pub fn session_token_totals(rows: &[&FlatRecord]) -> Vec<SessionTokenTotals> {
    sorted_session_ids(rows)
        .into_iter()
        .map(|session_id| {
            let (input_tokens, output_tokens) = rows
                .iter()
                .filter(|record| record.session_id == session_id)
                .fold((0.0, 0.0), |(input, output), record| {
                    (input + record.input_tokens, output + record.output_tokens)
                });
            SessionTokenTotals {
                session_id: session_id.to_string(),
                input_tokens,
                output_tokens,
            }
        })
        .collect()
}

/// Most frequent non-stop words across the rows' prompts.
#[must_use]
pub fn common_words(rows: &[&FlatRecord], limit: usize) -> Vec<WordCount> {
    text::top_words(rows.iter().map(|record| record.input_prompt.as_str()), limit)
}

/// Response character lengths and their density curve, per session.
#[must_use]
pub fn response_length_densities(rows: &[&FlatRecord]) -> Vec<SessionDensity> {
    session_ids(rows)
        .into_iter()
        .map(|session_id| {
            let lengths: Vec<usize> = rows
                .iter()
                .filter(|record| record.session_id == session_id)
                .map(|record| record.response_length())
                .collect();
            let samples: Vec<f64> = lengths.iter().map(|&length| length as f64).collect();
            let curve = kde::gaussian_kde(&samples, kde::DEFAULT_GRID_SIZE, kde::DEFAULT_CUT);
            if curve.is_none() {
                debug!(
                    session_id,
                    samples = samples.len(),
                    "skipping density curve: needs two or more distinct lengths"
                );
            }
            SessionDensity {
                session_id: session_id.to_string(),
                lengths,
                curve,
            }
        })
        .collect()
}

/// Hour × session cross-tab of row counts. Rows without a timestamp are
/// left out; hours and sessions are both ascending.
#[must_use]
pub fn hourly_activity(rows: &[&FlatRecord]) -> HourlyActivity {
    let mut cells: BTreeMap<(u8, &str), usize> = BTreeMap::new();
    for record in rows {
        if let Some(hour) = record.hour() {
            *cells.entry((hour, record.session_id.as_str())).or_default() += 1;
        }
    }

    let mut hours: Vec<u8> = cells.keys().map(|(hour, _)| *hour).collect();
    hours.dedup();
    let timed: Vec<&FlatRecord> = rows
        .iter()
        .copied()
        .filter(|record| record.timestamp.is_some())
        .collect();
    let sessions = sorted_session_ids(&timed);

    let counts = hours
        .iter()
        .map(|hour| {
            sessions
                .iter()
                .map(|session_id| cells.get(&(*hour, *session_id)).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    HourlyActivity {
        hours,
        session_ids: sessions.into_iter().map(str::to_string).collect(),
        counts,
    }
}

/// Writes the five charts for `source_file` under `out_dir`.
pub fn generate_charts(
    table: &Table,
    source_file: &str,
    out_dir: &Path,
) -> Result<ChartArtifactLayout> {
    let layout = build_artifact_layout(out_dir, source_file);
    std::fs::create_dir_all(&layout.dir).with_context(|| {
        format!(
            "failed to create chart directory: {}",
            layout.dir.display()
        )
    })?;

    let rows = table.rows_for_source(source_file);

    render::render_interaction_frequency(
        &layout.interaction_frequency,
        &hourly_interactions(&rows),
    )
    .context("failed to render interaction frequency chart")?;
    render::render_token_distribution(&layout.token_distribution, &session_token_totals(&rows))
        .context("failed to render token distribution chart")?;
    render::render_common_words(
        &layout.common_words,
        &common_words(&rows, COMMON_WORDS_LIMIT),
    )
    .context("failed to render common words chart")?;
    render::render_response_length(&layout.response_length, &response_length_densities(&rows))
        .context("failed to render response length chart")?;
    render::render_activity_heatmap(&layout.activity_heatmap, &hourly_activity(&rows))
        .context("failed to render activity heatmap")?;

    Ok(layout)
}
