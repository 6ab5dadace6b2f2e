//! Descriptive statistics over waste quantities.

use serde::Serialize;

use crate::{
    data::{WasteRecord, format_number, parse_quantity},
    loader::RawTable,
};

pub const SUMMARY_HEADERS: &[&str] = &[
    "column", "count", "mean", "median", "mode", "min", "q1", "q3", "max", "range", "std_dev",
];

/// Summary of a set of quantities. An empty set reports zero for every field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatsSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Most frequent value; ties go to the smallest.
    pub mode: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    /// Sample standard deviation (n - 1); zero below two values.
    pub std: f64,
    pub q1: f64,
    pub q3: f64,
}

impl StatsSummary {
    pub fn render_row(&self, label: &str) -> Vec<String> {
        vec![
            label.to_string(),
            self.count.to_string(),
            format_number(self.mean),
            format_number(self.median),
            format_number(self.mode),
            format_number(self.min),
            format_number(self.q1),
            format_number(self.q3),
            format_number(self.max),
            format_number(self.range),
            format_number(self.std),
        ]
    }
}

/// Per-column summary of the raw table, for columns holding only numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub summary: StatsSummary,
}

pub fn summarize(records: &[WasteRecord]) -> StatsSummary {
    summarize_values(records.iter().map(|r| r.quantity).collect())
}

pub fn summarize_values(mut values: Vec<f64>) -> StatsSummary {
    if values.is_empty() {
        return StatsSummary::default();
    }
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count < 2 {
        0.0
    } else {
        let squares = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        (squares / (count as f64 - 1.0)).sqrt()
    };
    let min = values[0];
    let max = values[count - 1];

    StatsSummary {
        count,
        mean,
        median: quantile(&values, 0.5),
        mode: mode(&values),
        min,
        max,
        range: max - min,
        std,
        q1: quantile(&values, 0.25),
        q3: quantile(&values, 0.75),
    }
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Longest run in ascending order; the first such run is the smallest value.
fn mode(sorted: &[f64]) -> f64 {
    let mut best = (sorted[0], 0usize);
    let mut run_start = 0usize;
    for idx in 1..=sorted.len() {
        if idx == sorted.len() || sorted[idx] != sorted[run_start] {
            let run = idx - run_start;
            if run > best.1 {
                best = (sorted[run_start], run);
            }
            run_start = idx;
        }
    }
    best.0
}

/// Summaries for every column whose non-null cells all parse as numbers,
/// skipping columns with no values at all.
pub fn describe_table(table: &RawTable) -> Vec<ColumnSummary> {
    (0..table.column_count())
        .filter_map(|idx| {
            let values = table
                .column_values(idx)
                .map(parse_quantity)
                .collect::<anyhow::Result<Vec<_>>>()
                .ok()?
                .into_iter()
                .flatten()
                .collect::<Vec<_>>();
            if values.is_empty() {
                return None;
            }
            Some(ColumnSummary {
                column: table.headers[idx].clone(),
                summary: summarize_values(values),
            })
        })
        .collect()
}
