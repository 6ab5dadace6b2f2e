//! Raw table loading.
//!
//! Turns uploaded bytes into a [`RawTable`]: text decoding with Latin-1
//! fallback, CSV parsing, header normalization, and the column ceiling.

use std::path::Path;

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};

use crate::{config::PipelineConfig, data::normalize_column_name, io_utils};

/// Rows of raw text cells under normalized (trimmed, uppercase) headers.
/// Every row holds exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub encoding: &'static Encoding,
}

impl RawTable {
    /// Builds a UTF-8 table, normalizing headers and squaring rows to the
    /// header width.
    pub fn from_parts(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = headers
            .iter()
            .map(|h| normalize_column_name(h))
            .collect::<Vec<_>>();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|row| fit_row(row, width))
            .collect();
        Self {
            headers,
            rows,
            encoding: UTF_8,
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = normalize_column_name(name);
        self.headers.iter().position(|h| *h == wanted)
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[index].as_str())
    }

    pub fn head(&self, rows: usize) -> &[Vec<String>] {
        &self.rows[..rows.min(self.rows.len())]
    }
}

pub fn load_table(bytes: &[u8], delimiter: u8, max_columns: usize) -> Result<RawTable> {
    let (text, encoding) = io_utils::decode_with_fallback(bytes);
    let mut reader = io_utils::open_csv_reader(text.as_bytes(), delimiter, true);

    let mut headers = reader
        .headers()
        .context("Reading header row")?
        .iter()
        .map(normalize_column_name)
        .collect::<Vec<_>>();
    if headers.len() > max_columns {
        debug!(
            "Truncating {} column(s) to the first {}",
            headers.len(),
            max_columns
        );
        headers.truncate(max_columns);
    }

    let width = headers.len();
    let mut rows = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let row = record.iter().map(str::to_string).collect::<Vec<_>>();
        rows.push(fit_row(row, width));
    }

    Ok(RawTable {
        headers,
        rows,
        encoding,
    })
}

/// Reads `path` (or stdin for `-`) and loads it. An explicit `delimiter`
/// wins over the config, which wins over sniffing the header line.
pub fn load_path(path: &Path, delimiter: Option<u8>, config: &PipelineConfig) -> Result<RawTable> {
    let bytes = io_utils::read_input(path)?;
    let delimiter = match delimiter {
        Some(delimiter) => delimiter,
        None => config
            .delimiter_byte()?
            .unwrap_or_else(|| io_utils::sniff_delimiter(&bytes)),
    };
    let table = load_table(&bytes, delimiter, config.max_columns)
        .with_context(|| format!("Loading table from {path:?}"))?;
    info!(
        "Loaded {} row(s) x {} column(s) from '{}' (delimiter '{}', encoding {})",
        table.row_count(),
        table.column_count(),
        path.display(),
        crate::printable_delimiter(delimiter),
        table.encoding.name()
    );
    Ok(table)
}

fn fit_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.resize(width, String::new());
    row
}
