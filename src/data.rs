use std::fmt;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Cell spellings treated as missing, matching the defaults of common
/// dataframe CSV readers.
pub const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// One long-format row: a quantity of one waste type observed in one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteRecord {
    pub region: String,
    pub waste_type: String,
    pub quantity: f64,
}

impl WasteRecord {
    pub fn new(region: impl Into<String>, waste_type: impl Into<String>, quantity: f64) -> Self {
        Self {
            region: region.into(),
            waste_type: waste_type.into(),
            quantity,
        }
    }
}

/// Categorical field of a [`WasteRecord`] used for grouping and listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Region,
    WasteType,
}

impl GroupKey {
    pub fn of<'a>(&self, record: &'a WasteRecord) -> &'a str {
        match self {
            GroupKey::Region => &record.region,
            GroupKey::WasteType => &record.waste_type,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKey::Region => "region",
            GroupKey::WasteType => "waste_type",
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical form used for every header and column alias lookup.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_uppercase()
}

pub fn is_null_cell(value: &str) -> bool {
    let trimmed = value.trim();
    NULL_TOKENS.contains(&trimmed)
}

pub fn parse_quantity(value: &str) -> Result<Option<f64>> {
    if is_null_cell(value) {
        return Ok(None);
    }
    let trimmed = value.trim();
    let parsed: f64 = trimmed
        .parse()
        .with_context(|| format!("Failed to parse '{trimmed}' as quantity"))?;
    if !parsed.is_finite() {
        bail!("Quantity '{trimmed}' is not a finite number");
    }
    Ok(Some(parsed))
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}
