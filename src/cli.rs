use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{data::GroupKey, filter::Selection};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Reshape, filter, and summarize household-waste composition data",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the first rows of the loaded table
    Preview(PreviewArgs),
    /// Summarize every numeric column of the loaded table
    Describe(DescribeArgs),
    /// Summarize quantities for a waste type and/or region
    Stats(StatsArgs),
    /// Total quantities per region or waste type
    Groups(GroupsArgs),
    /// Find the region (or waste type) with the largest total for a waste type
    Top(TopArgs),
    /// List the waste types and regions available for selection
    Options(OptionsArgs),
    /// Write the selected records as CSV
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', ';', 'tab', '|'); sniffed when omitted
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// YAML file overriding column aliases, wide-column prefix, or column ceiling
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SelectionArgs {
    /// Waste type to select (exact, case-sensitive)
    #[arg(short = 't', long = "waste-type")]
    pub waste_type: Option<String>,
    /// Region to select (exact, case-sensitive)
    #[arg(short = 'r', long = "region")]
    pub region: Option<String>,
}

impl SelectionArgs {
    pub fn selection(&self) -> Selection {
        Selection::new(self.waste_type.clone(), self.region.clone())
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum GroupBy {
    #[default]
    Region,
    WasteType,
}

impl From<GroupBy> for GroupKey {
    fn from(value: GroupBy) -> Self {
        match value {
            GroupBy::Region => GroupKey::Region,
            GroupBy::WasteType => GroupKey::WasteType,
        }
    }
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Number of rows to display
    #[arg(long, default_value_t = 5)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub selection: SelectionArgs,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub selection: SelectionArgs,
    /// Field to group by
    #[arg(long, value_enum, default_value = "region")]
    pub by: GroupBy,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct TopArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Waste type to rank groups for
    #[arg(short = 't', long = "waste-type")]
    pub waste_type: String,
    /// Field to group by
    #[arg(long, value_enum, default_value = "region")]
    pub by: GroupBy,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub selection: SelectionArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter to use for output (defaults to ',')
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
