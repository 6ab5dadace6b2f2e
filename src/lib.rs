pub mod aggregate;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod filter;
pub mod io_utils;
pub mod loader;
pub mod reshape;
pub mod stats;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};
use serde::Serialize;

use crate::{
    cli::{Cli, Commands, InputArgs, OutputFormat},
    config::PipelineConfig,
    data::{GroupKey, WasteRecord},
    loader::RawTable,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("waste_stats", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Preview(args) => handle_preview(&args),
        Commands::Describe(args) => handle_describe(&args),
        Commands::Stats(args) => handle_stats(&args),
        Commands::Groups(args) => handle_groups(&args),
        Commands::Top(args) => handle_top(&args),
        Commands::Options(args) => handle_options(&args),
        Commands::Export(args) => handle_export(&args),
    }
}

fn load_input(args: &InputArgs) -> Result<(PipelineConfig, RawTable)> {
    let config = PipelineConfig::load_or_default(args.config.as_deref())?;
    debug!("Pipeline config: {config:?}");
    let table = loader::load_path(&args.input, args.delimiter, &config)?;
    Ok((config, table))
}

fn load_records(args: &InputArgs) -> Result<Vec<WasteRecord>> {
    let (config, raw) = load_input(args)?;
    let records = reshape::records_from_table(&raw, &config)
        .with_context(|| format!("Reshaping records from {:?}", args.input))?;
    debug!("Reshaped {} row(s) into {} record(s)", raw.row_count(), records.len());
    Ok(records)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Serializing JSON output")?;
    println!("{rendered}");
    Ok(())
}

fn handle_preview(args: &cli::PreviewArgs) -> Result<()> {
    let (_, raw) = load_input(&args.input)?;
    let rows = raw.head(args.rows);
    table::print_table(&raw.headers, rows);
    info!("Displayed {} row(s) from {:?}", rows.len(), args.input.input);
    Ok(())
}

fn handle_describe(args: &cli::DescribeArgs) -> Result<()> {
    let (_, raw) = load_input(&args.input)?;
    let described = stats::describe_table(&raw);
    match args.format {
        OutputFormat::Json => print_json(&described)?,
        OutputFormat::Table => {
            let rows = described
                .iter()
                .map(|column| column.summary.render_row(&column.column))
                .collect::<Vec<_>>();
            table::print_table(&table::headers(stats::SUMMARY_HEADERS), &rows);
        }
    }
    info!("Described {} numeric column(s)", described.len());
    Ok(())
}

fn handle_stats(args: &cli::StatsArgs) -> Result<()> {
    let records = load_records(&args.input)?;
    let selection = args.selection.selection();
    let selected = filter::filter_selection(&records, &selection);
    let summary = stats::summarize(&selected);
    match args.format {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Table => table::print_table(
            &table::headers(stats::SUMMARY_HEADERS),
            &[summary.render_row("quantity")],
        ),
    }
    info!(
        "Summarized {} record(s) for {}",
        selected.len(),
        selection.describe()
    );
    Ok(())
}

fn handle_groups(args: &cli::GroupsArgs) -> Result<()> {
    let records = load_records(&args.input)?;
    let selection = args.selection.selection();
    let key = GroupKey::from(args.by);
    let aggregate = aggregate::sum_by_group(&filter::filter_selection(&records, &selection), key);
    match args.format {
        OutputFormat::Json => print_json(&aggregate)?,
        OutputFormat::Table => table::print_table(
            &table::headers(&[key.as_str(), "total"]),
            &aggregate.render_rows(),
        ),
    }
    info!(
        "Computed totals for {} {} group(s) over {}",
        aggregate.len(),
        key,
        selection.describe()
    );
    Ok(())
}

#[derive(Serialize)]
struct TopGroup<'a> {
    waste_type: &'a str,
    group_by: &'static str,
    key: String,
    total: f64,
}

fn handle_top(args: &cli::TopArgs) -> Result<()> {
    let records = load_records(&args.input)?;
    let key = GroupKey::from(args.by);
    let (winner, total) = aggregate::top_group_for(&records, &args.waste_type, key)
        .with_context(|| format!("Ranking {key} totals for waste type '{}'", args.waste_type))?;
    match args.format {
        OutputFormat::Json => print_json(&TopGroup {
            waste_type: &args.waste_type,
            group_by: key.as_str(),
            key: winner.clone(),
            total,
        })?,
        OutputFormat::Table => table::print_table(
            &table::headers(&["waste_type", key.as_str(), "total"]),
            &[vec![
                args.waste_type.clone(),
                winner.clone(),
                data::format_number(total),
            ]],
        ),
    }
    info!(
        "{key} with the most '{}' is '{winner}' ({})",
        args.waste_type,
        data::format_number(total)
    );
    Ok(())
}

fn handle_options(args: &cli::OptionsArgs) -> Result<()> {
    let records = load_records(&args.input)?;
    let waste_types = filter::distinct(&records, GroupKey::WasteType);
    let regions = filter::distinct(&records, GroupKey::Region);
    let rows = waste_types
        .iter()
        .map(|value| vec!["waste_type".to_string(), value.clone()])
        .chain(
            regions
                .iter()
                .map(|value| vec!["region".to_string(), value.clone()]),
        )
        .collect::<Vec<_>>();
    table::print_table(&table::headers(&["field", "value"]), &rows);
    info!(
        "Listed {} waste type(s) and {} region(s)",
        waste_types.len(),
        regions.len()
    );
    Ok(())
}

fn handle_export(args: &cli::ExportArgs) -> Result<()> {
    let records = load_records(&args.input)?;
    let selection = args.selection.selection();
    let selected = filter::filter_selection(&records, &selection);
    let delimiter = args
        .output_delimiter
        .unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
    export::export_records(args.output.as_deref(), delimiter, &selected)
        .with_context(|| format!("Exporting records for {}", selection.describe()))?;
    info!(
        "Exported {} record(s) for {} to {}",
        selected.len(),
        selection.describe(),
        args.output
            .as_deref()
            .filter(|path| !io_utils::is_dash(path))
            .map(|path| format!("{path:?}"))
            .unwrap_or_else(|| "stdout".into())
    );
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
