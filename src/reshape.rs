//! Wide-to-long reshaping.
//!
//! Source exports arrive in one of two conventions:
//!
//! - **Wide**: a region column (`REG_NAT`) plus one quantity column per waste
//!   type or year, all sharing a prefix such as `QRESIDUOS`.
//! - **Long**: explicit region, waste-type and quantity columns.
//!
//! Both are turned into [`WasteRecord`]s. Records come out source-row-major,
//! then in column order, and cells holding no quantity are dropped.

use log::debug;

use crate::{
    config::PipelineConfig,
    data::{WasteRecord, is_null_cell, normalize_column_name, parse_quantity},
    error::PipelineError,
    loader::RawTable,
};

/// Which convention a table follows, with the resolved column positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLayout {
    Long {
        region: usize,
        waste_type: usize,
        quantity: usize,
    },
    Wide {
        region: usize,
        quantity_columns: Vec<usize>,
    },
}

/// Positions of every column whose normalized name starts with `prefix`.
pub fn wide_columns(table: &RawTable, prefix: &str) -> Vec<usize> {
    let prefix = normalize_column_name(prefix);
    table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, header)| !prefix.is_empty() && header.starts_with(&prefix))
        .map(|(idx, _)| idx)
        .collect()
}

/// Unpivots every `prefix` column into one record per non-null cell, with
/// `waste_type` set to the column name and `region` read from `group_key`.
pub fn melt(
    table: &RawTable,
    group_key: &str,
    prefix: &str,
) -> Result<Vec<WasteRecord>, PipelineError> {
    let region = table.column_index(group_key);
    let quantity_columns = wide_columns(table, prefix);

    let mut missing = Vec::new();
    if region.is_none() {
        missing.push(normalize_column_name(group_key));
    }
    if quantity_columns.is_empty() {
        missing.push(format!("{}*", normalize_column_name(prefix)));
    }
    match region {
        Some(region) if missing.is_empty() => melt_columns(table, region, &quantity_columns),
        _ => Err(PipelineError::MissingColumns { missing }),
    }
}

fn melt_columns(
    table: &RawTable,
    region: usize,
    quantity_columns: &[usize],
) -> Result<Vec<WasteRecord>, PipelineError> {
    let mut records = Vec::with_capacity(table.row_count() * quantity_columns.len());
    let mut skipped = 0usize;
    for (row_idx, row) in table.rows.iter().enumerate() {
        if is_null_cell(&row[region]) {
            skipped += 1;
            continue;
        }
        for &column in quantity_columns {
            let header = &table.headers[column];
            if let Some(quantity) = quantity_at(row, row_idx, column, header)? {
                records.push(WasteRecord::new(row[region].clone(), header.clone(), quantity));
            }
        }
    }
    if skipped > 0 {
        debug!("Skipped {skipped} row(s) without a region");
    }
    Ok(records)
}

/// Reads records from a table that already has one row per
/// (region, waste type, quantity) triple.
pub fn from_long(
    table: &RawTable,
    region: &str,
    waste_type: &str,
    quantity: &str,
) -> Result<Vec<WasteRecord>, PipelineError> {
    let positions = [region, waste_type, quantity].map(|name| table.column_index(name));
    let missing = [region, waste_type, quantity]
        .iter()
        .zip(positions.iter())
        .filter(|(_, position)| position.is_none())
        .map(|(name, _)| normalize_column_name(name))
        .collect::<Vec<_>>();
    match positions {
        [Some(region), Some(waste_type), Some(quantity)] => {
            long_rows(table, region, waste_type, quantity)
        }
        _ => Err(PipelineError::MissingColumns { missing }),
    }
}

fn long_rows(
    table: &RawTable,
    region: usize,
    waste_type: usize,
    quantity: usize,
) -> Result<Vec<WasteRecord>, PipelineError> {
    let mut records = Vec::with_capacity(table.row_count());
    let header = &table.headers[quantity];
    for (row_idx, row) in table.rows.iter().enumerate() {
        if is_null_cell(&row[region]) || is_null_cell(&row[waste_type]) {
            continue;
        }
        if let Some(value) = quantity_at(row, row_idx, quantity, header)? {
            records.push(WasteRecord::new(
                row[region].clone(),
                row[waste_type].clone(),
                value,
            ));
        }
    }
    Ok(records)
}

fn quantity_at(
    row: &[String],
    row_idx: usize,
    column: usize,
    header: &str,
) -> Result<Option<f64>, PipelineError> {
    let raw = &row[column];
    parse_quantity(raw).map_err(|_| PipelineError::InvalidQuantity {
        // 1-based, counting the header line
        row: row_idx + 2,
        column: header.to_string(),
        value: raw.clone(),
    })
}

/// Resolves the region column by alias, then prefers the long convention
/// when both a waste-type and a quantity alias are present.
pub fn detect_layout(
    table: &RawTable,
    config: &PipelineConfig,
) -> Result<TableLayout, PipelineError> {
    let Some(region) = config.region_column(table) else {
        return Err(PipelineError::MissingColumns {
            missing: vec![alias_list(&config.region_columns)],
        });
    };
    if let (Some(waste_type), Some(quantity)) =
        (config.waste_type_column(table), config.quantity_column(table))
    {
        return Ok(TableLayout::Long {
            region,
            waste_type,
            quantity,
        });
    }
    let quantity_columns = wide_columns(table, &config.wide_prefix);
    if quantity_columns.is_empty() {
        return Err(PipelineError::MissingColumns {
            missing: vec![
                format!(
                    "{} and {}",
                    alias_list(&config.waste_type_columns),
                    alias_list(&config.quantity_columns)
                ),
                format!("or {}*", normalize_column_name(&config.wide_prefix)),
            ],
        });
    }
    Ok(TableLayout::Wide {
        region,
        quantity_columns,
    })
}

pub fn records_from_table(
    table: &RawTable,
    config: &PipelineConfig,
) -> Result<Vec<WasteRecord>, PipelineError> {
    let layout = detect_layout(table, config)?;
    debug!("Detected {layout:?}");
    match layout {
        TableLayout::Long {
            region,
            waste_type,
            quantity,
        } => long_rows(table, region, waste_type, quantity),
        TableLayout::Wide {
            region,
            quantity_columns,
        } => melt_columns(table, region, &quantity_columns),
    }
}

fn alias_list(aliases: &[String]) -> String {
    aliases
        .iter()
        .map(|alias| normalize_column_name(alias))
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::from_parts(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn melt_drops_null_cells_in_row_major_order() {
        let table = table(
            &["REG_NAT", "QRESIDUOS_2019", "QRESIDUOS_2020"],
            &[&["LIMA", "10", ""], &["CUSCO", "5", "7"]],
        );
        let records = melt(&table, "REG_NAT", "QRESIDUOS").expect("melt");
        assert_eq!(
            records,
            vec![
                WasteRecord::new("LIMA", "QRESIDUOS_2019", 10.0),
                WasteRecord::new("CUSCO", "QRESIDUOS_2019", 5.0),
                WasteRecord::new("CUSCO", "QRESIDUOS_2020", 7.0),
            ]
        );
    }

    #[test]
    fn melt_reports_every_missing_requirement() {
        let table = table(&["DISTRITO", "POB"], &[]);
        let err = melt(&table, "REG_NAT", "qresiduos").unwrap_err();
        assert_eq!(
            err,
            PipelineError::MissingColumns {
                missing: vec!["REG_NAT".into(), "QRESIDUOS*".into()]
            }
        );
    }

    #[test]
    fn melt_rejects_non_numeric_quantities() {
        let table = table(&["REG_NAT", "QRESIDUOS_DOM"], &[&["LIMA", "mucho"]]);
        let err = melt(&table, "REG_NAT", "QRESIDUOS").unwrap_err();
        assert_eq!(
            err,
            PipelineError::InvalidQuantity {
                row: 2,
                column: "QRESIDUOS_DOM".into(),
                value: "mucho".into()
            }
        );
    }

    #[test]
    fn melt_skips_rows_without_region() {
        let table = table(&["REG_NAT", "QRESIDUOS_DOM"], &[&["", "3"], &["PUNO", "4"]]);
        let records = melt(&table, "REG_NAT", "QRESIDUOS").expect("melt");
        assert_eq!(records, vec![WasteRecord::new("PUNO", "QRESIDUOS_DOM", 4.0)]);
    }

    #[test]
    fn from_long_keeps_type_values_verbatim() {
        let table = table(
            &["region", "tipo_residuo", "cantidad"],
            &[&["LIMA", "Plástico", "2.5"], &["LIMA", "Vidrio", "NA"]],
        );
        let records = from_long(&table, "REGION", "TIPO_RESIDUO", "CANTIDAD").expect("long");
        assert_eq!(records, vec![WasteRecord::new("LIMA", "Plástico", 2.5)]);
    }

    #[test]
    fn detect_layout_prefers_long_columns() {
        let config = PipelineConfig::default();
        let long = table(&["REGION", "TIPO_RESIDUO", "CANTIDAD", "QRESIDUOS_DOM"], &[]);
        assert_eq!(
            detect_layout(&long, &config).unwrap(),
            TableLayout::Long {
                region: 0,
                waste_type: 1,
                quantity: 2
            }
        );
        let wide = table(&["DEPARTAMENTO", "REG_NAT", "QRESIDUOS_DOM", "QRESIDUOS_NODOM"], &[]);
        assert_eq!(
            detect_layout(&wide, &config).unwrap(),
            TableLayout::Wide {
                region: 1,
                quantity_columns: vec![2, 3]
            }
        );
    }

    #[test]
    fn detect_layout_without_region_fails() {
        let config = PipelineConfig::default();
        let table = table(&["PROVINCIA", "QRESIDUOS_DOM"], &[]);
        assert!(matches!(
            detect_layout(&table, &config),
            Err(PipelineError::MissingColumns { .. })
        ));
    }
}
