//! CSV export of a record set: header row, no index column.

use std::{io::Write, path::Path};

use anyhow::{Context, Result};

use crate::{data::WasteRecord, io_utils};

/// Export header. Each name is also a default column alias, so an export
/// loads back as a long-format table.
pub const EXPORT_HEADERS: [&str; 3] = ["REGION", "WASTE_TYPE", "QUANTITY"];

pub fn write_records<W: Write>(writer: &mut csv::Writer<W>, records: &[WasteRecord]) -> Result<()> {
    writer
        .write_record(EXPORT_HEADERS)
        .context("Writing export header")?;
    for record in records {
        // f64 Display is the shortest form that parses back to the same value
        let quantity = record.quantity.to_string();
        writer
            .write_record([
                record.region.as_str(),
                record.waste_type.as_str(),
                quantity.as_str(),
            ])
            .context("Writing export row")?;
    }
    writer.flush().context("Flushing export")?;
    Ok(())
}

pub fn export_records(path: Option<&Path>, delimiter: u8, records: &[WasteRecord]) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(path, delimiter)?;
    write_records(&mut writer, records)
}

pub fn records_to_csv(records: &[WasteRecord], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    write_records(&mut writer, records)?;
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("Finishing export buffer: {}", err.error()))?;
    String::from_utf8(bytes).context("Export buffer is not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::PipelineConfig, loader, reshape};

    #[test]
    fn export_has_header_and_no_index() {
        let csv = records_to_csv(&[WasteRecord::new("LIMA", "QRESIDUOS_DOM", 10.0)], b',')
            .expect("export");
        assert_eq!(csv, "REGION,WASTE_TYPE,QUANTITY\nLIMA,QRESIDUOS_DOM,10\n");
    }

    #[test]
    fn export_loads_back_as_long_table() {
        let records = vec![
            WasteRecord::new("Junín, Huancayo", "QRESIDUOS_2019", 0.1),
            WasteRecord::new("CUSCO", "QRESIDUOS_2020", 1234.5678),
        ];
        let csv = records_to_csv(&records, b';').expect("export");
        let table = loader::load_table(csv.as_bytes(), b';', 46).expect("reload");
        let reloaded =
            reshape::records_from_table(&table, &PipelineConfig::default()).expect("records");
        assert_eq!(reloaded, records);
    }
}
