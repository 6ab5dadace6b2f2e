//! I/O utilities for reading raw input bytes, decoding text, and building CSV
//! readers and writers.
//!
//! All file I/O in waste-stats flows through this module. It provides:
//!
//! - **Delimiter resolution**: header-line sniffing between comma and
//!   semicolon, with manual override support.
//! - **Decoding**: UTF-8 first, falling back to Latin-1 via `encoding_rs`.
//!   The fallback maps every byte, so decoding never fails.
//! - **Reader/writer construction**: `open_csv_reader` and `open_csv_writer`.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::debug;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const SEMICOLON_DELIMITER: u8 = b';';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if is_dash(path) {
        std::io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Reading input from stdin")?;
    } else {
        File::open(path)
            .with_context(|| format!("Opening input file {path:?}"))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    Ok(bytes)
}

/// Picks `;` when the header line carries more semicolons than commas.
/// Separators inside double-quoted fields are not counted.
pub fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes
        .split(|b| *b == b'\n')
        .next()
        .unwrap_or_default();
    let mut quoted = false;
    let (mut commas, mut semicolons) = (0usize, 0usize);
    for byte in header {
        match byte {
            b'"' => quoted = !quoted,
            b',' if !quoted => commas += 1,
            b';' if !quoted => semicolons += 1,
            _ => {}
        }
    }
    if semicolons > commas {
        SEMICOLON_DELIMITER
    } else {
        DEFAULT_CSV_DELIMITER
    }
}

/// Decodes strictly as `encoding`, dropping only that encoding's own BOM.
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_with_fallback(bytes: &[u8]) -> (String, &'static Encoding) {
    match decode_bytes(bytes, UTF_8) {
        Ok(text) => (text, UTF_8),
        Err(err) => {
            // encoding_rs serves the latin1/iso-8859-1 labels with windows-1252
            debug!("{err}; retrying with {}", WINDOWS_1252.name());
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            (text.into_owned(), WINDOWS_1252)
        }
    }
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8, has_headers: bool) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(has_headers)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_writer(path: Option<&Path>, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let writer: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    };

    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    Ok(builder.from_writer(writer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_prefers_semicolon_when_dominant() {
        assert_eq!(sniff_delimiter(b"REG_NAT;QRESIDUOS_DOM\nLIMA;1,5\n"), b';');
        assert_eq!(sniff_delimiter(b"REG_NAT,QRESIDUOS_DOM\nLIMA;1\n"), b',');
        assert_eq!(sniff_delimiter(b""), b',');
    }

    #[test]
    fn sniff_ignores_separators_inside_quotes() {
        assert_eq!(
            sniff_delimiter(b"REG_NAT;\"QRESIDUOS, A\";\"QRESIDUOS, B\"\nLIMA;1;2\n"),
            b';'
        );
        assert_eq!(sniff_delimiter(b"REG_NAT,\"TIPO;RESIDUO\"\nLIMA,x\n"), b',');
    }

    #[test]
    fn decode_falls_back_to_latin1_on_invalid_utf8() {
        let bytes = b"REGI\xd3N\nAPUR\xcdMAC\n";
        let (text, encoding) = decode_with_fallback(bytes);
        assert_eq!(encoding, WINDOWS_1252);
        assert_eq!(text, "REGIÓN\nAPURÍMAC\n");
    }

    #[test]
    fn decode_keeps_valid_utf8() {
        let (text, encoding) = decode_with_fallback("AÑO\n".as_bytes());
        assert_eq!(encoding, UTF_8);
        assert_eq!(text, "AÑO\n");
    }

    #[test]
    fn decode_strips_utf8_bom_only() {
        let (text, encoding) = decode_with_fallback(b"\xef\xbb\xbfREG_NAT\n");
        assert_eq!(encoding, UTF_8);
        assert_eq!(text, "REG_NAT\n");
    }

    #[test]
    fn utf16_bom_is_not_sniffed_as_utf16() {
        let (text, encoding) = decode_with_fallback(b"\xff\xfeR\x00");
        assert_eq!(encoding, WINDOWS_1252);
        assert_eq!(text, "\u{ff}\u{fe}R\u{0}");
        assert!(decode_bytes(b"\xfe\xffR", UTF_8).is_err());
    }
}
