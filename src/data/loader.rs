use std::io::Cursor;
use std::path::Path;

use anyhow::{bail, Context, Result};
use polars::prelude::*;

use super::schema::ltc_summary::REPORT_DATE;
use super::schema::parse_date;

// ---------------------------------------------------------------------------
// Delimited text → DataFrame
// ---------------------------------------------------------------------------

/// Decode comma-separated text with a header row into a frame of text
/// columns.
///
/// No type inference happens here: every cell keeps its source text. A
/// leading UTF-8 byte-order mark is ignored and header names are trimmed.
pub fn decode_csv(text: &str) -> Result<DataFrame> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let headers = read_headers(text)?;

    let mut frame = CsvReader::new(Cursor::new(text.as_bytes()))
        .has_header(true)
        .infer_schema(Some(0))
        .finish()
        .context("parsing CSV records")?;

    let raw: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    for (raw, trimmed) in raw.iter().zip(&headers) {
        if raw != trimmed {
            frame.rename(raw, trimmed)?;
        }
    }
    Ok(frame)
}

/// Trimmed header names; empty or repeated names are rejected.
fn read_headers(text: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    for (i, h) in headers.iter().enumerate() {
        if h.is_empty() {
            bail!("CSV column {i} has no name");
        }
        if headers[..i].contains(h) {
            bail!("duplicate CSV column '{h}'");
        }
    }
    Ok(headers)
}

/// ISO-8859-1 maps every byte to the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// Local report files
// ---------------------------------------------------------------------------

/// Load one of the long-term-care report files (ISO-8859-1 CSV).
///
/// Those exports carry a differently named date column in first position.
/// It is renamed to `Report Date` and every value is rewritten as an ISO
/// date, so both files share a join key whatever format each one used.
pub fn load_report_csv(path: &Path) -> Result<DataFrame> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut frame = decode_csv(&decode_latin1(&bytes))
        .with_context(|| format!("parsing {}", path.display()))?;

    let Some(first) = frame.get_column_names().first().map(|s| s.to_string()) else {
        bail!("{} has no columns", path.display());
    };
    if first != REPORT_DATE {
        frame.rename(&first, REPORT_DATE)?;
    }
    normalize_report_dates(&mut frame)
        .with_context(|| format!("reading dates of {}", path.display()))?;

    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        frame.height(),
        frame.get_column_names(),
        path.display()
    );
    Ok(frame)
}

fn normalize_report_dates(frame: &mut DataFrame) -> Result<()> {
    let raw = frame.column(REPORT_DATE)?.utf8()?;
    let mut dates: Vec<Option<String>> = Vec::with_capacity(raw.len());
    for (row, value) in raw.into_iter().enumerate() {
        let value = value.map(str::trim).filter(|s| !s.is_empty());
        let date = match value {
            None => None,
            Some(s) => {
                let d = parse_date(s)
                    .with_context(|| format!("row {row}: '{REPORT_DATE}' is not a date: {s}"))?;
                Some(d.to_string())
            }
        };
        dates.push(date);
    }
    frame.replace(REPORT_DATE, Series::new(REPORT_DATE, dates))?;
    Ok(())
}

/// Summary file left-joined with the vaccination-rate file on `Report Date`.
/// Every summary row is kept, in order.
pub fn load_ltc_tables(summary: &Path, vaccination: Option<&Path>) -> Result<DataFrame> {
    let summary_frame = load_report_csv(summary)?;
    match vaccination {
        Some(path) => {
            let rates = load_report_csv(path)?;
            summary_frame
                .left_join(&rates, [REPORT_DATE], [REPORT_DATE])
                .with_context(|| format!("joining {} onto {}", path.display(), summary.display()))
        }
        None => Ok(summary_frame),
    }
}
