//! CSV ingestion of upstream airport exports
//!
//! Reads the standard airports CSV export (header row naming at least the
//! six columns the record model carries), tolerating quoted fields with
//! embedded commas, quotes and newlines. Rows without an IATA code are
//! skipped up front so the generated layout only ever contains addressable
//! records; malformed coordinates degrade to `0.0` with a warning instead of
//! failing the whole run.

use airport_shard_lib::Airport;
use std::path::Path;

/// Column names required in the CSV header row.
const REQUIRED_COLUMNS: [&str; 6] = [
    "iata_code",
    "latitude_deg",
    "longitude_deg",
    "iso_country",
    "iso_region",
    "municipality",
];

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input has no header row")]
    EmptyInput,

    #[error("missing required column {name:?} in header row")]
    MissingColumn { name: &'static str },
}

/// Outcome of reading one CSV file.
#[derive(Debug)]
pub struct IngestReport {
    /// Records with a non-empty IATA code, in file order
    pub airports: Vec<Airport>,
    /// Data rows read (header excluded)
    pub rows: usize,
    /// Rows skipped for lacking an IATA code
    pub skipped_no_code: usize,
}

/// Read and filter an airports CSV file.
pub fn read_airports_csv(path: &Path) -> Result<IngestReport, IngestError> {
    let input = std::fs::read_to_string(path)?;
    ingest(&input)
}

fn ingest(input: &str) -> Result<IngestReport, IngestError> {
    let mut rows = parse_rows(input).into_iter();
    let header = rows.next().ok_or(IngestError::EmptyInput)?;

    let mut columns = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = header
            .iter()
            .position(|h| h == name)
            .ok_or(IngestError::MissingColumn { name })?;
    }
    let [iata, lat, lon, country, region, municipality] = columns;

    let mut report = IngestReport {
        airports: Vec::new(),
        rows: 0,
        skipped_no_code: 0,
    };
    for row in rows {
        report.rows += 1;
        let field = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
        let code = field(iata).trim();
        if code.is_empty() {
            report.skipped_no_code += 1;
            continue;
        }
        report.airports.push(Airport::new(
            code,
            parse_coordinate(field(lat), code),
            parse_coordinate(field(lon), code),
            field(country),
            field(region),
            field(municipality),
        ));
    }

    tracing::info!(
        rows = report.rows,
        airports = report.airports.len(),
        skipped = report.skipped_no_code,
        "ingested airports"
    );
    Ok(report)
}

fn parse_coordinate(value: &str, code: &str) -> f64 {
    match value.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            if !value.trim().is_empty() {
                tracing::warn!(code, value, "unparseable coordinate, using 0.0");
            }
            0.0
        }
    }
}

/// Split CSV text into rows of fields, honoring quoted fields that may
/// contain separators, escaped quotes (`""`) and line breaks.
fn parse_rows(input: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
        } else {
            match c {
                '"' if field.is_empty() => in_quotes = true,
                ',' => row.push(std::mem::take(&mut field)),
                '\r' => {}
                '\n' => {
                    row.push(std::mem::take(&mut field));
                    // Blank lines produce a single empty field; drop them
                    if row.len() > 1 || !row[0].is_empty() {
                        rows.push(std::mem::take(&mut row));
                    } else {
                        row.clear();
                    }
                }
                _ => field.push(c),
            }
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}
