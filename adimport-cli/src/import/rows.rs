//! Row ingestion from CSV and Excel files
//!
//! Thin I/O shells: both readers produce plain [`ImportRow`]s and the
//! core never touches files itself.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, Xlsx, open_workbook};
use log::debug;

use super::types::ImportRow;

/// Read rows from a CSV file. The first record is the header row.
pub fn read_rows_csv(path: &Path) -> Result<Vec<ImportRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    rows_from_csv_reader(file)
}

fn rows_from_csv_reader<R: Read>(reader: R) -> Result<Vec<ImportRow>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.context("Failed to read CSV record")?;
        let values: Vec<String> = record.iter().map(|v| v.to_string()).collect();
        if values.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        rows.push(ImportRow::from_headers(&headers, &values));
    }

    debug!("read {} rows from CSV", rows.len());
    Ok(rows)
}

/// Read rows from the first sheet of an Excel workbook. The first row
/// is the header row; cells are stringified.
pub fn read_rows_excel(path: &Path) -> Result<Vec<ImportRow>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .context("Excel file has no sheets")?
        .clone();

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    let mut sheet_rows = range.rows();
    let Some(header_row) = sheet_rows.next() else {
        bail!("Sheet '{}' is empty", sheet_name);
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|c| cell_to_string(c).trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for sheet_row in sheet_rows {
        let values: Vec<String> = sheet_row.iter().map(cell_to_string).collect();
        if values.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        rows.push(ImportRow::from_headers(&headers, &values));
    }

    debug!("read {} rows from sheet '{}'", rows.len(), sheet_name);
    Ok(rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // Check if it's a whole number
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        _ => String::new(),
    }
}

/// Dispatch on file extension (`.csv` vs `.xlsx`/`.xlsm`).
pub fn read_rows(path: &Path) -> Result<Vec<ImportRow>> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("csv") => read_rows_csv(path),
        Some("xlsx") | Some("xlsm") => read_rows_excel(path),
        _ => bail!(
            "Unsupported row file type: {} (expected .csv, .xlsx or .xlsm)",
            path.display()
        ),
    }
}
