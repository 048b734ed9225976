//! CSV table loading
//!
//! Reads a comma-separated, UTF-8 file (optional byte-order mark) into a
//! [`CsvTable`]. The first record is the header and is mandatory; short
//! rows are padded with empty cells and cells beyond the header width are
//! ignored. Duplicate headers are tolerated with last-occurrence-wins
//! resolution, and logged, since they lose data.

use crate::types::{CompareError, CsvTable};
use csv::ReaderBuilder;
use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Load a headered CSV file into memory
pub fn load_csv(path: &Path) -> Result<CsvTable, CompareError> {
    let display = path.display().to_string();

    let bytes = fs::read(path).map_err(|source| CompareError::Io {
        path: display.clone(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| CompareError::InvalidEncoding {
        path: display.clone(),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| CompareError::Csv {
            path: display.clone(),
            source,
        })?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() {
        return Err(CompareError::MissingHeader { path: display });
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for h in &headers {
        if !seen.insert(h.as_str()) {
            warn!("duplicate header {h:?} in {display}; last occurrence wins");
        }
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| CompareError::Csv {
            path: display.clone(),
            source,
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!("loaded {display}: {} rows, {} columns", rows.len(), headers.len());
    Ok(CsvTable::from_parts(display, headers, rows))
}
