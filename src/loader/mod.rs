//! CSV decoding into a [`RawTable`].

use crate::models::{Cell, RawTable};
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;

const BOM: char = '\u{feff}';

/// Decode any CSV stream with a header row.
///
/// Headers are trimmed (a leading BOM too); ragged rows are accepted and
/// missing trailing cells read as blank.
pub fn read_table<R: Read>(input: R) -> Result<RawTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(input);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches(BOM) } else { h };
            h.trim().to_string()
        })
        .collect();

    let mut table = RawTable::new(columns);
    for result in reader.records() {
        let record = result?;
        table.push_row(record.iter().map(Cell::from_field).collect());
    }

    Ok(table)
}

/// Load a CSV file from disk.
pub fn load_table(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Could not open {:?}", path))?;
    let table = read_table(file).with_context(|| format!("Malformed CSV in {:?}", path))?;

    debug!("{:?}: {} columns, {} rows", path, table.columns.len(), table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_table_basic() {
        let csv = "date,open,high,low,close\n25/04/05 9:15,100,110,95,105\n";
        let t = read_table(csv.as_bytes()).unwrap();
        assert_eq!(t.columns, vec!["date", "open", "high", "low", "close"]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.cell(0, 0), &Cell::from("25/04/05 9:15"));
    }

    #[test]
    fn test_header_only() {
        let t = read_table("Date,Open,High,Low,Close\n".as_bytes()).unwrap();
        assert!(t.is_empty());
        assert_eq!(t.columns.len(), 5);
    }

    #[test]
    fn test_bom_and_padded_headers() {
        let csv = "\u{feff}Date , Open,High,Low,Close\n2024-01-01,1,2,0.5,1.5\n";
        let t = read_table(csv.as_bytes()).unwrap();
        assert_eq!(t.columns[0], "Date");
        assert_eq!(t.columns[1], "Open");
    }

    #[test]
    fn test_ragged_and_blank_cells() {
        let csv = "date,open,high,low,close\n2024-01-01,1,,0.5\n";
        let t = read_table(csv.as_bytes()).unwrap();
        assert!(t.cell(0, 2).is_blank());
        assert!(t.cell(0, 4).is_blank());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_table(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(format!("{:#}", err).contains("Could not open"));
    }
}
