//! CSV ingest.
//!
//! Turns a salary export into a [`Table`] without interpreting any values:
//! cleaning and typing happen later in the pipeline. Header names are
//! normalized (trimmed, lowercased, BOM stripped) and empty cells become nulls.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::domain::{Row, Table};
use crate::error::AppError;

/// Read a CSV file into a table.
pub fn read_table(path: &Path) -> Result<Table, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let table = read_table_from(file).map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;

    tracing::info!(path = %path.display(), rows = table.len(), columns = table.columns().len(), "read CSV");
    Ok(table)
}

/// Read CSV from any reader. Rows with a different number of fields than the
/// header are rejected.
pub fn read_table_from<R: Read>(reader: R) -> Result<Table, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(normalize_header_name)
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: 1-based line numbers, plus the header line.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(2, format!("CSV parse error on line {line}: {e}")))?;
        let row: Row = record
            .iter()
            .map(|cell| if cell.is_empty() { None } else { Some(cell.to_string()) })
            .collect();
        rows.push(row);
    }

    Ok(Table::new(columns, rows)?)
}

fn normalize_header_name(name: &str) -> String {
    // Excel likes to prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_headers_and_nulls() {
        let csv = "\u{feff}Work_Year , job_title\n2024,Data Engineer\n2023,\n";
        let table = read_table_from(csv.as_bytes()).unwrap();

        assert_eq!(table.columns(), ["work_year", "job_title"]);
        assert_eq!(table.rows()[0], vec![Some("2024".to_string()), Some("Data Engineer".to_string())]);
        assert_eq!(table.rows()[1], vec![Some("2023".to_string()), None]);
    }

    #[test]
    fn ragged_row_is_an_error() {
        let csv = "a,b\n1,2\n3\n";
        let err = read_table_from(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("line 3"), "{err}");
    }
}
