//! Loosely-typed tabular data, as read from a CSV export.
//!
//! A `Table` is just named columns and rows of optional string cells. An empty
//! cell is stored as `None` (null). Typing happens late, in [`Table::to_records`],
//! so cleaning can operate on whatever columns the export happened to contain.

use std::collections::HashSet;

use crate::domain::schema::{CategoricalColumn, NumericColumn};
use crate::domain::types::SalaryRecord;
use crate::error::PipelineError;

pub type Row = Vec<Option<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table, checking that column names are unique and every row has
    /// one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self, PipelineError> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(PipelineError::schema(format!("Duplicate column: `{name}`")));
            }
        }

        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(PipelineError::schema(format!(
                "Row {idx} has {} cells, expected {}",
                row.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of a column that must exist.
    pub fn require_column(&self, name: &str) -> Result<usize, PipelineError> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::schema(format!("Missing required column: `{name}`")))
    }

    /// Convert every row into a typed [`SalaryRecord`].
    ///
    /// Columns are looked up by name, so column order and extra columns do not
    /// matter. A missing column is a schema error; a null or non-numeric value
    /// in a required field rejects the whole table with a feature error.
    pub fn to_records(&self) -> Result<Vec<SalaryRecord>, PipelineError> {
        let idx = FeatureIndices::resolve(self)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| idx.record(cells, row))
            .collect()
    }

    /// Like [`Table::to_records`], but a bad row only rejects that row.
    ///
    /// Returns `(row index, record)` pairs for the usable rows plus one
    /// [`RowError`] per rejected row. A missing column still fails the call.
    pub fn to_records_lenient(&self) -> Result<(Vec<(usize, SalaryRecord)>, Vec<RowError>), PipelineError> {
        let idx = FeatureIndices::resolve(self)?;
        let mut records = Vec::with_capacity(self.rows.len());
        let mut errors = Vec::new();

        for (row, cells) in self.rows.iter().enumerate() {
            match idx.record(cells, row) {
                Ok(record) => records.push((row, record)),
                Err(e) => errors.push(RowError {
                    row,
                    message: e.to_string(),
                }),
            }
        }

        Ok((records, errors))
    }
}

/// A row rejected during conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 0-based data row (header excluded).
    pub row: usize,
    pub message: String,
}

/// Positions of the 8 feature columns within a particular table.
struct FeatureIndices {
    numeric: Vec<usize>,
    categorical: Vec<usize>,
}

impl FeatureIndices {
    fn resolve(table: &Table) -> Result<Self, PipelineError> {
        let numeric = NumericColumn::ALL
            .iter()
            .map(|c| table.require_column(c.name()))
            .collect::<Result<Vec<_>, _>>()?;
        let categorical = CategoricalColumn::ALL
            .iter()
            .map(|c| table.require_column(c.name()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { numeric, categorical })
    }

    fn record(&self, cells: &[Option<String>], row: usize) -> Result<SalaryRecord, PipelineError> {
        let num = |i: usize| -> Result<f64, PipelineError> {
            parse_numeric(cells[self.numeric[i]].as_deref(), NumericColumn::ALL[i].name(), row)
        };
        let cat = |i: usize| -> Result<String, PipelineError> {
            required_text(cells[self.categorical[i]].as_deref(), CategoricalColumn::ALL[i].name(), row)
        };

        Ok(SalaryRecord {
            work_year: num(0)?,
            remote_ratio: num(1)?,
            experience_level: cat(0)?,
            employment_type: cat(1)?,
            job_title: cat(2)?,
            employee_residence: cat(3)?,
            company_location: cat(4)?,
            company_size: cat(5)?,
        })
    }
}

/// Parse a required numeric cell. `row` is the 0-based data row, for messages.
pub fn parse_numeric(cell: Option<&str>, column: &str, row: usize) -> Result<f64, PipelineError> {
    let s = cell
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PipelineError::feature(format!("Row {row}: missing value for `{column}`")))?;
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(PipelineError::feature(format!(
            "Row {row}: `{column}` is not a number: '{s}'"
        ))),
    }
}

fn required_text(cell: Option<&str>, column: &str, row: usize) -> Result<String, PipelineError> {
    cell.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PipelineError::feature(format!("Row {row}: missing value for `{column}`")))
}
