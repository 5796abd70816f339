//! Row-level cleaning of a raw export.
//!
//! Three steps, in order:
//! 1. drop exact-duplicate rows (compared across every raw column)
//! 2. project onto [`KEEP_COLUMNS`]; any other column is dropped
//! 3. optionally drop rows whose target exceeds [`OUTLIER_CUTOFF_USD`]

use std::collections::HashSet;

use crate::domain::{KEEP_COLUMNS, OUTLIER_CUTOFF_USD, Row, TARGET_COLUMN, Table, parse_numeric};
use crate::error::PipelineError;

/// Whether to apply the fixed target cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlierFilter {
    Off,
    Cutoff,
}

/// Clean a raw table. Pure: the input is left untouched.
pub fn clean(raw: &Table, outliers: OutlierFilter) -> Result<Table, PipelineError> {
    let keep_idx = KEEP_COLUMNS
        .iter()
        .map(|name| raw.require_column(name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen: HashSet<&Row> = HashSet::with_capacity(raw.len());
    let unique: Vec<&Row> = raw.rows().iter().filter(|row| seen.insert(*row)).collect();
    let duplicates = raw.len() - unique.len();

    let target_pos = KEEP_COLUMNS
        .iter()
        .position(|c| *c == TARGET_COLUMN)
        .ok_or_else(|| PipelineError::schema(format!("`{TARGET_COLUMN}` is not a kept column")))?;

    let mut rows = Vec::with_capacity(unique.len());
    let mut outliers_dropped = 0usize;
    for (row_no, row) in unique.into_iter().enumerate() {
        let projected: Row = keep_idx.iter().map(|&i| row[i].clone()).collect();

        if outliers == OutlierFilter::Cutoff {
            let target = parse_numeric(projected[target_pos].as_deref(), TARGET_COLUMN, row_no)?;
            if target > OUTLIER_CUTOFF_USD {
                outliers_dropped += 1;
                continue;
            }
        }
        rows.push(projected);
    }

    tracing::debug!(
        rows_in = raw.len(),
        duplicates,
        outliers_dropped,
        rows_out = rows.len(),
        "cleaned raw table"
    );

    Table::new(KEEP_COLUMNS.iter().map(|c| (*c).to_string()).collect(), rows)
}
