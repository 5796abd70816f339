//! Feature/target separation and the train/test row split.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::domain::{TARGET_COLUMN, Table, parse_numeric};
use crate::error::PipelineError;

/// Separate the target column from the feature columns.
///
/// Returns the remaining columns (order preserved) and the parsed target.
pub fn split(clean: &Table) -> Result<(Table, Vec<f64>), PipelineError> {
    let target_idx = clean.require_column(TARGET_COLUMN)?;

    let columns = clean
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != target_idx)
        .map(|(_, c)| c.clone())
        .collect();

    let mut rows = Vec::with_capacity(clean.len());
    let mut target = Vec::with_capacity(clean.len());
    for (row_no, row) in clean.rows().iter().enumerate() {
        target.push(parse_numeric(row[target_idx].as_deref(), TARGET_COLUMN, row_no)?);
        rows.push(
            row.iter()
                .enumerate()
                .filter(|(i, _)| *i != target_idx)
                .map(|(_, cell)| cell.clone())
                .collect(),
        );
    }

    Ok((Table::new(columns, rows)?, target))
}

/// Shuffle `0..n` with a seeded RNG and cut it into `(train, test)` indices.
///
/// The test side gets `ceil(n * test_fraction)` rows; both sides are
/// guaranteed non-empty.
pub fn train_test_split(
    n: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), PipelineError> {
    if !(test_fraction.is_finite() && test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::feature(format!(
            "Test fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    if n < 2 {
        return Err(PipelineError::feature(format!(
            "Need at least 2 rows to hold out a test set, got {n}"
        )));
    }

    let n_test = ((n as f64 * test_fraction).ceil() as usize).clamp(1, n - 1);

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let train = order.split_off(n_test);
    Ok((train, order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::KEEP_COLUMNS;

    fn clean_table(target: Option<&str>) -> Table {
        let columns = KEEP_COLUMNS.iter().map(|c| (*c).to_string()).collect();
        let row = KEEP_COLUMNS
            .iter()
            .map(|c| {
                if *c == TARGET_COLUMN {
                    target.map(str::to_string)
                } else {
                    Some("x".to_string())
                }
            })
            .collect();
        Table::new(columns, vec![row]).unwrap()
    }

    #[test]
    fn removes_target_from_features() {
        let (features, target) = split(&clean_table(Some("95000"))).unwrap();
        assert_eq!(target, vec![95000.0]);
        assert_eq!(features.columns().len(), 8);
        assert!(features.column_index(TARGET_COLUMN).is_none());
        assert_eq!(features.rows()[0].len(), 8);
    }

    #[test]
    fn absent_target_column_is_a_schema_error() {
        let table = Table::new(vec!["work_year".to_string()], vec![]).unwrap();
        assert!(matches!(split(&table), Err(PipelineError::Schema(_))));
    }

    #[test]
    fn null_target_is_a_feature_error() {
        assert!(matches!(split(&clean_table(None)), Err(PipelineError::Feature(_))));
    }

    #[test]
    fn train_test_split_partitions_rows() {
        let (train, test) = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn train_test_split_is_seeded() {
        assert_eq!(train_test_split(50, 0.2, 7).unwrap(), train_test_split(50, 0.2, 7).unwrap());
    }

    #[test]
    fn train_test_split_rejects_tiny_inputs() {
        assert!(train_test_split(1, 0.2, 42).is_err());
        assert!(train_test_split(10, 1.0, 42).is_err());
    }
}
