//! Categorical one-hot encoding and optional numeric standardization.
//!
//! Feature matrix layout (identical for fit and apply):
//!
//! ```text
//! [work_year, remote_ratio, <experience_level_*>, <employment_type_*>, <job_title_*>,
//!  <employee_residence_*>, <company_location_*>, <company_size_*>]
//! ```
//!
//! Each one-hot block lists the column's vocabulary in sorted order, so the
//! layout depends only on the set of values seen during fitting, never on row
//! order. A value outside the vocabulary encodes as an all-zero block.

use std::collections::BTreeSet;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::domain::{CategoricalColumn, NumericColumn, SalaryRecord};
use crate::error::PipelineError;
use crate::math::{mean, population_std};

/// Result of looking a value up in a fitted vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryLookup {
    /// Position of the value within its one-hot block.
    Known(usize),
    /// Not seen during fitting; encodes as zeros.
    Unknown,
}

/// The ordered distinct values of one categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnVocabulary {
    column: CategoricalColumn,
    values: Vec<String>,
}

impl ColumnVocabulary {
    pub fn column(&self) -> CategoricalColumn {
        self.column
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    pub fn lookup(&self, value: &str) -> CategoryLookup {
        match self.values.binary_search_by(|v| v.as_str().cmp(value)) {
            Ok(idx) => CategoryLookup::Known(idx),
            Err(_) => CategoryLookup::Unknown,
        }
    }
}

/// Fitted vocabularies for every categorical column, in schema order.
///
/// Immutable once built: there is no way to add a value after fitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    columns: Vec<ColumnVocabulary>,
}

impl CategoryVocabulary {
    /// Collect the sorted distinct values of each categorical column.
    pub fn fit(records: &[SalaryRecord]) -> Self {
        let columns = CategoricalColumn::ALL
            .iter()
            .map(|&column| {
                let values: BTreeSet<&str> = records.iter().map(|r| r.categorical(column)).collect();
                ColumnVocabulary {
                    column,
                    values: values.into_iter().map(str::to_string).collect(),
                }
            })
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnVocabulary] {
        &self.columns
    }

    /// Total number of one-hot columns.
    pub fn width(&self) -> usize {
        self.columns.iter().map(ColumnVocabulary::len).sum()
    }

    /// One-hot column names, `<column>_<value>`, in matrix order.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|vocab| {
                vocab
                    .values
                    .iter()
                    .map(move |v| format!("{}_{v}", vocab.column.name()))
            })
            .collect()
    }

    /// Check a vocabulary that came from outside this process (e.g. disk).
    pub fn validate(&self) -> Result<(), PipelineError> {
        let columns: Vec<CategoricalColumn> = self.columns.iter().map(|c| c.column).collect();
        if columns != CategoricalColumn::ALL {
            return Err(PipelineError::artifact(
                "Vocabulary columns do not match the categorical schema",
            ));
        }
        for vocab in &self.columns {
            if vocab.values.windows(2).any(|w| w[0] >= w[1]) {
                return Err(PipelineError::artifact(format!(
                    "Vocabulary for `{}` is not sorted and unique",
                    vocab.column.name()
                )));
            }
        }
        Ok(())
    }
}

/// Mean and standard deviation captured for one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column: NumericColumn,
    pub mean: f64,
    pub std: f64,
}

/// Per-column standardization `(x - mean) / std`, fitted once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericNormalizer {
    stats: Vec<ColumnStats>,
}

impl NumericNormalizer {
    /// Fit on the given records. Fails on an empty input.
    ///
    /// A constant column has zero spread; its std is stored as `1.0` so the
    /// column standardizes to zero instead of dividing by zero.
    pub fn fit(records: &[SalaryRecord]) -> Result<Self, PipelineError> {
        if records.is_empty() {
            return Err(PipelineError::feature("Cannot fit a normalizer on zero rows"));
        }
        let stats = NumericColumn::ALL
            .iter()
            .map(|&column| {
                let values: Vec<f64> = records.iter().map(|r| r.numeric(column)).collect();
                let mean = mean(&values);
                let std = population_std(&values);
                ColumnStats {
                    column,
                    mean,
                    std: if std > 0.0 { std } else { 1.0 },
                }
            })
            .collect();
        Ok(Self { stats })
    }

    pub fn stats(&self) -> &[ColumnStats] {
        &self.stats
    }

    /// Requires a validated normalizer: `stats` holds one entry per column in
    /// `NumericColumn::ALL` order.
    fn transform(&self, column: NumericColumn, x: f64) -> f64 {
        let s = &self.stats[column.index()];
        (x - s.mean) / s.std
    }

    /// Check a normalizer that came from outside this process (e.g. disk).
    pub fn validate(&self) -> Result<(), PipelineError> {
        let columns: Vec<NumericColumn> = self.stats.iter().map(|s| s.column).collect();
        if columns != NumericColumn::ALL {
            return Err(PipelineError::artifact(
                "Normalizer columns do not match the numeric schema",
            ));
        }
        for s in &self.stats {
            if !(s.mean.is_finite() && s.std.is_finite() && s.std > 0.0) {
                return Err(PipelineError::artifact(format!(
                    "Invalid normalizer statistics for `{}`",
                    s.column.name()
                )));
            }
        }
        Ok(())
    }
}

/// Encoded features: named columns over a dense row-per-record matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    values: DMatrix<f64>,
}

impl FeatureMatrix {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Copy of a single row.
    pub fn row(&self, i: usize) -> Vec<f64> {
        self.values.row(i).iter().copied().collect()
    }

    /// New matrix with the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> FeatureMatrix {
        FeatureMatrix {
            columns: self.columns.clone(),
            values: self.values.select_rows(rows),
        }
    }
}

/// Column names produced for a vocabulary: numeric columns, then one-hot blocks.
pub fn feature_layout(vocabulary: &CategoryVocabulary) -> Vec<String> {
    NumericColumn::ALL
        .iter()
        .map(|c| c.name().to_string())
        .chain(vocabulary.feature_names())
        .collect()
}

/// Fit a vocabulary (and, if `standardize`, a normalizer) and encode `records`.
pub fn fit_encode(
    records: &[SalaryRecord],
    standardize: bool,
) -> Result<(FeatureMatrix, CategoryVocabulary, Option<NumericNormalizer>), PipelineError> {
    if records.is_empty() {
        return Err(PipelineError::feature("Cannot fit an encoder on zero rows"));
    }
    ensure_numeric_present(records)?;

    let vocabulary = CategoryVocabulary::fit(records);
    let normalizer = if standardize {
        Some(NumericNormalizer::fit(records)?)
    } else {
        None
    };

    let matrix = apply_encode(records, &vocabulary, normalizer.as_ref())?;
    tracing::debug!(
        rows = matrix.nrows(),
        features = matrix.ncols(),
        standardize,
        "fitted encoder"
    );

    Ok((matrix, vocabulary, normalizer))
}

/// Encode `records` with previously fitted artifacts. Never refits.
pub fn apply_encode(
    records: &[SalaryRecord],
    vocabulary: &CategoryVocabulary,
    normalizer: Option<&NumericNormalizer>,
) -> Result<FeatureMatrix, PipelineError> {
    ensure_numeric_present(records)?;
    if let Some(n) = normalizer {
        n.validate()?;
    }

    let columns = feature_layout(vocabulary);
    let width = columns.len();

    let mut data = Vec::with_capacity(records.len() * width);
    for record in records {
        write_row(record, vocabulary, normalizer, &mut data);
    }

    Ok(FeatureMatrix {
        columns,
        values: DMatrix::from_row_slice(records.len(), width, &data),
    })
}

/// Encode a single record into a feature vector (inference path).
pub fn encode_record(
    record: &SalaryRecord,
    vocabulary: &CategoryVocabulary,
    normalizer: Option<&NumericNormalizer>,
) -> Result<Vec<f64>, PipelineError> {
    ensure_numeric_present(std::slice::from_ref(record))?;
    if let Some(n) = normalizer {
        n.validate()?;
    }
    let mut out = Vec::with_capacity(NumericColumn::ALL.len() + vocabulary.width());
    write_row(record, vocabulary, normalizer, &mut out);
    Ok(out)
}

fn write_row(
    record: &SalaryRecord,
    vocabulary: &CategoryVocabulary,
    normalizer: Option<&NumericNormalizer>,
    out: &mut Vec<f64>,
) {
    for column in NumericColumn::ALL {
        let x = record.numeric(column);
        out.push(match normalizer {
            Some(n) => n.transform(column, x),
            None => x,
        });
    }

    for vocab in vocabulary.columns() {
        let start = out.len();
        out.resize(start + vocab.len(), 0.0);
        if let CategoryLookup::Known(idx) = vocab.lookup(record.categorical(vocab.column())) {
            out[start + idx] = 1.0;
        }
    }
}

/// Numeric fields must be real numbers; NaN stands in for "missing" here.
fn ensure_numeric_present(records: &[SalaryRecord]) -> Result<(), PipelineError> {
    for (row, record) in records.iter().enumerate() {
        for column in NumericColumn::ALL {
            if !record.numeric(column).is_finite() {
                return Err(PipelineError::feature(format!(
                    "Row {row}: missing value for `{}`",
                    column.name()
                )));
            }
        }
    }
    Ok(())
}
