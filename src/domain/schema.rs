//! The one schema this crate understands: 8 input columns plus the target.

use serde::{Deserialize, Serialize};

/// Target column name.
pub const TARGET_COLUMN: &str = "salary_in_usd";

/// Training rows with a target strictly above this value are dropped as outliers.
pub const OUTLIER_CUTOFF_USD: f64 = 350_000.0;

/// Columns retained by the cleaner, in projection order.
pub const KEEP_COLUMNS: [&str; 9] = [
    "work_year",
    "experience_level",
    "employment_type",
    "job_title",
    "salary_in_usd",
    "employee_residence",
    "remote_ratio",
    "company_location",
    "company_size",
];

/// Numeric input columns. Declaration order is feature-matrix order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    WorkYear,
    RemoteRatio,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 2] = [NumericColumn::WorkYear, NumericColumn::RemoteRatio];

    /// Position within [`NumericColumn::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::WorkYear => "work_year",
            NumericColumn::RemoteRatio => "remote_ratio",
        }
    }
}

/// Categorical input columns. Declaration order is one-hot block order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalColumn {
    ExperienceLevel,
    EmploymentType,
    JobTitle,
    EmployeeResidence,
    CompanyLocation,
    CompanySize,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; 6] = [
        CategoricalColumn::ExperienceLevel,
        CategoricalColumn::EmploymentType,
        CategoricalColumn::JobTitle,
        CategoricalColumn::EmployeeResidence,
        CategoricalColumn::CompanyLocation,
        CategoricalColumn::CompanySize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoricalColumn::ExperienceLevel => "experience_level",
            CategoricalColumn::EmploymentType => "employment_type",
            CategoricalColumn::JobTitle => "job_title",
            CategoricalColumn::EmployeeResidence => "employee_residence",
            CategoricalColumn::CompanyLocation => "company_location",
            CategoricalColumn::CompanySize => "company_size",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keep_columns_cover_features_and_target() {
        let mut expected: Vec<&str> = NumericColumn::ALL
            .iter()
            .map(|c| c.name())
            .chain(CategoricalColumn::ALL.iter().map(|c| c.name()))
            .collect();
        expected.push(TARGET_COLUMN);
        expected.sort_unstable();

        let mut keep = KEEP_COLUMNS.to_vec();
        keep.sort_unstable();

        assert_eq!(keep, expected);
    }

    #[test]
    fn numeric_index_matches_all_order() {
        for (i, column) in NumericColumn::ALL.into_iter().enumerate() {
            assert_eq!(column.index(), i);
        }
    }
}
