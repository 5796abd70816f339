//! Least squares solver.
//!
//! The linear salary model solves
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! over a design matrix whose one-hot blocks each sum to the intercept column,
//! so `X` is rank-deficient by construction. SVD handles that: singular values
//! under the tolerance are treated as zero and we get the minimum-norm solution.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if no tolerance yields a finite solution.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Relative to the largest singular value, so the cut-off tracks the scale
    // of the (possibly unstandardized) numeric columns.
    let scale = svd.singular_values.max().max(1.0);
    for &rel in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, rel * scale) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
