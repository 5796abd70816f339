//! Random-forest regressor.
//!
//! Each tree is a CART regression tree grown on a bootstrap resample of the
//! training rows, choosing at every node the split with the largest reduction
//! in squared error over all features. The forest predicts the mean of its
//! trees.
//!
//! Trees are grown in parallel with rayon. Each tree draws from its own RNG
//! seeded with `seed + tree_index`, so the result does not depend on thread
//! scheduling.

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::ForestParams;
use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => return *value,
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row.get(*feature).copied().unwrap_or(f64::NAN);
                    idx = if x <= *threshold { *left } else { *right };
                }
                None => return f64::NAN,
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Check a tree that came from outside this process (e.g. disk).
    ///
    /// Children must come strictly after their parent and inside the node
    /// list, so every walk from the root terminates.
    fn validate(&self, tree: usize, n_features: usize) -> Result<(), PipelineError> {
        if self.nodes.is_empty() {
            return Err(PipelineError::artifact(format!("Tree {tree} has no nodes")));
        }
        for (id, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Leaf { value } if !value.is_finite() => {
                    return Err(PipelineError::artifact(format!("Tree {tree}, node {id}: non-finite leaf value")));
                }
                TreeNode::Leaf { .. } => {}
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(PipelineError::artifact(format!(
                            "Tree {tree}, node {id}: feature {feature} out of range for {n_features} features"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(PipelineError::artifact(format!("Tree {tree}, node {id}: non-finite threshold")));
                    }
                    for child in [left, right] {
                        if child <= id || child >= self.nodes.len() {
                            return Err(PipelineError::artifact(format!(
                                "Tree {tree}, node {id}: invalid child index {child}"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl ForestModel {
    pub fn fit(x: &DMatrix<f64>, y: &[f64], params: &ForestParams) -> Result<Self, PipelineError> {
        let (n, p) = x.shape();
        if n == 0 || n != y.len() {
            return Err(PipelineError::prediction(format!(
                "Forest fit needs matching non-empty inputs (rows={n}, targets={})",
                y.len()
            )));
        }
        if params.n_estimators == 0 {
            return Err(PipelineError::prediction("Forest needs at least one tree"));
        }

        let grower = TreeGrower {
            x,
            y,
            max_depth: params.max_depth.unwrap_or(usize::MAX),
            min_samples_split: params.min_samples_split.max(2),
        };

        let trees = (0..params.n_estimators)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(t as u64));
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                grower.grow(sample)
            })
            .collect();

        Ok(Self { n_features: p, trees })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Check a forest that came from outside this process (e.g. disk).
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.trees.is_empty() {
            return Err(PipelineError::artifact("Forest has no trees"));
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(t, tree)| tree.validate(t, self.n_features))
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return f64::NAN;
        }
        self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / self.trees.len() as f64
    }
}

struct TreeGrower<'a> {
    x: &'a DMatrix<f64>,
    y: &'a [f64],
    max_depth: usize,
    min_samples_split: usize,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl TreeGrower<'_> {
    fn grow(&self, sample: Vec<usize>) -> RegressionTree {
        let mut nodes = Vec::new();
        self.build(sample, 0, &mut nodes);
        RegressionTree { nodes }
    }

    fn build(&self, rows: Vec<usize>, depth: usize, nodes: &mut Vec<TreeNode>) -> usize {
        let id = nodes.len();
        let value = rows.iter().map(|&r| self.y[r]).sum::<f64>() / rows.len() as f64;
        nodes.push(TreeNode::Leaf { value });

        if depth >= self.max_depth || rows.len() < self.min_samples_split {
            return id;
        }
        let Some(split) = self.best_split(&rows) else {
            return id;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| self.x[(r, split.feature)] <= split.threshold);

        let left = self.build(left_rows, depth + 1, nodes);
        let right = self.build(right_rows, depth + 1, nodes);
        nodes[id] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    /// Exhaustive search for the split maximizing SSE reduction.
    fn best_split(&self, rows: &[usize]) -> Option<BestSplit> {
        let n = rows.len() as f64;
        let total_sum: f64 = rows.iter().map(|&r| self.y[r]).sum();
        let total_sq: f64 = rows.iter().map(|&r| self.y[r] * self.y[r]).sum();
        let parent_sse = total_sq - total_sum * total_sum / n;
        if parent_sse <= 1e-12 {
            return None;
        }

        let mut best: Option<BestSplit> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(rows.len());

        for feature in 0..self.x.ncols() {
            let first = self.x[(rows[0], feature)];
            if rows.iter().all(|&r| self.x[(r, feature)] == first) {
                continue;
            }

            pairs.clear();
            pairs.extend(rows.iter().map(|&r| (self.x[(r, feature)], self.y[r])));
            pairs.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for i in 0..pairs.len() - 1 {
                let (xv, yv) = pairs[i];
                left_sum += yv;
                left_sq += yv * yv;

                let next_x = pairs[i + 1].0;
                if next_x <= xv {
                    continue;
                }

                let n_left = (i + 1) as f64;
                let n_right = n - n_left;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / n_left) + (right_sq - right_sum * right_sum / n_right);
                let gain = parent_sse - sse;

                if best.as_ref().is_none_or(|b| gain > b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: xv + (next_x - xv) / 2.0,
                        gain,
                    });
                }
            }
        }

        best.filter(|b| b.gain > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (DMatrix<f64>, Vec<f64>) {
        // Target jumps from 50k to 150k when feature 1 is set; feature 0 is noise.
        let x = DMatrix::from_row_slice(
            6,
            2,
            &[0.3, 0.0, 0.1, 0.0, 0.7, 0.0, 0.2, 1.0, 0.9, 1.0, 0.5, 1.0],
        );
        let y = vec![50_000.0, 50_000.0, 50_000.0, 150_000.0, 150_000.0, 150_000.0];
        (x, y)
    }

    #[test]
    fn single_tree_learns_a_step() {
        let (x, y) = step_data();
        let grower = TreeGrower {
            x: &x,
            y: &y,
            max_depth: usize::MAX,
            min_samples_split: 2,
        };
        let tree = grower.grow((0..6).collect());

        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.predict_row(&[0.4, 0.0]), 50_000.0);
        assert_eq!(tree.predict_row(&[0.4, 1.0]), 150_000.0);
    }

    #[test]
    fn forest_is_deterministic_for_a_seed() {
        let (x, y) = step_data();
        let params = ForestParams {
            n_estimators: 8,
            ..ForestParams::default()
        };
        let a = ForestModel::fit(&x, &y, &params).unwrap();
        let b = ForestModel::fit(&x, &y, &params).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.trees().len(), 8);
        assert_eq!(a.n_features(), 2);
    }

    #[test]
    fn forest_predictions_stay_within_target_range() {
        let (x, y) = step_data();
        let forest = ForestModel::fit(&x, &y, &ForestParams::default()).unwrap();
        for row in [[0.0, 0.0], [1.0, 1.0], [0.5, 0.5]] {
            let p = forest.predict_row(&row);
            assert!((50_000.0..=150_000.0).contains(&p), "prediction {p}");
        }
    }

    #[test]
    fn depth_zero_is_a_mean_predictor() {
        let (x, y) = step_data();
        let params = ForestParams {
            n_estimators: 1,
            max_depth: Some(0),
            ..ForestParams::default()
        };
        let forest = ForestModel::fit(&x, &y, &params).unwrap();
        assert_eq!(forest.trees()[0].n_nodes(), 1);
    }

    #[test]
    fn fitted_forest_validates() {
        let (x, y) = step_data();
        let forest = ForestModel::fit(&x, &y, &ForestParams::default()).unwrap();
        assert!(forest.validate().is_ok());
    }

    fn forest_from_json(json: &str) -> ForestModel {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn validate_rejects_malformed_trees() {
        let cases = [
            // self-loop
            r#"{"n_features":1,"trees":[{"nodes":[{"split":{"feature":0,"threshold":1.0,"left":0,"right":0}}]}]}"#,
            // back edge to an ancestor
            r#"{"n_features":1,"trees":[{"nodes":[
                {"split":{"feature":0,"threshold":1.0,"left":1,"right":2}},
                {"leaf":{"value":1.0}},
                {"split":{"feature":0,"threshold":2.0,"left":0,"right":1}}]}]}"#,
            // child past the end
            r#"{"n_features":1,"trees":[{"nodes":[{"split":{"feature":0,"threshold":1.0,"left":1,"right":5}},{"leaf":{"value":1.0}}]}]}"#,
            // feature out of range
            r#"{"n_features":1,"trees":[{"nodes":[
                {"split":{"feature":3,"threshold":1.0,"left":1,"right":2}},
                {"leaf":{"value":1.0}},{"leaf":{"value":2.0}}]}]}"#,
            // empty tree
            r#"{"n_features":1,"trees":[{"nodes":[]}]}"#,
            // no trees
            r#"{"n_features":1,"trees":[]}"#,
        ];
        for json in cases {
            let err = forest_from_json(json).validate().unwrap_err();
            assert!(matches!(err, PipelineError::Artifact(_)), "{json}: {err}");
        }
    }

    #[test]
    fn validate_rejects_non_finite_values() {
        let mut forest = forest_from_json(
            r#"{"n_features":1,"trees":[{"nodes":[
                {"split":{"feature":0,"threshold":1.0,"left":1,"right":2}},
                {"leaf":{"value":1.0}},{"leaf":{"value":2.0}}]}]}"#,
        );
        assert!(forest.validate().is_ok());

        forest.trees[0].nodes[1] = TreeNode::Leaf { value: f64::NAN };
        assert!(matches!(forest.validate(), Err(PipelineError::Artifact(_))));

        forest.trees[0].nodes[1] = TreeNode::Leaf { value: 1.0 };
        forest.trees[0].nodes[0] = TreeNode::Split {
            feature: 0,
            threshold: f64::INFINITY,
            left: 1,
            right: 2,
        };
        assert!(matches!(forest.validate(), Err(PipelineError::Artifact(_))));
    }
}
