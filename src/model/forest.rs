//! Random forest classifier
//!
//! Bootstrap-aggregated CART trees fitted in parallel with rayon. Each tree
//! draws its bootstrap sample and feature subsamples from an RNG seeded by
//! `seed + tree index`, so the fitted ensemble is identical run-to-run
//! regardless of thread scheduling.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use super::tree::MaxFeatures;
use super::tree::{DecisionTree, DecisionTreeConfig, SplitCriterion};
use super::{check_labels, Classifier};
use crate::pipeline::PipelineError;

/// Forest hyperparameters. These are the axes the grid search explores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub criterion: SplitCriterion,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub seed: u64,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            criterion: SplitCriterion::Gini,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            seed: 42,
        }
    }
}

/// A fitted (or not-yet-fitted) random forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: RandomForestConfig,
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    pub fn new(config: RandomForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn config(&self) -> &RandomForestConfig {
        &self.config
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &[Vec<f64>], y: &[i64]) -> Result<(), PipelineError> {
        check_labels(y)?;

        let n = x.len();
        let tree_config = DecisionTreeConfig {
            max_depth: self.config.max_depth,
            min_samples_leaf: self.config.min_samples_leaf,
            criterion: self.config.criterion,
            max_features: self.config.max_features,
        };
        let seed = self.config.seed;

        self.trees = (0..self.config.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(tree_idx as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(tree_config.clone(), x, y, &bootstrap, &mut rng)
            })
            .collect();
        self.n_features = x[0].len();

        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Vec<i64> {
        self.predict_proba(x)
            .into_iter()
            .map(|p| if p >= 0.5 { 1 } else { 0 })
            .collect()
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.par_iter()
            .map(|row| {
                let sum: f64 = self
                    .trees
                    .iter()
                    .map(|tree| tree.predict_proba_row(row))
                    .sum();
                sum / self.trees.len() as f64
            })
            .collect()
    }

    /// Mean impurity-decrease importance across trees, normalized to sum
    /// to one.
    fn feature_importances(&self) -> Option<Vec<f64>> {
        if self.trees.is_empty() {
            return None;
        }

        let mut totals = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (total, &imp) in totals.iter_mut().zip(tree.importances().iter()) {
                *total += imp;
            }
        }

        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            for t in &mut totals {
                *t /= sum;
            }
        }
        Some(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clustered_data() -> (Vec<Vec<f64>>, Vec<i64>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..30 {
            let jitter = (i % 5) as f64 * 0.1;
            x.push(vec![1.0 + jitter, 1.0 - jitter]);
            y.push(0);
            x.push(vec![6.0 + jitter, 6.0 - jitter]);
            y.push(1);
        }
        (x, y)
    }

    fn small_forest() -> RandomForestConfig {
        RandomForestConfig {
            n_estimators: 25,
            ..Default::default()
        }
    }

    #[test]
    fn test_fits_clustered_data() {
        let (x, y) = clustered_data();
        let mut forest = RandomForest::new(small_forest());
        forest.fit(&x, &y).unwrap();

        let preds = forest.predict(&x);
        let correct = preds.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        assert!(correct as f64 / y.len() as f64 > 0.95);
    }

    #[test]
    fn test_deterministic_given_seed() {
        let (x, y) = clustered_data();

        let mut a = RandomForest::new(small_forest());
        a.fit(&x, &y).unwrap();
        let mut b = RandomForest::new(small_forest());
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict_proba(&x), b.predict_proba(&x));
    }

    #[test]
    fn test_importances_normalized() {
        let (x, y) = clustered_data();
        let mut forest = RandomForest::new(small_forest());
        forest.fit(&x, &y).unwrap();

        let imp = forest.feature_importances().unwrap();
        assert_eq!(imp.len(), 2);
        let sum: f64 = imp.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_class_labels_rejected() {
        let x = vec![vec![1.0], vec![2.0]];
        let y = vec![0, 0];
        let mut forest = RandomForest::new(small_forest());
        let err = forest.fit(&x, &y).unwrap_err();
        assert!(matches!(err, PipelineError::DegenerateTrainingData(_)));
    }

    #[test]
    fn test_unfitted_forest_has_no_importances() {
        let forest = RandomForest::new(small_forest());
        assert!(forest.feature_importances().is_none());
    }
}
