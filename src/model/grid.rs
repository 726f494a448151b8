//! Grid search with k-fold cross-validation
//!
//! Exhaustively evaluates a fixed hyperparameter grid for the random forest
//! and picks the best configuration by mean cross-validated accuracy on the
//! training partition. Candidates are scored in parallel, but selection
//! walks them in declared grid order with a strictly-greater comparison, so
//! ties resolve to the first-found candidate deterministically.

use anyhow::Result;
use rayon::prelude::*;

use super::forest::{MaxFeatures, RandomForest, RandomForestConfig};
use super::metrics::accuracy;
use super::tree::SplitCriterion;
use super::Classifier;

/// The hyperparameter axes explored for the ensemble model.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<Option<usize>>,
    pub criterion: Vec<SplitCriterion>,
    pub min_samples_leaf: Vec<usize>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            n_estimators: vec![200, 500],
            max_depth: vec![Some(4), Some(5), None],
            criterion: vec![SplitCriterion::Gini, SplitCriterion::Entropy],
            min_samples_leaf: vec![1, 3],
        }
    }
}

impl ParamGrid {
    /// Expand the grid into concrete configurations, in declared axis
    /// order (estimators outermost, leaf size innermost).
    fn candidates(&self, seed: u64) -> Vec<RandomForestConfig> {
        let mut out = Vec::new();
        for &n_estimators in &self.n_estimators {
            for &max_depth in &self.max_depth {
                for &criterion in &self.criterion {
                    for &min_samples_leaf in &self.min_samples_leaf {
                        out.push(RandomForestConfig {
                            n_estimators,
                            max_depth,
                            criterion,
                            min_samples_leaf,
                            max_features: MaxFeatures::Sqrt,
                            seed,
                        });
                    }
                }
            }
        }
        out
    }
}

/// Outcome of a grid search: the winning configuration and its score.
#[derive(Debug, Clone)]
pub struct GridSearchResult {
    pub best_config: RandomForestConfig,
    pub best_score: f64,
    pub candidates_evaluated: usize,
}

/// Exhaustive grid search over forest hyperparameters.
pub struct GridSearch {
    grid: ParamGrid,
    folds: usize,
    seed: u64,
}

impl GridSearch {
    pub fn new(grid: ParamGrid, folds: usize, seed: u64) -> Self {
        Self { grid, folds, seed }
    }

    /// Score every candidate by k-fold cross-validated accuracy and return
    /// the first strictly-best configuration.
    pub fn search(&self, x: &[Vec<f64>], y: &[i64]) -> Result<GridSearchResult> {
        let candidates = self.grid.candidates(self.seed);
        if candidates.is_empty() {
            anyhow::bail!("Hyperparameter grid is empty");
        }

        let scores: Vec<Result<f64>> = candidates
            .par_iter()
            .map(|config| cross_val_accuracy(config, x, y, self.folds))
            .collect();

        let mut best_idx = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (idx, score) in scores.into_iter().enumerate() {
            let score = score?;
            if score > best_score {
                best_score = score;
                best_idx = idx;
            }
        }

        Ok(GridSearchResult {
            best_config: candidates[best_idx].clone(),
            best_score,
            candidates_evaluated: candidates.len(),
        })
    }
}

/// Mean accuracy over k contiguous folds.
///
/// The training rows were already shuffled by the splitter, so contiguous
/// folds are unbiased and keep fold membership deterministic.
fn cross_val_accuracy(
    config: &RandomForestConfig,
    x: &[Vec<f64>],
    y: &[i64],
    folds: usize,
) -> Result<f64> {
    let n = x.len();
    let folds = folds.min(n).max(2);
    let fold_size = n.div_ceil(folds);

    let mut total = 0.0;
    let mut used = 0usize;

    for fold in 0..folds {
        let start = fold * fold_size;
        let end = ((fold + 1) * fold_size).min(n);
        if start >= end {
            continue;
        }

        let mut x_train = Vec::with_capacity(n - (end - start));
        let mut y_train = Vec::with_capacity(n - (end - start));
        let mut x_val = Vec::with_capacity(end - start);
        let mut y_val = Vec::with_capacity(end - start);

        for i in 0..n {
            if i >= start && i < end {
                x_val.push(x[i].clone());
                y_val.push(y[i]);
            } else {
                x_train.push(x[i].clone());
                y_train.push(y[i]);
            }
        }

        let mut forest = RandomForest::new(config.clone());
        forest.fit(&x_train, &y_train)?;
        let preds = forest.predict(&x_val);
        total += accuracy(&y_val, &preds);
        used += 1;
    }

    Ok(total / used as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clustered_data() -> (Vec<Vec<f64>>, Vec<i64>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        // Interleave the classes so contiguous folds keep both labels.
        for i in 0..40 {
            let jitter = (i % 7) as f64 * 0.1;
            if i % 2 == 0 {
                x.push(vec![1.0 + jitter, 2.0]);
                y.push(0);
            } else {
                x.push(vec![7.0 + jitter, 8.0]);
                y.push(1);
            }
        }
        (x, y)
    }

    fn tiny_grid() -> ParamGrid {
        ParamGrid {
            n_estimators: vec![10, 20],
            max_depth: vec![Some(3), None],
            criterion: vec![SplitCriterion::Gini],
            min_samples_leaf: vec![1],
        }
    }

    #[test]
    fn test_search_evaluates_full_grid() {
        let (x, y) = clustered_data();
        let search = GridSearch::new(tiny_grid(), 4, 42);
        let result = search.search(&x, &y).unwrap();
        assert_eq!(result.candidates_evaluated, 4);
    }

    #[test]
    fn test_winner_comes_from_grid() {
        let (x, y) = clustered_data();
        let grid = tiny_grid();
        let search = GridSearch::new(grid.clone(), 4, 42);
        let result = search.search(&x, &y).unwrap();

        assert!(grid.n_estimators.contains(&result.best_config.n_estimators));
        assert!(grid.max_depth.contains(&result.best_config.max_depth));
        assert!(result.best_score > 0.5);
        assert!(result.best_score <= 1.0);
    }

    #[test]
    fn test_search_is_deterministic() {
        let (x, y) = clustered_data();
        let a = GridSearch::new(tiny_grid(), 4, 42).search(&x, &y).unwrap();
        let b = GridSearch::new(tiny_grid(), 4, 42).search(&x, &y).unwrap();
        assert_eq!(a.best_config.n_estimators, b.best_config.n_estimators);
        assert_eq!(a.best_config.max_depth, b.best_config.max_depth);
        assert_eq!(a.best_score, b.best_score);
    }

    #[test]
    fn test_degenerate_labels_propagate() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let y = vec![1i64; 20];
        let err = GridSearch::new(tiny_grid(), 4, 42).search(&x, &y).unwrap_err();
        assert!(err.to_string().contains("Degenerate"));
    }
}
