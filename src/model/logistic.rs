//! Logistic regression via batch gradient descent
//!
//! The linear baseline model. Features are standardized internally (the
//! scaler parameters are part of the persisted model), and training runs
//! under a fixed maximum-iteration budget with no hyperparameter search.

use serde::{Deserialize, Serialize};

use super::{check_labels, Classifier};
use crate::pipeline::PipelineError;

/// Training settings for the logistic baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticConfig {
    /// Maximum gradient-descent iterations.
    pub max_iter: usize,
    /// Step size in standardized feature space.
    pub learning_rate: f64,
    /// Stop early once the gradient norm falls below this.
    pub tolerance: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            max_iter: 3000,
            learning_rate: 0.1,
            tolerance: 1e-6,
        }
    }
}

/// A fitted (or not-yet-fitted) logistic regression model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    config: LogisticConfig,
    weights: Vec<f64>,
    intercept: f64,
    feature_means: Vec<f64>,
    feature_stds: Vec<f64>,
}

impl LogisticRegression {
    pub fn new(config: LogisticConfig) -> Self {
        Self {
            config,
            weights: Vec::new(),
            intercept: 0.0,
            feature_means: Vec::new(),
            feature_stds: Vec::new(),
        }
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    fn standardize(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.feature_means.iter().zip(self.feature_stds.iter()))
            .map(|(&x, (&mean, &std))| (x - mean) / std)
            .collect()
    }

    fn decision(&self, row: &[f64]) -> f64 {
        let z: f64 = self
            .standardize(row)
            .iter()
            .zip(self.weights.iter())
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.intercept;
        Self::sigmoid(z)
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &[Vec<f64>], y: &[i64]) -> Result<(), PipelineError> {
        check_labels(y)?;

        let n = x.len();
        let d = x[0].len();

        // Per-feature standardization; constant features get unit scale so
        // they contribute a zero coordinate instead of a division by zero.
        let mut means = vec![0.0; d];
        for row in x {
            for (j, &v) in row.iter().enumerate() {
                means[j] += v;
            }
        }
        for m in &mut means {
            *m /= n as f64;
        }

        let mut stds = vec![0.0; d];
        for row in x {
            for (j, &v) in row.iter().enumerate() {
                let dev = v - means[j];
                stds[j] += dev * dev;
            }
        }
        for s in &mut stds {
            *s = (*s / n as f64).sqrt();
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        self.feature_means = means;
        self.feature_stds = stds;

        let standardized: Vec<Vec<f64>> = x.iter().map(|row| self.standardize(row)).collect();

        let mut weights = vec![0.0; d];
        let mut intercept = 0.0;

        for _ in 0..self.config.max_iter {
            let mut grad_w = vec![0.0; d];
            let mut grad_b = 0.0;

            for (row, &label) in standardized.iter().zip(y.iter()) {
                let z: f64 = row
                    .iter()
                    .zip(weights.iter())
                    .map(|(x, w)| x * w)
                    .sum::<f64>()
                    + intercept;
                let residual = Self::sigmoid(z) - label as f64;

                for (g, &v) in grad_w.iter_mut().zip(row.iter()) {
                    *g += residual * v;
                }
                grad_b += residual;
            }

            let scale = 1.0 / n as f64;
            let mut grad_norm_sq = 0.0;
            for (w, g) in weights.iter_mut().zip(grad_w.iter()) {
                let g = g * scale;
                *w -= self.config.learning_rate * g;
                grad_norm_sq += g * g;
            }
            let g = grad_b * scale;
            intercept -= self.config.learning_rate * g;
            grad_norm_sq += g * g;

            if grad_norm_sq.sqrt() < self.config.tolerance {
                break;
            }
        }

        self.weights = weights;
        self.intercept = intercept;
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Vec<i64> {
        self.predict_proba(x)
            .into_iter()
            .map(|p| if p >= 0.5 { 1 } else { 0 })
            .collect()
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.decision(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Vec<Vec<f64>>, Vec<i64>) {
        // Two well-separated clusters along both axes.
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            let offset = i as f64 * 0.05;
            x.push(vec![1.0 + offset, 2.0 - offset]);
            y.push(0);
            x.push(vec![8.0 + offset, 9.0 - offset]);
            y.push(1);
        }
        (x, y)
    }

    #[test]
    fn test_learns_separable_clusters() {
        let (x, y) = separable_data();
        let mut model = LogisticRegression::new(LogisticConfig::default());
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x);
        let correct = preds
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| p == t)
            .count();
        assert_eq!(correct, y.len());
    }

    #[test]
    fn test_probabilities_are_bounded() {
        let (x, y) = separable_data();
        let mut model = LogisticRegression::new(LogisticConfig::default());
        model.fit(&x, &y).unwrap();

        for p in model.predict_proba(&x) {
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_single_class_labels_rejected() {
        let x = vec![vec![1.0], vec![2.0], vec![3.0]];
        let y = vec![1, 1, 1];
        let mut model = LogisticRegression::new(LogisticConfig::default());
        let err = model.fit(&x, &y).unwrap_err();
        assert!(matches!(err, PipelineError::DegenerateTrainingData(_)));
    }

    #[test]
    fn test_constant_feature_does_not_break_fit() {
        let x = vec![
            vec![1.0, 5.0],
            vec![2.0, 5.0],
            vec![8.0, 5.0],
            vec![9.0, 5.0],
        ];
        let y = vec![0, 0, 1, 1];
        let mut model = LogisticRegression::new(LogisticConfig::default());
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x), vec![0, 0, 1, 1]);
    }
}
