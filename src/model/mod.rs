//! Model module - classifiers, selection, evaluation, persistence

pub mod forest;
pub mod grid;
pub mod logistic;
pub mod metrics;
pub mod persist;
pub mod trainer;
pub mod tree;

pub use forest::{MaxFeatures, RandomForest, RandomForestConfig};
pub use grid::{GridSearch, GridSearchResult, ParamGrid};
pub use logistic::{LogisticConfig, LogisticRegression};
pub use metrics::*;
pub use trainer::{train_models, TrainConfig, TrainOutcome};
pub use tree::SplitCriterion;

use crate::pipeline::PipelineError;

/// Common capability of the two concrete classifiers.
///
/// The trainer is written once against this interface; the linear model and
/// the ensemble tree model are swappable implementations. Labels are binary
/// (0/1) and rows are dense f64 feature vectors.
pub trait Classifier {
    /// Fit on the training partition. Fails with
    /// [`PipelineError::DegenerateTrainingData`] when the label vector
    /// holds a single class.
    fn fit(&mut self, x: &[Vec<f64>], y: &[i64]) -> Result<(), PipelineError>;

    /// Hard 0/1 predictions.
    fn predict(&self, x: &[Vec<f64>]) -> Vec<i64>;

    /// Probability of the positive (churn) class per row.
    fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<f64>;

    /// Per-feature importance scores, when the model supports them.
    fn feature_importances(&self) -> Option<Vec<f64>> {
        None
    }
}

/// Guard shared by both classifiers: a single-class label vector cannot
/// support fitting.
pub(crate) fn check_labels(y: &[i64]) -> Result<(), PipelineError> {
    if y.is_empty() {
        return Err(PipelineError::DegenerateTrainingData(
            "label vector is empty".to_string(),
        ));
    }
    let first = y[0];
    if y.iter().all(|&v| v == first) {
        return Err(PipelineError::DegenerateTrainingData(format!(
            "label vector contains a single class ({})",
            first
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_labels_rejects_single_class() {
        let err = check_labels(&[1, 1, 1, 1]).unwrap_err();
        assert!(matches!(err, PipelineError::DegenerateTrainingData(_)));
    }

    #[test]
    fn test_check_labels_rejects_empty() {
        assert!(check_labels(&[]).is_err());
    }

    #[test]
    fn test_check_labels_accepts_two_classes() {
        assert!(check_labels(&[0, 1, 0, 1]).is_ok());
    }
}
