//! Model training and evaluation stage
//!
//! Fits the logistic baseline directly and the random forest via grid
//! search, persists both models, and produces every evaluation artifact:
//! classification reports (text and rendered panels), the ROC comparison
//! curve, and the forest feature importances.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::forest::{RandomForest, RandomForestConfig};
use super::grid::{GridSearch, ParamGrid};
use super::logistic::{LogisticConfig, LogisticRegression};
use super::metrics::{auc, classification_report, roc_curve, ClassificationReport};
use super::persist::{save_model, LOGISTIC_MODEL_FILE, RFC_MODEL_FILE};
use super::Classifier;
use crate::pipeline::features::{to_rows, Split};
use crate::pipeline::PipelineError;
use crate::report::plots;

/// Training-stage configuration.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Iteration budget for the logistic baseline.
    pub max_iter: usize,
    /// Seed shared by the forest bootstrap and the grid search.
    pub seed: u64,
    /// Hyperparameter grid for the ensemble model.
    pub grid: ParamGrid,
    /// Cross-validation folds used by the grid search.
    pub cv_folds: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_iter: 3000,
            seed: 42,
            grid: ParamGrid::default(),
            cv_folds: 5,
        }
    }
}

/// Evaluation results for one fitted model.
#[derive(Debug, Clone)]
pub struct ModelEvaluation {
    pub train_report: ClassificationReport,
    pub test_report: ClassificationReport,
    pub test_accuracy: f64,
    pub auc: f64,
}

/// Everything the training stage produced.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub logistic: ModelEvaluation,
    pub forest: ModelEvaluation,
    pub best_config: RandomForestConfig,
    pub best_cv_score: f64,
    pub importances: Vec<(String, f64)>,
    /// Plot and report artifacts, in written order.
    pub artifacts: Vec<PathBuf>,
    /// Persisted model files.
    pub model_files: Vec<PathBuf>,
}

/// Fit, select, persist, and evaluate both classifiers.
///
/// Any fit failure (including a single-class `y_train`) aborts before a
/// single file is written, so no partial model is ever persisted.
pub fn train_models(split: &Split, config: &TrainConfig, out_dir: &Path) -> Result<TrainOutcome> {
    let x_train = to_rows(&split.x_train)?;
    let x_test = to_rows(&split.x_test)?;
    let feature_names: Vec<String> = split
        .x_train
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    // Model A: linear baseline, fixed iteration budget, no search.
    let mut logistic = LogisticRegression::new(LogisticConfig {
        max_iter: config.max_iter,
        ..Default::default()
    });
    logistic.fit(&x_train, &split.y_train)?;

    // Model B: ensemble selected by cross-validated grid search.
    let search = GridSearch::new(config.grid.clone(), config.cv_folds, config.seed);
    let selection = search.search(&x_train, &split.y_train)?;
    let mut forest = RandomForest::new(selection.best_config.clone());
    forest.fit(&x_train, &split.y_train)?;

    // Both fits succeeded; only now do model files appear on disk.
    let models_dir = out_dir.join("models");
    let logistic_path = models_dir.join(LOGISTIC_MODEL_FILE);
    let forest_path = models_dir.join(RFC_MODEL_FILE);
    save_model(&logistic, &logistic_path)?;
    save_model(&forest, &forest_path)?;

    let logistic_eval = evaluate(&logistic, &x_train, &x_test, split);
    let forest_eval = evaluate(&forest, &x_train, &x_test, split);

    let mut importances: Vec<(String, f64)> = feature_names
        .iter()
        .cloned()
        .zip(forest.feature_importances().unwrap_or_default())
        .collect();
    importances.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut artifacts = Vec::new();

    let reports_dir = out_dir.join("reports");
    std::fs::create_dir_all(&reports_dir)
        .map_err(|e| PipelineError::artifact(&reports_dir, e))?;
    artifacts.push(write_report_text(
        &reports_dir.join("logistic_classification_report.txt"),
        "Logistic regression",
        &logistic_eval,
    )?);
    artifacts.push(write_report_text(
        &reports_dir.join("rfc_classification_report.txt"),
        "Random forest",
        &forest_eval,
    )?);

    let results_dir = out_dir.join("images").join("results");
    std::fs::create_dir_all(&results_dir)
        .map_err(|e| PipelineError::artifact(&results_dir, e))?;

    let roc_path = results_dir.join("roc_curve_result.svg");
    let logistic_roc = roc_curve(&split.y_test, &logistic.predict_proba(&x_test));
    let forest_roc = roc_curve(&split.y_test, &forest.predict_proba(&x_test));
    plots::render_roc(
        &roc_path,
        &[
            ("Logistic regression".to_string(), logistic_roc, logistic_eval.auc),
            ("Random forest".to_string(), forest_roc, forest_eval.auc),
        ],
    )?;
    artifacts.push(roc_path);

    let rf_panel = results_dir.join("rf_results.svg");
    plots::render_report_panel(
        &rf_panel,
        "Random forest results",
        &forest_eval.train_report.to_string(),
        &forest_eval.test_report.to_string(),
    )?;
    artifacts.push(rf_panel);

    let logistic_panel = results_dir.join("logistic_results.svg");
    plots::render_report_panel(
        &logistic_panel,
        "Logistic regression results",
        &logistic_eval.train_report.to_string(),
        &logistic_eval.test_report.to_string(),
    )?;
    artifacts.push(logistic_panel);

    let importance_path = results_dir.join("feature_importances.svg");
    plots::render_feature_importances(&importance_path, &importances)?;
    artifacts.push(importance_path);

    Ok(TrainOutcome {
        logistic: logistic_eval,
        forest: forest_eval,
        best_config: selection.best_config,
        best_cv_score: selection.best_score,
        importances,
        artifacts,
        model_files: vec![logistic_path, forest_path],
    })
}

fn evaluate<C: Classifier>(
    model: &C,
    x_train: &[Vec<f64>],
    x_test: &[Vec<f64>],
    split: &Split,
) -> ModelEvaluation {
    let train_pred = model.predict(x_train);
    let test_pred = model.predict(x_test);
    let test_proba = model.predict_proba(x_test);

    let test_report = classification_report(&split.y_test, &test_pred);
    let test_accuracy = test_report.accuracy;
    let roc = roc_curve(&split.y_test, &test_proba);

    ModelEvaluation {
        train_report: classification_report(&split.y_train, &train_pred),
        test_report,
        test_accuracy,
        auc: auc(&roc),
    }
}

fn write_report_text(
    path: &Path,
    title: &str,
    eval: &ModelEvaluation,
) -> Result<PathBuf> {
    let body = format!(
        "{} - train results\n\n{}\n{} - test results\n\n{}",
        title, eval.train_report, title, eval.test_report
    );
    std::fs::write(path, body).map_err(|e| PipelineError::artifact(path, e))?;
    Ok(path.to_path_buf())
}
