//! Run metadata export
//!
//! Serializes the run configuration, the grid-search winner, and the
//! headline metrics to `run_metadata.json` so a completed run can be
//! audited without re-reading the terminal output.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::model::trainer::TrainOutcome;

/// Winning grid-search configuration, flattened for the export.
#[derive(Serialize)]
pub struct SelectedModel {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub criterion: String,
    pub min_samples_leaf: usize,
    pub cv_accuracy: f64,
}

/// Headline evaluation metrics for one model.
#[derive(Serialize)]
pub struct ModelMetrics {
    pub test_accuracy: f64,
    pub auc: f64,
}

/// Complete metadata for one pipeline run.
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    /// Churncast version
    pub churncast_version: String,
    /// Input file path
    pub input_file: String,
    /// Shuffle seed for the train/test split
    pub seed: u64,
    /// Held-out fraction
    pub test_fraction: f64,
    /// Dataset shape after encoding
    pub rows: usize,
    pub columns: usize,
    /// Train/test partition sizes
    pub train_rows: usize,
    pub test_rows: usize,
    /// Grid-search winner
    pub selected_forest: SelectedModel,
    /// Evaluation metrics per model
    pub logistic: ModelMetrics,
    pub random_forest: ModelMetrics,
}

/// Parameters the caller supplies alongside the training outcome.
pub struct MetadataParams<'a> {
    pub input_file: &'a str,
    pub seed: u64,
    pub test_fraction: f64,
    pub rows: usize,
    pub columns: usize,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Write `run_metadata.json` under the output root.
pub fn export_run_metadata(
    outcome: &TrainOutcome,
    params: &MetadataParams,
    out_dir: &Path,
) -> Result<std::path::PathBuf> {
    let metadata = RunMetadata {
        timestamp: Utc::now().to_rfc3339(),
        churncast_version: env!("CARGO_PKG_VERSION").to_string(),
        input_file: params.input_file.to_string(),
        seed: params.seed,
        test_fraction: params.test_fraction,
        rows: params.rows,
        columns: params.columns,
        train_rows: params.train_rows,
        test_rows: params.test_rows,
        selected_forest: SelectedModel {
            n_estimators: outcome.best_config.n_estimators,
            max_depth: outcome.best_config.max_depth,
            criterion: outcome.best_config.criterion.to_string(),
            min_samples_leaf: outcome.best_config.min_samples_leaf,
            cv_accuracy: outcome.best_cv_score,
        },
        logistic: ModelMetrics {
            test_accuracy: outcome.logistic.test_accuracy,
            auc: outcome.logistic.auc,
        },
        random_forest: ModelMetrics {
            test_accuracy: outcome.forest.test_accuracy,
            auc: outcome.forest.auc,
        },
    };

    let path = out_dir.join("run_metadata.json");
    let json = serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write metadata: {}", path.display()))?;

    Ok(path)
}
