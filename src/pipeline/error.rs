//! Error types for the churn prediction pipeline.
//!
//! Every variant is fatal: stages fail fast and propagate upward unmodified.
//! There is no retry or local recovery anywhere in the pipeline, and no
//! partial success state is left behind (a model file is only written after
//! fitting fully succeeded).

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the pipeline stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The dataset path did not resolve to a readable file.
    #[error("Dataset not found: {0}")]
    DatasetNotFound(PathBuf),

    /// A required column is absent from the loaded table.
    #[error("Required column '{0}' not found in dataset")]
    MissingColumn(String),

    /// The training labels cannot support fitting a classifier,
    /// e.g. every row carries the same class.
    #[error("Degenerate training data: {0}")]
    DegenerateTrainingData(String),

    /// An evaluation artifact or model file could not be written.
    #[error("Failed to write artifact {path}: {message}")]
    ArtifactWrite { path: PathBuf, message: String },
}

impl PipelineError {
    /// Wrap an arbitrary write/render error against the artifact path.
    pub fn artifact(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        PipelineError::ArtifactWrite {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_not_found_display() {
        let err = PipelineError::DatasetNotFound(PathBuf::from("./data/bank_data.csv"));
        assert_eq!(err.to_string(), "Dataset not found: ./data/bank_data.csv");
    }

    #[test]
    fn test_missing_column_display() {
        let err = PipelineError::MissingColumn("Attrition_Flag".to_string());
        assert_eq!(
            err.to_string(),
            "Required column 'Attrition_Flag' not found in dataset"
        );
    }

    #[test]
    fn test_degenerate_training_data_display() {
        let err = PipelineError::DegenerateTrainingData(
            "label vector contains a single class".to_string(),
        );
        assert!(err.to_string().contains("single class"));
    }

    #[test]
    fn test_artifact_write_display() {
        let err = PipelineError::artifact(
            std::path::Path::new("images/eda/heatmap.svg"),
            "permission denied",
        );
        assert!(err.to_string().contains("heatmap.svg"));
        assert!(err.to_string().contains("permission denied"));
    }
}
