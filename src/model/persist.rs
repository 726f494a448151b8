//! Model persistence
//!
//! Both classifiers serialize to JSON under `<out>/models/` so a separate
//! process can reload them without retraining. Files are written only after
//! fitting fully succeeded; a failed fit leaves no model artifact behind.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::pipeline::PipelineError;

/// Well-known file name for the persisted logistic model.
pub const LOGISTIC_MODEL_FILE: &str = "logistic_model.json";

/// Well-known file name for the persisted random-forest model.
pub const RFC_MODEL_FILE: &str = "rfc_model.json";

/// Serialize a fitted model to the given path.
pub fn save_model<M: Serialize>(model: &M, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::artifact(path, e))?;
    }
    let file = File::create(path).map_err(|e| PipelineError::artifact(path, e))?;
    serde_json::to_writer(BufWriter::new(file), model)
        .map_err(|e| PipelineError::artifact(path, e))?;
    Ok(())
}

/// Reload a persisted model from disk.
pub fn load_model<M: DeserializeOwned>(path: &Path) -> Result<M> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open model file: {}", path.display()))?;
    let model = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse model file: {}", path.display()))?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::logistic::{LogisticConfig, LogisticRegression};
    use crate::model::Classifier;
    use tempfile::TempDir;

    #[test]
    fn test_roundtrip_preserves_predictions() {
        let x = vec![
            vec![1.0, 1.0],
            vec![2.0, 1.5],
            vec![8.0, 9.0],
            vec![9.0, 8.5],
        ];
        let y = vec![0, 0, 1, 1];

        let mut model = LogisticRegression::new(LogisticConfig::default());
        model.fit(&x, &y).unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(LOGISTIC_MODEL_FILE);
        save_model(&model, &path).unwrap();

        let reloaded: LogisticRegression = load_model(&path).unwrap();
        assert_eq!(model.predict(&x), reloaded.predict(&x));
        assert_eq!(model.predict_proba(&x), reloaded.predict_proba(&x));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.json");
        let result: Result<LogisticRegression> = load_model(&path);
        assert!(result.is_err());
    }
}
