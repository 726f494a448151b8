//! Dataset loader for CSV and Parquet files

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use super::error::PipelineError;

/// Load a dataset from a file (CSV or Parquet based on extension).
///
/// Fails with [`PipelineError::DatasetNotFound`] when the path does not
/// resolve, and hard-fails when the loaded table has zero rows or columns.
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(PipelineError::DatasetNotFound(path.to_path_buf()).into());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(infer_schema_length))
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    let df = lf
        .collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))?;

    let (rows, cols) = df.shape();
    if rows == 0 || cols == 0 {
        anyhow::bail!(
            "Dataset {} is empty ({} rows, {} columns)",
            path.display(),
            rows,
            cols
        );
    }

    Ok(df)
}

/// Shape and memory statistics for a loaded dataset.
pub fn dataset_stats(df: &DataFrame) -> (usize, usize, f64) {
    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    (rows, cols, memory_mb)
}
