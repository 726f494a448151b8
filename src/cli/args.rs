//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

/// Churncast - Predict bank customer churn from tabular records
#[derive(Parser, Debug)]
#[command(name = "churncast")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input dataset path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory for models, images and reports
    #[arg(short, long, default_value = "artifacts")]
    pub output_dir: PathBuf,

    /// Seed for the train/test shuffle and the forest bootstrap.
    /// Fixing the seed makes row membership reproducible across runs.
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Held-out fraction of rows used for evaluation
    #[arg(long, default_value = "0.3", value_parser = validate_fraction)]
    pub test_fraction: f64,

    /// Maximum gradient-descent iterations for the logistic baseline
    #[arg(long, default_value = "3000")]
    pub max_iter: usize,

    /// Cross-validation folds used by the grid search
    #[arg(long, default_value = "5", value_parser = validate_folds)]
    pub cv_folds: usize,

    /// Number of rows to use for schema inference (CSV only).
    /// Higher values improve type detection for ambiguous columns but may be slower.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Skip the exploratory-analysis artifacts
    #[arg(long, default_value = "false")]
    pub skip_eda: bool,

    /// Bundle the output directory into churncast_results.zip after the run
    #[arg(long, default_value = "false")]
    pub bundle: bool,
}

/// Validator for the test fraction parameter
fn validate_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value <= 0.0 || value >= 1.0 {
        Err(format!(
            "test_fraction must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    } else {
        Ok(value)
    }
}

/// Validator for the cross-validation fold count
fn validate_folds(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid integer", s))?;

    if value < 2 {
        Err(format!("cv_folds must be at least 2, got {}", value))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_bounds() {
        assert!(validate_fraction("0.3").is_ok());
        assert!(validate_fraction("0").is_err());
        assert!(validate_fraction("1.0").is_err());
        assert!(validate_fraction("abc").is_err());
    }

    #[test]
    fn test_fold_bounds() {
        assert!(validate_folds("5").is_ok());
        assert!(validate_folds("1").is_err());
    }
}
