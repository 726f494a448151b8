//! Exploratory data analysis
//!
//! Computes the statistics behind the five EDA artifacts: churn counts, the
//! customer-age and transaction-count histograms, marital-status category
//! frequencies, and the numeric correlation matrix.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use faer::Mat;
use polars::prelude::*;
use rayon::prelude::*;

use super::error::PipelineError;
use super::target::{column_as_strings, CHURN_COLUMN};
use crate::report::plots;

/// Distinct category labels with their row counts, sorted by label for
/// deterministic artifact output.
#[derive(Debug, Clone)]
pub struct CategoryCounts {
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

/// Equal-width histogram of a numeric column.
#[derive(Debug, Clone)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

/// Count rows per distinct value of a categorical column.
pub fn category_counts(df: &DataFrame, column: &str) -> Result<CategoryCounts> {
    let col = df
        .column(column)
        .map_err(|_| PipelineError::MissingColumn(column.to_string()))?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in column_as_strings(col)? {
        let key = value.unwrap_or_else(|| "<missing>".to_string());
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut pairs: Vec<(String, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(CategoryCounts {
        labels: pairs.iter().map(|(l, _)| l.clone()).collect(),
        counts: pairs.iter().map(|(_, c)| *c).collect(),
    })
}

/// Equal-width histogram over the non-null values of a numeric column.
pub fn numeric_histogram(df: &DataFrame, column: &str, bins: usize) -> Result<Histogram> {
    let col = df
        .column(column)
        .map_err(|_| PipelineError::MissingColumn(column.to_string()))?;

    let values: Vec<f64> = col
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .flatten()
        .collect();

    if values.is_empty() {
        anyhow::bail!("Column '{}' has no non-null values to histogram", column);
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    // A constant column still gets a single occupied bin.
    let width = if max > min {
        (max - min) / bins as f64
    } else {
        1.0
    };

    let mut counts = vec![0usize; bins];
    for &v in &values {
        let mut idx = ((v - min) / width) as usize;
        if idx >= bins {
            idx = bins - 1;
        }
        counts[idx] += 1;
    }

    Ok(Histogram {
        min,
        max,
        bin_width: width,
        counts,
    })
}

/// Pearson correlation matrix over the numeric columns.
///
/// Standardizes each column to zero mean and unit variance with a 1/sqrt(n)
/// scale, then computes R = Z^T * Z with faer. Constant and all-null columns
/// are skipped. Returns the matrix together with the retained column names.
pub fn correlation_matrix(df: &DataFrame) -> Result<(Vec<Vec<f64>>, Vec<String>)> {
    let numeric_cols: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| col.dtype().is_primitive_numeric())
        .map(|col| col.name().to_string())
        .collect();

    if numeric_cols.len() < 2 {
        anyhow::bail!("Need at least two numeric columns for a correlation matrix");
    }

    let float_columns: Vec<Column> = numeric_cols
        .iter()
        .filter_map(|name| {
            df.column(name)
                .ok()
                .and_then(|col| col.cast(&DataType::Float64).ok())
        })
        .collect();

    let n_rows = df.height();

    // Standardize each column in parallel; None marks a skipped column.
    let standardized: Vec<Option<Vec<f64>>> = float_columns
        .par_iter()
        .map(|col| {
            let ca = col.f64().ok()?;

            let mut sum = 0.0;
            let mut count = 0usize;
            for v in ca.iter().flatten() {
                sum += v;
                count += 1;
            }
            if count == 0 {
                return None;
            }
            let mean = sum / count as f64;

            let mut sq_dev = 0.0;
            for v in ca.iter().flatten() {
                let d = v - mean;
                sq_dev += d * d;
            }
            let std = (sq_dev / count as f64).sqrt();
            if std == 0.0 {
                return None;
            }

            let scale = 1.0 / (count as f64).sqrt();
            Some(
                ca.iter()
                    .map(|v| match v {
                        Some(x) => scale * (x - mean) / std,
                        None => 0.0,
                    })
                    .collect(),
            )
        })
        .collect();

    let valid: Vec<(usize, Vec<f64>)> = standardized
        .into_iter()
        .enumerate()
        .filter_map(|(i, opt)| opt.map(|v| (i, v)))
        .collect();

    if valid.len() < 2 {
        anyhow::bail!("Fewer than two non-constant numeric columns");
    }

    let names: Vec<String> = valid.iter().map(|(i, _)| numeric_cols[*i].clone()).collect();
    let n_cols = valid.len();

    let mut z = Mat::<f64>::zeros(n_rows, n_cols);
    for (col_idx, (_, col_data)) in valid.iter().enumerate() {
        for (row_idx, &val) in col_data.iter().enumerate() {
            z[(row_idx, col_idx)] = val;
        }
    }

    let corr = z.transpose() * &z;

    let mut matrix = vec![vec![0.0; n_cols]; n_cols];
    for (i, row) in matrix.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = corr[(i, j)];
        }
    }

    Ok((matrix, names))
}

/// Retained/churned row counts from the derived label column.
pub fn churn_counts(df: &DataFrame) -> Result<(usize, usize)> {
    let col = df
        .column(CHURN_COLUMN)
        .map_err(|_| PipelineError::MissingColumn(CHURN_COLUMN.to_string()))?;
    let labels = col.cast(&DataType::Int64)?;
    let churned = labels
        .i64()?
        .into_iter()
        .flatten()
        .filter(|&v| v == 1)
        .count();
    Ok((df.height() - churned, churned))
}

/// Number of bins used by the EDA histograms.
const EDA_HISTOGRAM_BINS: usize = 20;

/// Compute and render the five exploratory artifacts under
/// `<out>/images/eda/`. Returns the written paths in declared order.
pub fn run_eda(df: &DataFrame, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let eda_dir = out_dir.join("images").join("eda");
    std::fs::create_dir_all(&eda_dir)
        .map_err(|e| PipelineError::artifact(&eda_dir, e))?;

    let mut written = Vec::new();

    let (retained, churned) = churn_counts(df)?;
    let path = eda_dir.join("churn_distribution.svg");
    plots::render_bar_chart(
        &path,
        "Churn distribution",
        &["Retained".to_string(), "Churned".to_string()],
        &[retained, churned],
    )?;
    written.push(path);

    let hist = numeric_histogram(df, "Customer_Age", EDA_HISTOGRAM_BINS)?;
    let path = eda_dir.join("customer_age_distribution.svg");
    plots::render_histogram(&path, "Customer age distribution", &hist)?;
    written.push(path);

    let marital = category_counts(df, "Marital_Status")?;
    let path = eda_dir.join("marital_status_distribution.svg");
    plots::render_bar_chart(
        &path,
        "Marital status distribution",
        &marital.labels,
        &marital.counts,
    )?;
    written.push(path);

    let hist = numeric_histogram(df, "Total_Trans_Ct", EDA_HISTOGRAM_BINS)?;
    let path = eda_dir.join("total_transaction_distribution.svg");
    plots::render_histogram(&path, "Total transaction count distribution", &hist)?;
    written.push(path);

    let (matrix, names) = correlation_matrix(df)?;
    let path = eda_dir.join("heatmap.svg");
    plots::render_heatmap(&path, &names, &matrix)?;
    written.push(path);

    Ok(written)
}
