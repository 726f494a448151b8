//! Mean-target encoding of categorical attributes
//!
//! Each requested categorical column gains a numeric companion column named
//! `{column}_{response}` holding the mean of the response over all rows that
//! share the row's categorical value.

use std::collections::HashMap;

use anyhow::Result;
use polars::prelude::*;

use super::error::PipelineError;
use super::target::column_as_strings;

/// The categorical attributes known in advance to require encoding,
/// in output-column order.
pub const CATEGORICAL_COLUMNS: [&str; 5] = [
    "Gender",
    "Education_Level",
    "Marital_Status",
    "Income_Category",
    "Card_Category",
];

/// Mean-target encode the given categorical columns against a response.
///
/// - An empty `categorical` list returns the input unchanged (identity).
/// - Without a response the call is a no-op: the column set is preserved
///   exactly and no grouping is computed. Callers must supply a response to
///   obtain a true encoding transform.
/// - With a response, one new `{col}_{response}` column is appended per
///   categorical column; existing columns and values are untouched.
///
/// The grouped mean is computed over all rows of the table, without
/// train/test isolation. That leaks label information into the encoded
/// features; it is the behavior under test and is kept deliberately
/// (see DESIGN.md).
pub fn encode_categorical(
    df: &DataFrame,
    categorical: &[String],
    response: Option<&str>,
) -> Result<DataFrame> {
    if categorical.is_empty() {
        return Ok(df.clone());
    }

    let Some(response) = response else {
        return Ok(df.clone());
    };

    let response_col = df
        .column(response)
        .map_err(|_| PipelineError::MissingColumn(response.to_string()))?;
    let response_values: Vec<f64> = response_col
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();

    let mut encoded = df.clone();

    for col_name in categorical {
        let col = df
            .column(col_name)
            .map_err(|_| PipelineError::MissingColumn(col_name.clone()))?;
        let categories = column_as_strings(col)?;

        // Group-wise sum and count keyed by exact value equality.
        let mut groups: HashMap<Option<String>, (f64, u64)> = HashMap::new();
        for (category, &value) in categories.iter().zip(response_values.iter()) {
            let entry = groups.entry(category.clone()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }

        let means: Vec<f64> = categories
            .iter()
            .map(|category| {
                let (sum, count) = groups[category];
                sum / count as f64
            })
            .collect();

        let new_name = format!("{}_{}", col_name, response);
        encoded.with_column(Column::new(new_name.into(), means))?;
    }

    Ok(encoded)
}
