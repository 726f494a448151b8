//! Feature selection and the seeded train/test split
//!
//! The model feature set is fixed and known in advance: the quantitative
//! bank-record columns plus the mean-target-encoded categorical columns.
//! The schema is validated up front so a missing column fails the stage
//! before any row is partitioned.

use anyhow::Result;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::encoder::CATEGORICAL_COLUMNS;
use super::error::PipelineError;

/// The quantitative attributes that feed the model directly.
pub const QUANT_COLUMNS: [&str; 14] = [
    "Customer_Age",
    "Dependent_count",
    "Months_on_book",
    "Total_Relationship_Count",
    "Months_Inactive_12_mon",
    "Contacts_Count_12_mon",
    "Credit_Limit",
    "Total_Revolving_Bal",
    "Avg_Open_To_Buy",
    "Total_Amt_Chng_Q4_Q1",
    "Total_Trans_Amt",
    "Total_Trans_Ct",
    "Total_Ct_Chng_Q4_Q1",
    "Avg_Utilization_Ratio",
];

/// Role a column plays in the model feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// A raw numeric attribute used as-is.
    Quantitative,
    /// A mean-target-encoded categorical attribute.
    Encoded,
    /// The prediction target.
    Label,
}

/// A named column with its role in the feature matrix.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub name: String,
    pub role: ColumnRole,
}

/// The typed feature schema: name and role for every column the model
/// consumes. Built once per run and validated against the table before any
/// row is selected, replacing ad-hoc runtime string lookups.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    columns: Vec<ColumnSpec>,
}

impl FeatureSchema {
    /// The fixed bank-churn schema: quantitative columns, encoded
    /// categorical columns named `{col}_{response}`, and the label.
    pub fn bank(response: &str) -> Self {
        let mut columns: Vec<ColumnSpec> = QUANT_COLUMNS
            .iter()
            .map(|name| ColumnSpec {
                name: name.to_string(),
                role: ColumnRole::Quantitative,
            })
            .collect();

        columns.extend(CATEGORICAL_COLUMNS.iter().map(|name| ColumnSpec {
            name: format!("{}_{}", name, response),
            role: ColumnRole::Encoded,
        }));

        columns.push(ColumnSpec {
            name: response.to_string(),
            role: ColumnRole::Label,
        });

        FeatureSchema { columns }
    }

    /// Names of the feature columns (everything except the label), in
    /// schema order.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.role != ColumnRole::Label)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Check every schema column exists in the table.
    pub fn validate(&self, df: &DataFrame) -> Result<(), PipelineError> {
        for spec in &self.columns {
            if df.column(&spec.name).is_err() {
                return Err(PipelineError::MissingColumn(spec.name.clone()));
            }
        }
        Ok(())
    }
}

/// Split configuration: held-out fraction and shuffle seed.
///
/// The seed is explicit configuration threaded through the call, never
/// hidden process-wide state, so repeated runs and tests control it.
#[derive(Debug, Clone, Copy)]
pub struct SplitConfig {
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.3,
            seed: 42,
        }
    }
}

/// The partitioned feature matrices and label vectors.
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Vec<i64>,
    pub y_test: Vec<i64>,
}

/// Select the fixed feature set and partition rows into train/test subsets.
///
/// The partition is a seeded pseudo-random shuffle of row indices; for a
/// fixed input table and seed the membership is identical on every
/// invocation. The test partition holds `ceil(test_fraction * rows)` rows
/// and the two partitions are disjoint with the full table as their union.
pub fn split_features(df: &DataFrame, response: &str, config: &SplitConfig) -> Result<Split> {
    if df.column(response).is_err() {
        return Err(PipelineError::MissingColumn(response.to_string()).into());
    }

    let schema = FeatureSchema::bank(response);
    schema.validate(df)?;

    let feature_names = schema.feature_names();
    let x = df.select(feature_names.iter().map(|s| s.as_str()))?;
    let y: Vec<i64> = df
        .column(response)?
        .cast(&DataType::Int64)?
        .i64()?
        .into_iter()
        .map(|v| v.unwrap_or(0))
        .collect();

    let n = df.height();
    let test_len = (config.test_fraction * n as f64).ceil() as usize;

    let mut indices: Vec<u32> = (0..n as u32).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(test_len);

    let test_ca = IdxCa::from_vec("idx".into(), test_idx.to_vec());
    let train_ca = IdxCa::from_vec("idx".into(), train_idx.to_vec());

    let x_test = x.take(&test_ca)?;
    let x_train = x.take(&train_ca)?;
    let y_test: Vec<i64> = test_idx.iter().map(|&i| y[i as usize]).collect();
    let y_train: Vec<i64> = train_idx.iter().map(|&i| y[i as usize]).collect();

    Ok(Split {
        x_train,
        x_test,
        y_train,
        y_test,
    })
}

/// Convert a numeric feature frame into row-major f64 vectors for the
/// model layer.
pub fn to_rows(df: &DataFrame) -> Result<Vec<Vec<f64>>> {
    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(df.width());
    for col in df.get_columns() {
        let values: Vec<f64> = col
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();
        columns.push(values);
    }

    let n = df.height();
    let mut rows = vec![vec![0.0; columns.len()]; n];
    for (j, col) in columns.iter().enumerate() {
        for (i, &v) in col.iter().enumerate() {
            rows[i][j] = v;
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_has_nineteen_features() {
        let schema = FeatureSchema::bank("Churn");
        assert_eq!(schema.feature_names().len(), 19);
    }

    #[test]
    fn test_schema_encoded_names_follow_response() {
        let schema = FeatureSchema::bank("Churn");
        let names = schema.feature_names();
        assert!(names.contains(&"Gender_Churn".to_string()));
        assert!(names.contains(&"Card_Category_Churn".to_string()));
    }

    #[test]
    fn test_test_len_uses_ceiling() {
        // 0.3 * 7 = 2.1 -> 3 test rows.
        let n = 7usize;
        let test_len = (0.3 * n as f64).ceil() as usize;
        assert_eq!(test_len, 3);
    }

    #[test]
    fn test_missing_response_fails() {
        let df = df! {
            "Customer_Age" => [45i64, 58],
        }
        .unwrap();

        let err = split_features(&df, "Churn", &SplitConfig::default()).unwrap_err();
        let pipeline_err = err.downcast_ref::<PipelineError>().unwrap();
        assert!(matches!(pipeline_err, PipelineError::MissingColumn(c) if c == "Churn"));
    }

    #[test]
    fn test_to_rows_is_row_major() {
        let df = df! {
            "a" => [1.0f64, 2.0],
            "b" => [10.0f64, 20.0],
        }
        .unwrap();

        let rows = to_rows(&df).unwrap();
        assert_eq!(rows, vec![vec![1.0, 10.0], vec![2.0, 20.0]]);
    }
}
