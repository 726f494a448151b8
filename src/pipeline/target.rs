//! Churn target derivation
//!
//! Maps the categorical attrition status column to the binary 0/1 label the
//! downstream encoder, splitter, and trainers consume.

use anyhow::Result;
use polars::prelude::*;

use super::error::PipelineError;

/// Source column holding the attrition status literal.
pub const ATTRITION_COLUMN: &str = "Attrition_Flag";

/// Derived binary label column.
pub const CHURN_COLUMN: &str = "Churn";

/// Status literal that marks a retained customer.
const RETAINED_LITERAL: &str = "Existing Customer";

/// Append the binary `Churn` column derived from the attrition status.
///
/// The mapping is applied independently per row: the exact literal
/// `"Existing Customer"` maps to 0, anything else maps to 1. Unknown status
/// values are intentionally not validated - any non-retained literal counts
/// as churn.
pub fn derive_churn(df: DataFrame) -> Result<DataFrame> {
    let status = df
        .column(ATTRITION_COLUMN)
        .map_err(|_| PipelineError::MissingColumn(ATTRITION_COLUMN.to_string()))?;

    let labels: Vec<i64> = column_as_strings(status)?
        .iter()
        .map(|v| match v.as_deref() {
            Some(RETAINED_LITERAL) => 0,
            _ => 1,
        })
        .collect();

    let mut df = df;
    df.with_column(Column::new(CHURN_COLUMN.into(), labels))?;
    Ok(df)
}

/// Convert a column to a Vec of Option<String> for exact-match comparison.
pub(crate) fn column_as_strings(col: &Column) -> Result<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_customer_maps_to_zero() {
        let df = df! {
            ATTRITION_COLUMN => ["Existing Customer", "Attrited Customer", "Existing Customer"],
            "Customer_Age" => [45i64, 58, 39],
        }
        .unwrap();

        let df = derive_churn(df).unwrap();
        let churn: Vec<i64> = df
            .column(CHURN_COLUMN)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();

        assert_eq!(churn, vec![0, 1, 0]);
    }

    #[test]
    fn test_unknown_status_counts_as_churn() {
        let df = df! {
            ATTRITION_COLUMN => ["Existing Customer", "Dormant", "", "existing customer"],
            "Customer_Age" => [45i64, 58, 39, 61],
        }
        .unwrap();

        let df = derive_churn(df).unwrap();
        let churn: Vec<i64> = df
            .column(CHURN_COLUMN)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();

        // Only the exact literal is retained; case variants and unknown
        // statuses all map to churn.
        assert_eq!(churn, vec![0, 1, 1, 1]);
    }

    #[test]
    fn test_missing_attrition_column() {
        let df = df! {
            "Customer_Age" => [45i64, 58],
        }
        .unwrap();

        let err = derive_churn(df).unwrap_err();
        let pipeline_err = err.downcast_ref::<PipelineError>().unwrap();
        assert!(matches!(pipeline_err, PipelineError::MissingColumn(c) if c == ATTRITION_COLUMN));
    }

    #[test]
    fn test_churn_column_is_never_null() {
        let df = df! {
            ATTRITION_COLUMN => [Some("Existing Customer"), None, Some("Attrited Customer")],
            "Customer_Age" => [45i64, 58, 39],
        }
        .unwrap();

        let df = derive_churn(df).unwrap();
        let churn = df.column(CHURN_COLUMN).unwrap();
        assert_eq!(churn.null_count(), 0);
    }
}
