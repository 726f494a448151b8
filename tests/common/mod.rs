//! Shared test utilities and fixture generators

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Cyclic category pools matching the bank-record schema.
const EDUCATION: [&str; 4] = ["High School", "Graduate", "Uneducated", "College"];
const MARITAL: [&str; 3] = ["Married", "Single", "Divorced"];
const INCOME: [&str; 4] = [
    "Less than $40K",
    "$40K - $60K",
    "$60K - $80K",
    "$80K - $120K",
];
const CARD: [&str; 3] = ["Blue", "Silver", "Gold"];

/// Create a synthetic bank-customer DataFrame with the full column set the
/// pipeline expects.
///
/// Characteristics:
/// - Every 5th row is an attrited customer (20% churn rate)
/// - `Credit_Limit` is strictly increasing, so each row is uniquely
///   identifiable after the split
/// - Transaction amount and count carry real signal: attrited customers
///   transact less, so the classifiers have something to learn
pub fn create_bank_dataframe(rows: usize) -> DataFrame {
    let mut attrition = Vec::with_capacity(rows);
    let mut gender = Vec::with_capacity(rows);
    let mut education = Vec::with_capacity(rows);
    let mut marital = Vec::with_capacity(rows);
    let mut income = Vec::with_capacity(rows);
    let mut card = Vec::with_capacity(rows);

    let mut age = Vec::with_capacity(rows);
    let mut dependents = Vec::with_capacity(rows);
    let mut months_on_book = Vec::with_capacity(rows);
    let mut relationships = Vec::with_capacity(rows);
    let mut inactive = Vec::with_capacity(rows);
    let mut contacts = Vec::with_capacity(rows);
    let mut credit_limit = Vec::with_capacity(rows);
    let mut revolving = Vec::with_capacity(rows);
    let mut open_to_buy = Vec::with_capacity(rows);
    let mut amt_chng = Vec::with_capacity(rows);
    let mut trans_amt = Vec::with_capacity(rows);
    let mut trans_ct = Vec::with_capacity(rows);
    let mut ct_chng = Vec::with_capacity(rows);
    let mut utilization = Vec::with_capacity(rows);

    for i in 0..rows {
        let churned = i % 5 == 0;
        attrition.push(if churned {
            "Attrited Customer"
        } else {
            "Existing Customer"
        });

        gender.push(if i % 2 == 0 { "F" } else { "M" });
        education.push(EDUCATION[i % EDUCATION.len()]);
        marital.push(MARITAL[i % MARITAL.len()]);
        income.push(INCOME[i % INCOME.len()]);
        card.push(CARD[i % CARD.len()]);

        age.push(26 + (i as i64 * 7) % 47);
        dependents.push((i % 5) as i64);
        months_on_book.push(13 + (i as i64 * 3) % 40);
        relationships.push(1 + (i % 6) as i64);
        inactive.push((i % 6) as i64);
        contacts.push((i % 6) as i64);

        let limit = 1500.0 + i as f64 * 97.0;
        let bal = ((i * 53) % 2500) as f64;
        credit_limit.push(limit);
        revolving.push(bal);
        open_to_buy.push(limit - bal);
        amt_chng.push(0.5 + (i % 10) as f64 / 10.0);

        if churned {
            trans_amt.push(1500.0 + ((i * 31) % 1000) as f64);
            trans_ct.push((35 + i % 15) as i64);
        } else {
            trans_amt.push(3500.0 + ((i * 31) % 3000) as f64);
            trans_ct.push((60 + i % 40) as i64);
        }
        ct_chng.push(0.4 + (i % 12) as f64 / 10.0);
        utilization.push(((i * 7) % 100) as f64 / 100.0);
    }

    DataFrame::new(vec![
        Column::new("Attrition_Flag".into(), attrition),
        Column::new("Gender".into(), gender),
        Column::new("Education_Level".into(), education),
        Column::new("Marital_Status".into(), marital),
        Column::new("Income_Category".into(), income),
        Column::new("Card_Category".into(), card),
        Column::new("Customer_Age".into(), age),
        Column::new("Dependent_count".into(), dependents),
        Column::new("Months_on_book".into(), months_on_book),
        Column::new("Total_Relationship_Count".into(), relationships),
        Column::new("Months_Inactive_12_mon".into(), inactive),
        Column::new("Contacts_Count_12_mon".into(), contacts),
        Column::new("Credit_Limit".into(), credit_limit),
        Column::new("Total_Revolving_Bal".into(), revolving),
        Column::new("Avg_Open_To_Buy".into(), open_to_buy),
        Column::new("Total_Amt_Chng_Q4_Q1".into(), amt_chng),
        Column::new("Total_Trans_Amt".into(), trans_amt),
        Column::new("Total_Trans_Ct".into(), trans_ct),
        Column::new("Total_Ct_Chng_Q4_Q1".into(), ct_chng),
        Column::new("Avg_Utilization_Ratio".into(), utilization),
    ])
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("bank_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(
        rows, expected_rows,
        "Row count mismatch: expected {}, got {}",
        expected_rows, rows
    );
    assert_eq!(
        cols, expected_cols,
        "Column count mismatch: expected {}, got {}",
        expected_cols, cols
    );
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Collect a numeric column as an f64 vector for membership checks
pub fn column_values(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect()
}
