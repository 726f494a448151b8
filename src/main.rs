//! Churncast: Customer Churn Prediction CLI
//!
//! Runs the full batch pipeline in order: load, derive the churn target,
//! exploratory analysis, mean-target encoding, train/test split, training
//! and evaluation. Exits non-zero on the first fatal error.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use churncast::cli::Cli;
use churncast::model::{train_models, ParamGrid, TrainConfig};
use churncast::pipeline::{
    dataset_stats, derive_churn, encode_categorical, load_dataset, run_eda, split_features,
    SplitConfig, CATEGORICAL_COLUMNS, CHURN_COLUMN,
};
use churncast::report::{bundle_results, export_run_metadata, MetadataParams, RunSummary};
use churncast::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_count, print_info, print_step_header, print_step_time, print_success,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Print styled banner
    print_banner(env!("CARGO_PKG_VERSION"));

    // Print configuration card
    print_config(
        &cli.input,
        &cli.output_dir,
        cli.seed,
        cli.test_fraction,
        cli.max_iter,
    );

    // Step 1: Load dataset and derive the churn target
    print_step_header(1, "Load Dataset");

    let step_start = Instant::now();
    let spinner = create_spinner("Loading dataset...");
    let df = load_dataset(&cli.input, cli.infer_schema_length)?;
    let (rows, cols, memory_mb) = dataset_stats(&df);
    finish_with_success(&spinner, "Dataset loaded");

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);

    let df = derive_churn(df)?;
    print_success(&format!("Derived '{}' target column", CHURN_COLUMN));

    let mut summary = RunSummary::new(rows, cols);
    let load_elapsed = step_start.elapsed();
    summary.set_load_time(load_elapsed);
    print_step_time(load_elapsed);

    let mut artifacts: Vec<PathBuf> = Vec::new();

    // Step 2: Exploratory analysis
    print_step_header(2, "Exploratory Analysis");

    if cli.skip_eda {
        print_info("Skipped (--skip-eda)");
    } else {
        let step_start = Instant::now();
        let spinner = create_spinner("Rendering exploratory artifacts...");
        let eda_artifacts = run_eda(&df, &cli.output_dir)?;
        finish_with_success(&spinner, "Exploratory analysis complete");
        print_count("exploratory artifact(s)", eda_artifacts.len(), None);
        artifacts.extend(eda_artifacts);
        let eda_elapsed = step_start.elapsed();
        summary.set_eda_time(eda_elapsed);
        print_step_time(eda_elapsed);
    }

    // Step 3: Mean-target encoding of categorical attributes
    print_step_header(3, "Categorical Encoding");

    let step_start = Instant::now();
    let categorical: Vec<String> = CATEGORICAL_COLUMNS.iter().map(|s| s.to_string()).collect();
    let df = encode_categorical(&df, &categorical, Some(CHURN_COLUMN))?;
    print_count("encoded column(s)", categorical.len(), None);
    summary.columns = df.width();
    let encode_elapsed = step_start.elapsed();
    summary.set_encode_time(encode_elapsed);
    print_step_time(encode_elapsed);

    // Step 4: Feature engineering and split
    print_step_header(4, "Feature Engineering");

    let step_start = Instant::now();
    let split_config = SplitConfig {
        test_fraction: cli.test_fraction,
        seed: cli.seed,
    };
    let split = split_features(&df, CHURN_COLUMN, &split_config)?;
    print_success("Selected feature matrix and split rows");
    println!(
        "      Train rows: {}   Test rows: {}",
        style(split.x_train.height()).yellow().bold(),
        style(split.x_test.height()).yellow().bold()
    );
    summary.train_rows = split.x_train.height();
    summary.test_rows = split.x_test.height();
    let split_elapsed = step_start.elapsed();
    summary.set_split_time(split_elapsed);
    print_step_time(split_elapsed);

    // Step 5: Train and evaluate both models
    print_step_header(5, "Train & Evaluate");

    let step_start = Instant::now();
    let spinner = create_spinner("Fitting models (grid search may take a while)...");
    let train_config = TrainConfig {
        max_iter: cli.max_iter,
        seed: cli.seed,
        grid: ParamGrid::default(),
        cv_folds: cli.cv_folds,
    };
    let outcome = train_models(&split, &train_config, &cli.output_dir)?;
    finish_with_success(&spinner, "Models trained and persisted");
    print_count("evaluation artifact(s)", outcome.artifacts.len(), None);
    print_count("model file(s)", outcome.model_files.len(), None);
    artifacts.extend(outcome.artifacts.iter().cloned());
    let train_elapsed = step_start.elapsed();
    summary.set_train_time(train_elapsed);
    print_step_time(train_elapsed);

    // Export run metadata
    let metadata_path = export_run_metadata(
        &outcome,
        &MetadataParams {
            input_file: &cli.input.display().to_string(),
            seed: cli.seed,
            test_fraction: cli.test_fraction,
            rows,
            columns: df.width(),
            train_rows: split.x_train.height(),
            test_rows: split.x_test.height(),
        },
        &cli.output_dir,
    )?;
    print_success(&format!("Metadata exported to {}", metadata_path.display()));

    // Verify every named artifact exists and is non-empty before declaring
    // the run successful.
    verify_artifacts(&artifacts, &outcome.model_files)?;
    summary.artifact_count = artifacts.len();
    print_success("All artifacts verified on disk");

    // Display summary
    summary.display(&outcome);

    // Optionally bundle everything into one archive
    if cli.bundle {
        let zip_path = cli.output_dir.join("churncast_results.zip");
        let bundled = bundle_results(&cli.output_dir, &zip_path)?;
        print_success(&format!(
            "Bundled {} file(s) into {}",
            bundled,
            zip_path.display()
        ));
    }

    // Final completion message
    print_completion();

    Ok(())
}

/// Check that every plot/report artifact and model file exists and is
/// non-empty.
fn verify_artifacts(artifacts: &[PathBuf], model_files: &[PathBuf]) -> Result<()> {
    for path in artifacts.iter().chain(model_files.iter()) {
        let metadata = std::fs::metadata(path)
            .map_err(|_| anyhow::anyhow!("Expected artifact missing: {}", path.display()))?;
        if metadata.len() == 0 {
            anyhow::bail!("Artifact is empty: {}", path.display());
        }
    }
    Ok(())
}
