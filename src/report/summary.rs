//! Training run summary

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::model::trainer::TrainOutcome;

/// Summary of a full pipeline run, displayed after training completes.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub rows: usize,
    pub columns: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub artifact_count: usize,
    pub load_time: Option<Duration>,
    pub eda_time: Option<Duration>,
    pub encode_time: Option<Duration>,
    pub split_time: Option<Duration>,
    pub train_time: Option<Duration>,
}

impl RunSummary {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            ..Default::default()
        }
    }

    pub fn set_load_time(&mut self, d: Duration) {
        self.load_time = Some(d);
    }

    pub fn set_eda_time(&mut self, d: Duration) {
        self.eda_time = Some(d);
    }

    pub fn set_encode_time(&mut self, d: Duration) {
        self.encode_time = Some(d);
    }

    pub fn set_split_time(&mut self, d: Duration) {
        self.split_time = Some(d);
    }

    pub fn set_train_time(&mut self, d: Duration) {
        self.train_time = Some(d);
    }

    pub fn display(&self, outcome: &TrainOutcome) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("TRAINING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("Rows"),
            Cell::new(self.rows),
        ]);
        table.add_row(vec![
            Cell::new("Columns (after encoding)"),
            Cell::new(self.columns),
        ]);
        table.add_row(vec![
            Cell::new("Train rows"),
            Cell::new(self.train_rows),
        ]);
        table.add_row(vec![
            Cell::new("Test rows"),
            Cell::new(self.test_rows),
        ]);

        let depth = match outcome.best_config.max_depth {
            Some(d) => d.to_string(),
            None => "unlimited".to_string(),
        };
        table.add_row(vec![
            Cell::new("Forest (grid winner)"),
            Cell::new(format!(
                "{} trees, depth {}, {}, min leaf {}",
                outcome.best_config.n_estimators,
                depth,
                outcome.best_config.criterion,
                outcome.best_config.min_samples_leaf
            )),
        ]);
        table.add_row(vec![
            Cell::new("Forest CV accuracy"),
            Cell::new(format!("{:.4}", outcome.best_cv_score)).fg(Color::Cyan),
        ]);
        table.add_row(vec![
            Cell::new("Forest test accuracy / AUC"),
            Cell::new(format!(
                "{:.4} / {:.4}",
                outcome.forest.test_accuracy, outcome.forest.auc
            ))
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("Logistic test accuracy / AUC"),
            Cell::new(format!(
                "{:.4} / {:.4}",
                outcome.logistic.test_accuracy, outcome.logistic.auc
            ))
            .fg(Color::Green),
        ]);
        table.add_row(vec![
            Cell::new("Artifacts written"),
            Cell::new(self.artifact_count),
        ]);

        let timings = [
            ("Load", self.load_time),
            ("EDA", self.eda_time),
            ("Encode", self.encode_time),
            ("Split", self.split_time),
            ("Train", self.train_time),
        ];
        for (label, time) in timings {
            if let Some(d) = time {
                table.add_row(vec![
                    Cell::new(format!("{} time", label)),
                    Cell::new(format!("{:.2}s", d.as_secs_f64())),
                ]);
            }
        }

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }
    }
}
