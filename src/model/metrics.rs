//! Classification metrics and reports
//!
//! Confusion counts, per-class precision/recall/F1, accuracy, and the ROC
//! curve with trapezoidal AUC. The classification report renders in the
//! familiar fixed-width layout so it reads the same in the terminal, the
//! text artifacts, and the rendered result panels.

use std::fmt;

use serde::Serialize;

/// Fraction of predictions matching the true labels.
pub fn accuracy(y_true: &[i64], y_pred: &[i64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Precision, recall, F1 and support for one class.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics plus the usual aggregate rows.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<(i64, ClassMetrics)>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub total_support: usize,
}

/// Build the classification report for binary 0/1 labels.
pub fn classification_report(y_true: &[i64], y_pred: &[i64]) -> ClassificationReport {
    let total = y_true.len();
    let mut classes = Vec::with_capacity(2);

    for class in [0i64, 1] {
        let tp = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(&t, &p)| t == class && p == class)
            .count() as f64;
        let fp = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(&t, &p)| t != class && p == class)
            .count() as f64;
        let fn_ = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(&t, &p)| t == class && p != class)
            .count() as f64;
        let support = y_true.iter().filter(|&&t| t == class).count();

        let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
        let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        classes.push((
            class,
            ClassMetrics {
                precision,
                recall,
                f1,
                support,
            },
        ));
    }

    let macro_avg = ClassMetrics {
        precision: classes.iter().map(|(_, m)| m.precision).sum::<f64>() / classes.len() as f64,
        recall: classes.iter().map(|(_, m)| m.recall).sum::<f64>() / classes.len() as f64,
        f1: classes.iter().map(|(_, m)| m.f1).sum::<f64>() / classes.len() as f64,
        support: total,
    };

    let weight = |f: fn(&ClassMetrics) -> f64| {
        classes
            .iter()
            .map(|(_, m)| f(m) * m.support as f64)
            .sum::<f64>()
            / total.max(1) as f64
    };
    let weighted_avg = ClassMetrics {
        precision: weight(|m| m.precision),
        recall: weight(|m| m.recall),
        f1: weight(|m| m.f1),
        support: total,
    };

    ClassificationReport {
        classes,
        accuracy: accuracy(y_true, y_pred),
        macro_avg,
        weighted_avg,
        total_support: total,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (class, m) in &self.classes {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                class, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.total_support
        )?;
        writeln!(
            f,
            "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            "macro avg",
            self.macro_avg.precision,
            self.macro_avg.recall,
            self.macro_avg.f1,
            self.macro_avg.support
        )?;
        writeln!(
            f,
            "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            "weighted avg",
            self.weighted_avg.precision,
            self.weighted_avg.recall,
            self.weighted_avg.f1,
            self.weighted_avg.support
        )?;
        Ok(())
    }
}

/// ROC curve points as (false positive rate, true positive rate), swept
/// from the highest score threshold down. Always starts at (0, 0) and ends
/// at (1, 1).
pub fn roc_curve(y_true: &[i64], scores: &[f64]) -> Vec<(f64, f64)> {
    let positives = y_true.iter().filter(|&&t| t == 1).count() as f64;
    let negatives = y_true.len() as f64 - positives;

    let mut order: Vec<usize> = (0..y_true.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut points = vec![(0.0, 0.0)];
    let mut tp = 0.0;
    let mut fp = 0.0;

    let mut i = 0;
    while i < order.len() {
        // Advance over ties so equal scores move the curve in one step.
        let threshold = scores[order[i]];
        while i < order.len() && scores[order[i]] == threshold {
            if y_true[order[i]] == 1 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            i += 1;
        }
        let tpr = if positives > 0.0 { tp / positives } else { 0.0 };
        let fpr = if negatives > 0.0 { fp / negatives } else { 0.0 };
        points.push((fpr, tpr));
    }

    if points.last() != Some(&(1.0, 1.0)) {
        points.push((1.0, 1.0));
    }
    points
}

/// Area under an ROC curve by the trapezoidal rule.
pub fn auc(points: &[(f64, f64)]) -> f64 {
    points
        .windows(2)
        .map(|w| {
            let (x0, y0) = w[0];
            let (x1, y1) = w[1];
            (x1 - x0) * (y0 + y1) / 2.0
        })
        .sum()
}
