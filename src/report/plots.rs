//! Chart artifact rendering
//!
//! All image artifacts are drawn with plotters against the SVG backend:
//! EDA bar charts and histograms, the correlation heatmap, the ROC
//! comparison, the feature-importance ranking, and the rendered
//! classification-report panels. Every renderer maps failures to
//! [`PipelineError::ArtifactWrite`] against the artifact path.

use std::path::Path;

use plotters::prelude::*;
use plotters::style::full_palette::{BLUE_600, GREEN_600, RED_600};

use crate::pipeline::eda::Histogram;
use crate::pipeline::PipelineError;

/// Canvas size shared by all chart artifacts.
const CHART_SIZE: (u32, u32) = (900, 600);

type DrawResult = Result<(), Box<dyn std::error::Error>>;

/// Bar chart of labeled counts (churn distribution, marital status).
pub fn render_bar_chart(
    path: &Path,
    title: &str,
    labels: &[String],
    counts: &[usize],
) -> Result<(), PipelineError> {
    draw_bar_chart(path, title, labels, counts).map_err(|e| PipelineError::artifact(path, e))
}

fn draw_bar_chart(path: &Path, title: &str, labels: &[String], counts: &[usize]) -> DrawResult {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let n = labels.len();
    let y_max = counts.iter().copied().max().unwrap_or(1).max(1) as f64 * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..n as f64, 0f64..y_max)?;

    let labels = labels.to_vec();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n.max(2))
        .x_label_formatter(&move |v| {
            let idx = v.floor() as usize;
            labels.get(idx).cloned().unwrap_or_default()
        })
        .y_desc("Count")
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, &count)| {
        Rectangle::new(
            [(i as f64 + 0.15, 0.0), (i as f64 + 0.85, count as f64)],
            BLUE_600.filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Histogram of a numeric attribute.
pub fn render_histogram(path: &Path, title: &str, hist: &Histogram) -> Result<(), PipelineError> {
    draw_histogram(path, title, hist).map_err(|e| PipelineError::artifact(path, e))
}

fn draw_histogram(path: &Path, title: &str, hist: &Histogram) -> DrawResult {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = hist.counts.iter().copied().max().unwrap_or(1).max(1) as f64 * 1.1;
    let x_max = hist.min + hist.bin_width * hist.counts.len() as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(hist.min..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Count")
        .draw()?;

    chart.draw_series(hist.counts.iter().enumerate().map(|(i, &count)| {
        let x0 = hist.min + hist.bin_width * i as f64;
        let x1 = x0 + hist.bin_width;
        Rectangle::new([(x0, 0.0), (x1, count as f64)], BLUE_600.filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Correlation heatmap over numeric columns.
pub fn render_heatmap(
    path: &Path,
    names: &[String],
    matrix: &[Vec<f64>],
) -> Result<(), PipelineError> {
    draw_heatmap(path, names, matrix).map_err(|e| PipelineError::artifact(path, e))
}

fn draw_heatmap(path: &Path, names: &[String], matrix: &[Vec<f64>]) -> DrawResult {
    let root = SVGBackend::new(path, (1000, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let n = names.len();

    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation heatmap", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(140)
        .y_label_area_size(180)
        .build_cartesian_2d(0f64..n as f64, 0f64..n as f64)?;

    let x_names = names.to_vec();
    let y_names = names.to_vec();
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n.max(2))
        .y_labels(n.max(2))
        .x_label_formatter(&move |v| {
            let idx = v.floor() as usize;
            x_names.get(idx).cloned().unwrap_or_default()
        })
        .y_label_formatter(&move |v| {
            // Row 0 is drawn at the top of the chart.
            let idx = n.saturating_sub(1).saturating_sub(v.floor() as usize);
            y_names.get(idx).cloned().unwrap_or_default()
        })
        .x_label_style(("sans-serif", 10).into_font().transform(FontTransform::Rotate90))
        .y_label_style(("sans-serif", 10))
        .draw()?;

    chart.draw_series(matrix.iter().enumerate().flat_map(|(i, row)| {
        row.iter().enumerate().map(move |(j, &corr)| {
            let y = (n - 1 - i) as f64;
            Rectangle::new(
                [(j as f64, y), (j as f64 + 1.0, y + 1.0)],
                correlation_color(corr).filled(),
            )
        })
    }))?;

    root.present()?;
    Ok(())
}

/// Diverging blue-white-red color for a correlation in [-1, 1].
fn correlation_color(corr: f64) -> RGBColor {
    let c = corr.clamp(-1.0, 1.0);
    let lerp = |from: u8, to: u8, t: f64| (from as f64 + (to as f64 - from as f64) * t) as u8;
    if c < 0.0 {
        let t = -c;
        RGBColor(lerp(255, 33, t), lerp(255, 102, t), lerp(255, 172, t))
    } else {
        RGBColor(lerp(255, 178, c), lerp(255, 24, c), lerp(255, 43, c))
    }
}

/// ROC curves for the fitted models on the held-out partition.
pub fn render_roc(
    path: &Path,
    series: &[(String, Vec<(f64, f64)>, f64)],
) -> Result<(), PipelineError> {
    draw_roc(path, series).map_err(|e| PipelineError::artifact(path, e))
}

fn draw_roc(path: &Path, series: &[(String, Vec<(f64, f64)>, f64)]) -> DrawResult {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("ROC curve", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..1f64, 0f64..1f64)?;

    chart
        .configure_mesh()
        .x_desc("False positive rate")
        .y_desc("True positive rate")
        .draw()?;

    // Chance diagonal for reference.
    chart.draw_series(LineSeries::new(
        [(0.0, 0.0), (1.0, 1.0)],
        BLACK.mix(0.3),
    ))?;

    let palette = [BLUE_600, RED_600, GREEN_600];
    for (idx, (name, points, auc)) in series.iter().enumerate() {
        let color = palette[idx % palette.len()];
        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(format!("{} (AUC = {:.3})", name, auc))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Ranked feature importances for the ensemble model.
pub fn render_feature_importances(
    path: &Path,
    importances: &[(String, f64)],
) -> Result<(), PipelineError> {
    draw_feature_importances(path, importances).map_err(|e| PipelineError::artifact(path, e))
}

fn draw_feature_importances(path: &Path, importances: &[(String, f64)]) -> DrawResult {
    let root = SVGBackend::new(path, (900, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let n = importances.len();
    let y_max = importances
        .iter()
        .map(|(_, v)| *v)
        .fold(0.0f64, f64::max)
        .max(1e-6)
        * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Feature importances", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(160)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..n as f64, 0f64..y_max)?;

    let labels: Vec<String> = importances.iter().map(|(name, _)| name.clone()).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n.max(2))
        .x_label_formatter(&move |v| {
            let idx = v.floor() as usize;
            labels.get(idx).cloned().unwrap_or_default()
        })
        .x_label_style(("sans-serif", 10).into_font().transform(FontTransform::Rotate90))
        .y_desc("Importance")
        .draw()?;

    chart.draw_series(importances.iter().enumerate().map(|(i, (_, value))| {
        Rectangle::new(
            [(i as f64 + 0.15, 0.0), (i as f64 + 0.85, *value)],
            GREEN_600.filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Text panel with the train and test classification reports of one model.
pub fn render_report_panel(
    path: &Path,
    title: &str,
    train_report: &str,
    test_report: &str,
) -> Result<(), PipelineError> {
    draw_report_panel(path, title, train_report, test_report)
        .map_err(|e| PipelineError::artifact(path, e))
}

fn draw_report_panel(
    path: &Path,
    title: &str,
    train_report: &str,
    test_report: &str,
) -> DrawResult {
    let root = SVGBackend::new(path, (700, 650)).into_drawing_area();
    root.fill(&WHITE)?;

    root.draw(&Text::new(
        title.to_string(),
        (40, 30),
        ("sans-serif", 22).into_font(),
    ))?;

    let mut y = 80;
    for (section, report) in [("Train", train_report), ("Test", test_report)] {
        root.draw(&Text::new(
            section.to_string(),
            (40, y),
            ("sans-serif", 16).into_font(),
        ))?;
        y += 24;
        for line in report.lines() {
            root.draw(&Text::new(
                line.to_string(),
                (40, y),
                ("monospace", 13).into_font(),
            ))?;
            y += 18;
        }
        y += 24;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bar_chart_writes_nonempty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bars.svg");
        render_bar_chart(
            &path,
            "Churn distribution",
            &["Retained".to_string(), "Churned".to_string()],
            &[80, 20],
        )
        .unwrap();

        assert!(path.is_file());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_roc_writes_nonempty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roc.svg");
        render_roc(
            &path,
            &[(
                "model".to_string(),
                vec![(0.0, 0.0), (0.2, 0.8), (1.0, 1.0)],
                0.8,
            )],
        )
        .unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_report_panel_writes_nonempty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("panel.svg");
        render_report_panel(&path, "Model results", "line one\nline two", "line three")
            .unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_correlation_color_endpoints() {
        assert_eq!(correlation_color(0.0), RGBColor(255, 255, 255));
        assert_eq!(correlation_color(1.0), RGBColor(178, 24, 43));
        assert_eq!(correlation_color(-1.0), RGBColor(33, 102, 172));
    }
}
