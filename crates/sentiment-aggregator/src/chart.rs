use anyhow::Result;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::pipeline::AggregateReport;
use crate::tally::SentimentCounts;

const CHART_SIZE: (u32, u32) = (2000, 1000);
const NEUTRAL_GREY: RGBColor = RGBColor(128, 128, 128);

/// Render the report to a PNG off the async runtime.
pub async fn generate_chart(report: &AggregateReport, path: &Path) -> Result<PathBuf> {
    if report.days.is_empty() {
        return Err(anyhow::anyhow!("No data to chart"));
    }

    let report = report.clone();
    let path = path.to_path_buf();

    let result = tokio::task::spawn_blocking(move || {
        render_chart(&report, &path)?;
        Ok::<_, anyhow::Error>(path)
    })
    .await??;

    Ok(result)
}

/// Day indices that get an x-axis label: one per week, starting with the first day
fn weekly_ticks(days: usize) -> Vec<u32> {
    (0..days as u32).step_by(7).collect()
}

fn y_upper_bound(report: &AggregateReport) -> u32 {
    report
        .days
        .iter()
        .map(|d| d.counts.positive.max(d.counts.negative).max(d.counts.neutral))
        .max()
        .unwrap_or(0)
        + 1
}

fn date_labels(report: &AggregateReport) -> Vec<String> {
    report
        .days
        .iter()
        .map(|d| d.date.format("%Y-%m-%d").to_string())
        .collect()
}

fn tick_label(labels: &[String], index: u32) -> String {
    labels.get(index as usize).cloned().unwrap_or_default()
}

fn series(report: &AggregateReport, pick: fn(&SentimentCounts) -> u32) -> Vec<(u32, u32)> {
    report
        .days
        .iter()
        .enumerate()
        .map(|(i, d)| (i as u32, pick(&d.counts)))
        .collect()
}

pub fn render_chart(report: &AggregateReport, path: &Path) -> Result<()> {
    let labels = date_labels(report);
    let last_index = (labels.len() as u32).saturating_sub(1).max(1);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} Sentiment Over Time", report.ticker), ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(110)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (0u32..last_index).with_key_points(weekly_ticks(labels.len())),
            0u32..y_upper_bound(report),
        )?;

    let date_label = |i: &u32| tick_label(&labels, *i);
    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Count")
        .x_label_formatter(&date_label)
        .x_label_style(("sans-serif", 14).into_font().transform(FontTransform::Rotate90))
        .draw()?;

    chart
        .draw_series(LineSeries::new(series(report, |c| c.positive), GREEN.stroke_width(2)))?
        .label("Positive")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));

    chart
        .draw_series(LineSeries::new(series(report, |c| c.negative), RED.stroke_width(2)))?
        .label("Negative")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .draw_series(DashedLineSeries::new(
            series(report, |c| c.neutral),
            10,
            6,
            NEUTRAL_GREY.stroke_width(2),
        ))?
        .label("Neutral")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], NEUTRAL_GREY));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Hand the image to the desktop viewer. Failures are logged, never fatal.
pub fn open_in_viewer(path: &Path) {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };

    match command.arg(path).spawn() {
        Ok(_) => tracing::debug!("Opened {} in the image viewer", path.display()),
        Err(e) => tracing::warn!("Could not display {}: {}", path.display(), e),
    }
}
