use std::{
    error::Error,
    path::{Path, PathBuf},
};

use campus_domain::MergedDataset;
use plotters::{coord::Shift, prelude::*, style::full_palette::ORANGE};
use time::{Date, Duration};

use crate::{
    aggregate::{building_weekly_means, BuildingWeeklyMean, DailyTotal},
    pipeline::{PipelineError, RunArtifacts, Sink},
};

pub const DASHBOARD_FILE: &str = "dashboard.svg";

type Panel<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type DrawResult = Result<(), Box<dyn Error>>;

/// Three stacked charts: daily campus line, average weekly usage per
/// building, and hour-of-day scatter of every reading.
pub struct DashboardSink {
    path: PathBuf,
    size: (u32, u32),
}

impl DashboardSink {
    pub fn new(output_dir: &Path, width: u32, height: u32) -> Self {
        Self {
            path: output_dir.join(DASHBOARD_FILE),
            size: (width, height),
        }
    }
}

impl Sink for DashboardSink {
    fn name(&self) -> &'static str {
        "dashboard"
    }

    fn write(&self, run: &RunArtifacts<'_>) -> Result<(), PipelineError> {
        if run.dataset.is_empty() {
            tracing::warn!("no data to plot, skipping dashboard");
            return Ok(());
        }

        render(&self.path, self.size, run)
            .map_err(|e| PipelineError::Sink(format!("failed to render {}: {e}", self.path.display())))?;
        tracing::info!(path = %self.path.display(), "wrote dashboard");
        Ok(())
    }
}

fn render(path: &Path, size: (u32, u32), run: &RunArtifacts<'_>) -> DrawResult {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((3, 1));
    draw_daily(&panels[0], &run.views.daily)?;
    draw_weekly_by_building(&panels[1], &building_weekly_means(run.dataset))?;
    draw_peak_hours(&panels[2], run.dataset)?;

    root.present()?;
    Ok(())
}

fn y_upper(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn day_label(start: Date, offset: i64) -> String {
    start
        .checked_add(Duration::days(offset))
        .map(|d| d.to_string())
        .unwrap_or_default()
}

fn draw_daily(area: &Panel<'_>, daily: &[DailyTotal]) -> DrawResult {
    let (Some(first), Some(last)) = (daily.first(), daily.last()) else {
        return Ok(());
    };
    let start = first.date;
    let span = (last.date - start).whole_days().max(1);

    let mut chart = ChartBuilder::on(area)
        .caption("Daily Campus Consumption", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(0i64..span, 0f64..y_upper(daily.iter().map(|d| d.kwh_sum)))?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("kWh")
        .x_label_formatter(&|offset: &i64| day_label(start, *offset))
        .draw()?;

    let points: Vec<(i64, f64)> = daily
        .iter()
        .map(|d| ((d.date - start).whole_days(), d.kwh_sum))
        .collect();
    chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
    chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))?;
    Ok(())
}

fn draw_weekly_by_building(area: &Panel<'_>, means: &[BuildingWeeklyMean]) -> DrawResult {
    if means.is_empty() {
        return Ok(());
    }
    let n = means.len() as u32;

    let mut chart = ChartBuilder::on(area)
        .caption("Average Weekly Usage per Building", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d((0u32..n).into_segmented(), 0f64..y_upper(means.iter().map(|m| m.kwh)))?;

    let label = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => means
            .get(*i as usize)
            .map(|m| m.building.clone())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("kWh")
        .x_labels(means.len())
        .x_label_formatter(&label)
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.mix(0.6).filled())
            .margin(10)
            .data(means.iter().enumerate().map(|(i, m)| (i as u32, m.kwh))),
    )?;
    Ok(())
}

fn draw_peak_hours(area: &Panel<'_>, dataset: &MergedDataset) -> DrawResult {
    let mut chart = ChartBuilder::on(area)
        .caption("Peak-hour Consumption (All Buildings)", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(0u32..24u32, 0f64..y_upper(dataset.iter().map(|r| r.kwh)))?;

    chart
        .configure_mesh()
        .x_desc("Hour of Day")
        .y_desc("kWh")
        .draw()?;

    chart.draw_series(
        dataset
            .iter()
            .map(|r| Circle::new((u32::from(r.timestamp.hour()), r.kwh), 3, ORANGE.filled())),
    )?;
    Ok(())
}
