use std::path::{Path, PathBuf};

use campus_domain::dataset::format_timestamp;
use serde::Serialize;

use crate::pipeline::{PipelineError, RunArtifacts, Sink};

pub const CLEANED_DATA_FILE: &str = "cleaned_energy_data.csv";
pub const BUILDING_SUMMARY_FILE: &str = "building_summary.csv";

#[derive(Serialize)]
struct CleanedRow<'a> {
    timestamp: String,
    kwh: f64,
    building: &'a str,
    month: &'a str,
}

#[derive(Serialize)]
struct BuildingSummaryRow<'a> {
    building: &'a str,
    mean: f64,
    min: f64,
    max: f64,
    total: f64,
}

/// Writes `header` followed by every row, so an empty export still has its header.
fn write_csv<T: Serialize>(
    path: &Path,
    header: &[&str],
    rows: impl IntoIterator<Item = T>,
) -> Result<(), PipelineError> {
    let fail = |e: csv::Error| PipelineError::Sink(format!("failed to write {}: {e}", path.display()));

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(fail)?;
    wtr.write_record(header).map_err(fail)?;
    for row in rows {
        wtr.serialize(row).map_err(fail)?;
    }
    wtr.flush()
        .map_err(|e| PipelineError::Sink(format!("failed to flush {}: {e}", path.display())))
}

/// `cleaned_energy_data.csv`: the merged dataset, one row per reading.
pub struct CleanedDataCsvSink {
    path: PathBuf,
}

impl CleanedDataCsvSink {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            path: output_dir.join(CLEANED_DATA_FILE),
        }
    }
}

impl Sink for CleanedDataCsvSink {
    fn name(&self) -> &'static str {
        "cleaned_data_csv"
    }

    fn write(&self, run: &RunArtifacts<'_>) -> Result<(), PipelineError> {
        let rows = run.dataset.iter().map(|r| CleanedRow {
            timestamp: format_timestamp(r.timestamp),
            kwh: r.kwh,
            building: &r.building,
            month: &r.period_label,
        });
        write_csv(&self.path, &["timestamp", "kwh", "building", "month"], rows)?;
        tracing::info!(path = %self.path.display(), rows = run.dataset.len(), "wrote cleaned dataset");
        Ok(())
    }
}

/// `building_summary.csv`: mean/min/max/total per building.
pub struct BuildingSummaryCsvSink {
    path: PathBuf,
}

impl BuildingSummaryCsvSink {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            path: output_dir.join(BUILDING_SUMMARY_FILE),
        }
    }
}

impl Sink for BuildingSummaryCsvSink {
    fn name(&self) -> &'static str {
        "building_summary_csv"
    }

    fn write(&self, run: &RunArtifacts<'_>) -> Result<(), PipelineError> {
        let rows = run.views.buildings.iter().map(|b| BuildingSummaryRow {
            building: &b.building,
            mean: b.mean,
            min: b.min,
            max: b.max,
            total: b.total,
        });
        write_csv(&self.path, &["building", "mean", "min", "max", "total"], rows)?;
        tracing::info!(path = %self.path.display(), buildings = run.views.buildings.len(), "wrote building summary");
        Ok(())
    }
}
