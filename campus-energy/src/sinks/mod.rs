pub mod csv_export;
pub mod dashboard;
pub mod summary_text;

pub use csv_export::{BuildingSummaryCsvSink, CleanedDataCsvSink};
pub use dashboard::DashboardSink;
pub use summary_text::SummaryTextSink;

use crate::{config::AppConfig, pipeline::Sink};

/// Output sinks for a run, in write order: cleaned data, building summary,
/// summary text, then the dashboard when enabled.
pub fn from_config(cfg: &AppConfig) -> Vec<Box<dyn Sink>> {
    let out = cfg.paths.output_dir.as_path();
    let mut sinks: Vec<Box<dyn Sink>> = vec![
        Box::new(CleanedDataCsvSink::new(out)),
        Box::new(BuildingSummaryCsvSink::new(out)),
        Box::new(SummaryTextSink::new(out)),
    ];
    if cfg.dashboard.enabled {
        sinks.push(Box::new(DashboardSink::new(out, cfg.dashboard.width, cfg.dashboard.height)));
    }
    sinks
}
