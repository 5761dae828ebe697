use std::fs;

use anyhow::{Context, Result};
use campus_energy::{config::AppConfig, metrics_snapshot, observability, sinks, sources, Pipeline};

fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    if cfg.metrics.is_some() {
        metrics_snapshot::init()?;
    }

    fs::create_dir_all(&cfg.paths.output_dir).with_context(|| {
        format!("failed to create output directory {}", cfg.paths.output_dir.display())
    })?;

    let sources = sources::discover(&cfg.paths.data_dir, &cfg.ingest.extensions).with_context(|| {
        format!("failed to list data directory {}", cfg.paths.data_dir.display())
    })?;

    let pipeline = Pipeline {
        sources,
        sinks: sinks::from_config(&cfg),
    };
    let outcome = pipeline.run()?;

    println!("{}", outcome.summary);

    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_snapshot::write_snapshot(&cfg.paths.output_dir.join(&metrics_cfg.snapshot_file))?;
    }

    Ok(())
}
