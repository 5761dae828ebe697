use anyhow::Result;
use campus_domain::BuildingManager;
use campus_energy::{config::AppConfig, observability, pipeline, sources};

/// Prints one consumption line per building found in the data directory.
///
/// Usage:
///   building_reports
fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;
    let sources = sources::discover(&cfg.paths.data_dir, &cfg.ingest.extensions)?;
    let dataset = pipeline::merge_sources(&sources);

    let manager = BuildingManager::from_dataset(&dataset);
    if manager.is_empty() {
        println!("No valid data found in data directory.");
        return Ok(());
    }
    for building in manager.buildings() {
        println!("{}", building.generate_report());
    }

    Ok(())
}
