pub mod dataset;
pub mod domain;

pub use dataset::{EnergyRecord, MergedDataset};
pub use domain::{Building, BuildingManager, MeterReading};
