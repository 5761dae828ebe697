pub mod building;
pub mod building_manager;
pub mod meter_reading;

pub use building::Building;
pub use building_manager::BuildingManager;
pub use meter_reading::MeterReading;
