use std::collections::HashMap;

use super::{Building, MeterReading};
use crate::dataset::MergedDataset;

/// Owns every building of a campus, keyed by name, in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct BuildingManager {
    buildings: Vec<Building>,
    index: HashMap<String, usize>,
}

impl BuildingManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a manager holding one reading per dataset row.
    pub fn from_dataset(dataset: &MergedDataset) -> Self {
        let mut manager = Self::new();
        manager.load_from_dataset(dataset);
        manager
    }

    pub fn load_from_dataset(&mut self, dataset: &MergedDataset) {
        for record in dataset.iter() {
            self.get_or_create_building(&record.building)
                .add_reading(MeterReading::new(record.timestamp, record.kwh));
        }
    }

    pub fn get_or_create_building(&mut self, name: &str) -> &mut Building {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                self.buildings.push(Building::new(name));
                let idx = self.buildings.len() - 1;
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.buildings[idx]
    }

    pub fn get(&self, name: &str) -> Option<&Building> {
        self.index.get(name).map(|&idx| &self.buildings[idx])
    }

    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn campus_total_consumption(&self) -> f64 {
        self.buildings
            .iter()
            .map(Building::calculate_total_consumption)
            .fold(0.0, |acc, kwh| acc + kwh)
    }

    /// Building with the largest total. Ties go to the building registered first.
    pub fn highest_consuming_building(&self) -> Option<&Building> {
        let mut best: Option<(&Building, f64)> = None;
        for building in &self.buildings {
            let total = building.calculate_total_consumption();
            if best.map_or(true, |(_, best_total)| total > best_total) {
                best = Some((building, total));
            }
        }
        best.map(|(b, _)| b)
    }
}
