use super::MeterReading;

#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    name: String,
    readings: Vec<MeterReading>,
}

impl Building {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            readings: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn readings(&self) -> &[MeterReading] {
        &self.readings
    }

    /// Appends without dedup; readings are validated before they get here.
    pub fn add_reading(&mut self, reading: MeterReading) {
        self.readings.push(reading);
    }

    pub fn calculate_total_consumption(&self) -> f64 {
        self.readings
            .iter()
            .map(MeterReading::kwh)
            .fold(0.0, |acc, kwh| acc + kwh)
    }

    pub fn generate_report(&self) -> String {
        format!(
            "Building {}: total consumption = {:.2} kWh",
            self.name,
            self.calculate_total_consumption()
        )
    }
}
