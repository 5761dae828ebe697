use time::PrimitiveDateTime;

/// A single (timestamp, kWh) observation from one building's meter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterReading {
    timestamp: PrimitiveDateTime,
    kwh: f64,
}

impl MeterReading {
    pub fn new(timestamp: PrimitiveDateTime, kwh: f64) -> Self {
        Self { timestamp, kwh }
    }

    pub fn timestamp(&self) -> PrimitiveDateTime {
        self.timestamp
    }

    pub fn kwh(&self) -> f64 {
        self.kwh
    }
}
