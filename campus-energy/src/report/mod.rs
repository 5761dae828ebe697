use std::fmt;

use campus_domain::{dataset::format_timestamp, BuildingManager, MergedDataset};
use time::PrimitiveDateTime;

use crate::aggregate::AggregateViews;

pub const NO_DATA_MESSAGE: &str = "No data available to generate summary.";

/// Direction between the first and last bucket. Equal values are not an increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Increasing,
    DecreasingOrStable,
}

impl Trend {
    pub fn between(first: f64, last: f64) -> Self {
        if last > first {
            Self::Increasing
        } else {
            Self::DecreasingOrStable
        }
    }

    fn of<T>(buckets: &[T], value: impl Fn(&T) -> f64) -> Self {
        match (buckets.first(), buckets.last()) {
            (Some(first), Some(last)) => Self::between(value(first), value(last)),
            _ => Self::DecreasingOrStable,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increasing => f.write_str("increasing"),
            Self::DecreasingOrStable => f.write_str("decreasing or stable"),
        }
    }
}

/// The single largest reading of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakEvent {
    pub timestamp: PrimitiveDateTime,
    pub kwh: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Narrative {
    pub campus_total: f64,
    pub highest_building: String,
    pub highest_kwh: f64,
    pub peak: PeakEvent,
    pub daily_trend: Trend,
    pub weekly_trend: Trend,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    NoData,
    Report(Narrative),
}

impl Summary {
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::NoData => vec![NO_DATA_MESSAGE.to_string()],
            Self::Report(n) => vec![
                format!("Total campus consumption: {:.2} kWh", n.campus_total),
                format!(
                    "Highest-consuming building: {} ({:.2} kWh)",
                    n.highest_building, n.highest_kwh
                ),
                format!(
                    "Peak load time: {} with {:.2} kWh",
                    format_timestamp(n.peak.timestamp),
                    n.peak.kwh
                ),
                format!("Daily trend: {}", n.daily_trend),
                format!("Weekly trend: {}", n.weekly_trend),
            ],
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

/// First occurrence of the maximum kWh reading.
pub fn peak_event(dataset: &MergedDataset) -> Option<PeakEvent> {
    let mut peak: Option<PeakEvent> = None;
    for r in dataset {
        if peak.as_ref().map_or(true, |p| r.kwh > p.kwh) {
            peak = Some(PeakEvent {
                timestamp: r.timestamp,
                kwh: r.kwh,
            });
        }
    }
    peak
}

/// Builds the run narrative. An empty dataset short-circuits to
/// [`Summary::NoData`] before anything else is looked at.
pub fn synthesize(
    dataset: &MergedDataset,
    manager: &BuildingManager,
    views: &AggregateViews,
) -> Summary {
    if dataset.is_empty() {
        return Summary::NoData;
    }
    let Some(peak) = peak_event(dataset) else {
        return Summary::NoData;
    };

    let (highest_building, highest_kwh) = match manager.highest_consuming_building() {
        Some(b) => (b.name().to_string(), b.calculate_total_consumption()),
        None => ("N/A".to_string(), 0.0),
    };

    Summary::Report(Narrative {
        campus_total: manager.campus_total_consumption(),
        highest_building,
        highest_kwh,
        peak,
        daily_trend: Trend::of(&views.daily, |d| d.kwh_sum),
        weekly_trend: Trend::of(&views.weekly, |w| w.kwh_sum),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_domain::EnergyRecord;
    use time::macros::datetime;

    fn record(ts: PrimitiveDateTime, kwh: f64, building: &str) -> EnergyRecord {
        EnergyRecord {
            timestamp: ts,
            kwh,
            building: building.to_string(),
            period_label: "Jan".to_string(),
        }
    }

    #[test]
    fn equal_endpoints_are_not_increasing() {
        assert_eq!(Trend::between(5.0, 5.0), Trend::DecreasingOrStable);
        assert_eq!(Trend::between(5.0, 4.0), Trend::DecreasingOrStable);
        assert_eq!(Trend::between(5.0, 6.0), Trend::Increasing);
    }

    #[test]
    fn peak_keeps_first_maximum() {
        let ds = MergedDataset::from_records(vec![
            record(datetime!(2024-01-01 00:00), 3.0, "A"),
            record(datetime!(2024-01-01 01:00), 9.0, "B"),
            record(datetime!(2024-01-01 02:00), 9.0, "C"),
        ]);
        assert_eq!(
            peak_event(&ds),
            Some(PeakEvent { timestamp: datetime!(2024-01-01 01:00), kwh: 9.0 })
        );
    }

    #[test]
    fn empty_dataset_gives_sentinel_line() {
        let ds = MergedDataset::empty();
        let summary = synthesize(&ds, &BuildingManager::new(), &AggregateViews::default());
        assert_eq!(summary, Summary::NoData);
        assert_eq!(summary.to_string(), NO_DATA_MESSAGE);
    }

    #[test]
    fn empty_manager_falls_back_to_not_available() {
        let ds = MergedDataset::from_records(vec![record(datetime!(2024-01-01 00:00), 1.0, "A")]);
        let views = AggregateViews::compute(&ds);
        let summary = synthesize(&ds, &BuildingManager::new(), &views);
        let lines = summary.lines();
        assert_eq!(lines[0], "Total campus consumption: 0.00 kWh");
        assert_eq!(lines[1], "Highest-consuming building: N/A (0.00 kWh)");
    }

    #[test]
    fn narrative_has_five_lines_in_order() {
        let ds = MergedDataset::from_records(vec![
            record(datetime!(2024-01-01 00:00), 10.0, "East"),
            record(datetime!(2024-01-01 12:00), 5.0, "West"),
            record(datetime!(2024-01-02 00:00), 7.0, "West"),
            record(datetime!(2024-01-09 00:00), 30.0, "East"),
        ]);
        let manager = BuildingManager::from_dataset(&ds);
        let views = AggregateViews::compute(&ds);

        let text = synthesize(&ds, &manager, &views).to_string();
        assert_eq!(
            text,
            "Total campus consumption: 52.00 kWh\n\
             Highest-consuming building: East (40.00 kWh)\n\
             Peak load time: 2024-01-09 00:00:00 with 30.00 kWh\n\
             Daily trend: increasing\n\
             Weekly trend: increasing"
        );
    }
}
