use time::{macros::format_description, PrimitiveDateTime};

/// One normalized meter reading row.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyRecord {
    pub timestamp: PrimitiveDateTime,
    pub kwh: f64,
    pub building: String,
    pub period_label: String,
}

/// All valid readings of a run, sorted ascending by timestamp.
///
/// Ties keep their relative input order. An empty dataset still reports the
/// same four columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedDataset {
    records: Vec<EnergyRecord>,
}

impl MergedDataset {
    pub const COLUMNS: [&'static str; 4] = ["timestamp", "kwh", "building", "period_label"];

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_records(mut records: Vec<EnergyRecord>) -> Self {
        // `sort_by_key` is stable.
        records.sort_by_key(|r| r.timestamp);
        Self { records }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &Self::COLUMNS
    }

    pub fn records(&self) -> &[EnergyRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnergyRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_kwh(&self) -> f64 {
        self.records.iter().fold(0.0, |acc, r| acc + r.kwh)
    }
}

impl<'a> IntoIterator for &'a MergedDataset {
    type Item = &'a EnergyRecord;
    type IntoIter = std::slice::Iter<'a, EnergyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Renders a timestamp as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(ts: PrimitiveDateTime) -> String {
    ts.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .unwrap_or_else(|_| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn empty_dataset_keeps_columns() {
        let ds = MergedDataset::empty();
        assert!(ds.is_empty());
        assert_eq!(ds.columns(), &["timestamp", "kwh", "building", "period_label"]);
        assert!(ds.total_kwh().is_sign_positive());
    }

    #[test]
    fn records_are_sorted_and_ties_keep_input_order() {
        let ds = MergedDataset::from_records(vec![
            record(datetime!(2024-01-02 00:00), 1.0, "A"),
            record(datetime!(2024-01-01 00:00), 2.0, "B"),
            record(datetime!(2024-01-02 00:00), 3.0, "C"),
        ]);

        let order: Vec<&str> = ds.iter().map(|r| r.building.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
        assert_eq!(ds.total_kwh(), 6.0);
    }

    #[test]
    fn timestamp_format_is_zero_padded() {
        assert_eq!(format_timestamp(datetime!(2024-03-05 07:08:09)), "2024-03-05 07:08:09");
    }
}
