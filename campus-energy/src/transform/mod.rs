use campus_domain::EnergyRecord;
use csv::StringRecord;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime,
};

use crate::pipeline::{PipelineError, RawTable};

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const KWH_COLUMN: &str = "kwh";
pub const BUILDING_COLUMN: &str = "building";
/// Accepted names for the period label, in lookup order.
pub const PERIOD_COLUMNS: [&str; 2] = ["month", "period_label"];

/// Rows of one source that survived normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSource {
    pub records: Vec<EnergyRecord>,
    pub dropped_rows: usize,
}

struct Columns {
    timestamp: usize,
    kwh: usize,
    building: Option<usize>,
    period: Option<usize>,
}

impl Columns {
    fn resolve(source_id: &str, headers: &StringRecord) -> Result<Self, PipelineError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let timestamp = find(TIMESTAMP_COLUMN);
        let kwh = find(KWH_COLUMN);
        let (timestamp, kwh) = match (timestamp, kwh) {
            (Some(t), Some(k)) => (t, k),
            (t, k) => {
                let missing = [(TIMESTAMP_COLUMN, t), (KWH_COLUMN, k)]
                    .iter()
                    .filter(|(_, idx)| idx.is_none())
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(PipelineError::SourceSchemaInvalid {
                    source_id: source_id.to_string(),
                    missing,
                });
            }
        };

        Ok(Self {
            timestamp,
            kwh,
            building: find(BUILDING_COLUMN),
            period: PERIOD_COLUMNS.iter().find_map(|name| find(*name)),
        })
    }
}

/// Normalizes one raw table into energy records.
///
/// Fails only when the `timestamp` or `kwh` column is missing entirely. Rows
/// with an unparseable timestamp or a missing/invalid kWh value are dropped
/// and counted. Building and period are inferred from `source_id` where the
/// source does not carry them.
pub fn normalize(source_id: &str, table: &RawTable) -> Result<NormalizedSource, PipelineError> {
    let columns = Columns::resolve(source_id, &table.headers)?;
    let building = infer_building(source_id);
    let period = infer_period(source_id);

    let mut out = NormalizedSource::default();
    for (line, record) in table.records.iter().enumerate() {
        match normalize_row(record, &columns, &building, &period) {
            Ok(r) => out.records.push(r),
            Err(e) => {
                if let PipelineError::RowInvalid { column, .. } = &e {
                    metrics::counter!("energy_rows_dropped_total", "reason" => *column).increment(1);
                }
                tracing::debug!(source = %source_id, row = line + 1, error = %e, "dropping row");
                out.dropped_rows += 1;
            }
        }
    }

    Ok(out)
}

fn normalize_row(
    record: &StringRecord,
    columns: &Columns,
    building: &str,
    period: &str,
) -> Result<EnergyRecord, PipelineError> {
    let ts_str = record.get(columns.timestamp).unwrap_or("");
    let timestamp = parse_timestamp(ts_str).ok_or_else(|| PipelineError::RowInvalid {
        column: TIMESTAMP_COLUMN,
        reason: format!("invalid timestamp '{ts_str}'"),
    })?;

    let kwh = parse_kwh(record.get(columns.kwh).unwrap_or(""))?;

    Ok(EnergyRecord {
        timestamp,
        kwh,
        building: non_blank(record, columns.building).unwrap_or(building).to_string(),
        period_label: non_blank(record, columns.period).unwrap_or(period).to_string(),
    })
}

fn non_blank(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parses a meter timestamp as naive wall-clock time.
///
/// RFC 3339 offsets are discarded. A bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Option<PrimitiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(ts) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(PrimitiveDateTime::new(ts.date(), ts.time()));
    }

    PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"))
        .or_else(|_| PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]")))
        .or_else(|_| PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]")))
        .or_else(|_| PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day] [hour]:[minute]:[second]")))
        .or_else(|_| PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day]T[hour]:[minute]")))
        .or_else(|_| PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day] [hour]:[minute]")))
        .or_else(|_| PrimitiveDateTime::parse(s, format_description!("[year]/[month]/[day] [hour]:[minute]:[second]")))
        .or_else(|_| PrimitiveDateTime::parse(s, format_description!("[year]/[month]/[day] [hour]:[minute]")))
        .or_else(|_| Date::parse(s, format_description!("[year]-[month]-[day]")).map(Date::midnight))
        .ok()
}

/// kWh must be a finite, non-negative number.
fn parse_kwh(raw: &str) -> Result<f64, PipelineError> {
    let s = raw.trim();
    let invalid = |reason: String| PipelineError::RowInvalid {
        column: KWH_COLUMN,
        reason,
    };

    if s.is_empty() {
        return Err(invalid("missing kwh".to_string()));
    }
    let kwh: f64 = s.parse().map_err(|e| invalid(format!("invalid kwh '{s}': {e}")))?;
    if !kwh.is_finite() {
        return Err(invalid(format!("kwh '{s}' is not a finite number")));
    }
    if kwh < 0.0 {
        return Err(invalid("kwh must be non-negative".to_string()));
    }
    Ok(kwh)
}

/// First `_`-separated segment of the identifier, capitalized. An empty
/// segment falls back to the whole identifier.
pub fn infer_building(source_id: &str) -> String {
    match source_id.split('_').next() {
        Some(first) if !first.is_empty() => capitalize(first),
        _ => capitalize(source_id),
    }
}

/// Last `_`-separated segment of the identifier, verbatim. An identifier
/// without `_`, or one ending in `_`, is used whole, capitalized.
pub fn infer_period(source_id: &str) -> String {
    match source_id.rsplit_once('_') {
        Some((_, last)) if !last.is_empty() => last.to_string(),
        _ => capitalize(source_id),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn infers_building_and_period_from_identifier() {
        assert_eq!(infer_building("east_wing_Jan"), "East");
        assert_eq!(infer_period("east_wing_Jan"), "Jan");
        assert_eq!(infer_building("LIBRARY_Feb"), "Library");
    }

    #[test]
    fn identifier_without_separator_is_used_whole() {
        assert_eq!(infer_building("gymnasium"), "Gymnasium");
        assert_eq!(infer_period("gymnasium"), "Gymnasium");
    }

    #[test]
    fn empty_segments_fall_back_to_whole_identifier() {
        assert_eq!(infer_building("_Jan"), "_jan");
        assert_eq!(infer_period("_Jan"), "Jan");
        assert_eq!(infer_building("East_"), "East");
        assert_eq!(infer_period("East_"), "East_");

        let table = RawTable::from_rows(&["timestamp", "kwh"], &[&["2024-01-01 00:00", "1.0"]]);
        let out = normalize("_Jan", &table).expect("schema is valid");
        assert!(!out.records[0].building.is_empty());
        assert!(!out.records[0].period_label.is_empty());
    }

    #[test]
    fn accepts_common_timestamp_layouts() {
        let want = datetime!(2024-01-01 12:30:00);
        assert_eq!(parse_timestamp("2024-01-01 12:30:00"), Some(want));
        assert_eq!(parse_timestamp("2024-01-01T12:30"), Some(want));
        assert_eq!(parse_timestamp(" 2024/01/01 12:30 "), Some(want));
        assert_eq!(parse_timestamp("2024-01-01T12:30:00+05:00"), Some(want));
        assert_eq!(parse_timestamp("2024-01-01"), Some(datetime!(2024-01-01 00:00)));
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2024-13-01 00:00"), None);
    }

    #[test]
    fn missing_kwh_column_rejects_the_source() {
        let table = RawTable::from_rows(&["timestamp", "power"], &[&["2024-01-01 00:00", "1.0"]]);
        let res = normalize("East_Jan", &table);
        assert!(matches!(
            res,
            Err(PipelineError::SourceSchemaInvalid { ref missing, .. }) if missing == "kwh"
        ));
    }

    #[test]
    fn bad_rows_are_dropped_and_counted() {
        let table = RawTable::from_rows(
            &["timestamp", "kwh"],
            &[
                &["2024-01-01 00:00", "10.0"],
                &["yesterday", "4.0"],
                &["2024-01-01 02:00", ""],
                &["2024-01-01 03:00", "-1"],
                &["2024-01-01 04:00", "NaN"],
                &["2024-01-01 05:00"],
            ],
        );

        let out = normalize("East_Jan", &table).expect("schema is valid");
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.dropped_rows, 5);
        assert_eq!(out.records[0].kwh, 10.0);
        assert_eq!(out.records[0].building, "East");
        assert_eq!(out.records[0].period_label, "Jan");
    }

    #[test]
    fn explicit_columns_win_and_blank_cells_fall_back() {
        let table = RawTable::from_rows(
            &[" timestamp ", "kwh", "building", "month"],
            &[
                &["2024-01-01 00:00", "1.0", "Science", "January"],
                &["2024-01-01 01:00", "2.0", "  ", ""],
            ],
        );

        let out = normalize("campus_Q1", &table).expect("schema is valid");
        assert_eq!(out.records[0].building, "Science");
        assert_eq!(out.records[0].period_label, "January");
        assert_eq!(out.records[1].building, "Campus");
        assert_eq!(out.records[1].period_label, "Q1");
    }

    #[test]
    fn source_with_no_surviving_rows_is_empty_not_an_error() {
        let table = RawTable::from_rows(&["timestamp", "kwh"], &[&["??", "1"]]);
        let out = normalize("West_Jan", &table).expect("schema is valid");
        assert!(out.records.is_empty());
        assert_eq!(out.dropped_rows, 1);
    }
}
