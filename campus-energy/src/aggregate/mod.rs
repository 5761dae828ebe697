//! Time-bucketed and per-building views over the merged dataset.
//!
//! Every function here is a pure function of its input. Buckets appear only
//! when at least one reading falls in them, in ascending order.

use std::collections::BTreeMap;

use campus_domain::MergedDataset;
use time::{Date, Duration};

#[derive(Debug, Clone, PartialEq)]
pub struct DailyTotal {
    pub date: Date,
    pub kwh_sum: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyAggregate {
    /// Sunday closing the week.
    pub week_end: Date,
    pub kwh_sum: f64,
    pub kwh_mean: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildingSummary {
    pub building: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildingWeeklyMean {
    pub building: String,
    pub kwh: f64,
}

/// The three views shared by the summary and the exporters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateViews {
    pub daily: Vec<DailyTotal>,
    pub weekly: Vec<WeeklyAggregate>,
    pub buildings: Vec<BuildingSummary>,
}

impl AggregateViews {
    pub fn compute(dataset: &MergedDataset) -> Self {
        Self {
            daily: daily_totals(dataset),
            weekly: weekly_aggregates(dataset),
            buildings: building_summary(dataset),
        }
    }

    /// BLAKE3 digest over the exact bits of every view value.
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut h = blake3::Hasher::new();
        h.update(&(self.daily.len() as u64).to_le_bytes());
        for d in &self.daily {
            hash_date(&mut h, d.date);
            hash_f64(&mut h, d.kwh_sum);
        }
        h.update(&(self.weekly.len() as u64).to_le_bytes());
        for w in &self.weekly {
            hash_date(&mut h, w.week_end);
            hash_f64(&mut h, w.kwh_sum);
            hash_f64(&mut h, w.kwh_mean);
        }
        h.update(&(self.buildings.len() as u64).to_le_bytes());
        for b in &self.buildings {
            hash_str(&mut h, &b.building);
            hash_f64(&mut h, b.mean);
            hash_f64(&mut h, b.min);
            hash_f64(&mut h, b.max);
            hash_f64(&mut h, b.total);
        }
        h.finalize()
    }
}

fn hash_str(hasher: &mut blake3::Hasher, s: &str) {
    let len = s.len() as u32;
    hasher.update(&len.to_le_bytes());
    hasher.update(s.as_bytes());
}

fn hash_f64(hasher: &mut blake3::Hasher, v: f64) {
    hasher.update(&v.to_bits().to_le_bytes());
}

fn hash_date(hasher: &mut blake3::Hasher, d: Date) {
    hasher.update(&d.to_julian_day().to_le_bytes());
}

/// Sunday on or after `date`.
pub fn week_ending(date: Date) -> Date {
    let ahead = (7 - date.weekday().number_from_monday()) % 7;
    date.checked_add(Duration::days(i64::from(ahead))).unwrap_or(date)
}

pub fn daily_totals(dataset: &MergedDataset) -> Vec<DailyTotal> {
    let mut days: BTreeMap<Date, f64> = BTreeMap::new();
    for r in dataset {
        *days.entry(r.timestamp.date()).or_insert(0.0) += r.kwh;
    }
    days.into_iter()
        .map(|(date, kwh_sum)| DailyTotal { date, kwh_sum })
        .collect()
}

pub fn weekly_aggregates(dataset: &MergedDataset) -> Vec<WeeklyAggregate> {
    let mut weeks: BTreeMap<Date, (f64, usize)> = BTreeMap::new();
    for r in dataset {
        let slot = weeks.entry(week_ending(r.timestamp.date())).or_insert((0.0, 0));
        slot.0 += r.kwh;
        slot.1 += 1;
    }
    weeks
        .into_iter()
        .map(|(week_end, (sum, count))| WeeklyAggregate {
            week_end,
            kwh_sum: sum,
            kwh_mean: sum / count as f64,
        })
        .collect()
}

pub fn building_summary(dataset: &MergedDataset) -> Vec<BuildingSummary> {
    struct Acc {
        sum: f64,
        min: f64,
        max: f64,
        count: usize,
    }

    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in dataset {
        let acc = groups.entry(r.building.as_str()).or_insert(Acc {
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            count: 0,
        });
        acc.sum += r.kwh;
        acc.min = acc.min.min(r.kwh);
        acc.max = acc.max.max(r.kwh);
        acc.count += 1;
    }

    groups
        .into_iter()
        .map(|(building, acc)| BuildingSummary {
            building: building.to_string(),
            mean: acc.sum / acc.count as f64,
            min: acc.min,
            max: acc.max,
            total: acc.sum,
        })
        .collect()
}

/// Per building, the mean over its weeks of the weekly mean kWh.
pub fn building_weekly_means(dataset: &MergedDataset) -> Vec<BuildingWeeklyMean> {
    let mut groups: BTreeMap<&str, BTreeMap<Date, (f64, usize)>> = BTreeMap::new();
    for r in dataset {
        let slot = groups
            .entry(r.building.as_str())
            .or_default()
            .entry(week_ending(r.timestamp.date()))
            .or_insert((0.0, 0));
        slot.0 += r.kwh;
        slot.1 += 1;
    }

    groups
        .into_iter()
        .map(|(building, weeks)| {
            let n = weeks.len() as f64;
            let sum_of_means: f64 = weeks.values().map(|(sum, count)| sum / *count as f64).sum();
            BuildingWeeklyMean {
                building: building.to_string(),
                kwh: sum_of_means / n,
            }
        })
        .collect()
}
