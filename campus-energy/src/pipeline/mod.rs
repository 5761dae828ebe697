use campus_domain::{BuildingManager, MergedDataset};
use csv::StringRecord;

use crate::{
    aggregate::AggregateViews,
    report::{self, Summary},
    transform,
};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source '{source_id}' unreadable: {reason}")]
    SourceUnreadable { source_id: String, reason: String },
    #[error("source '{source_id}' lacks required column(s): {missing}")]
    SourceSchemaInvalid { source_id: String, missing: String },
    #[error("invalid {column}: {reason}")]
    RowInvalid { column: &'static str, reason: String },
    #[error("sink error: {0}")]
    Sink(String),
}

/// Header plus string records of one raw input, before any typing.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

impl RawTable {
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: StringRecord::from(headers.to_vec()),
            records: rows.iter().map(|r| StringRecord::from(r.to_vec())).collect(),
        }
    }
}

/// One raw tabular input of a run.
pub trait Source {
    /// Identifier used to infer building and period, usually the file stem.
    fn id(&self) -> &str;

    /// Reads the whole input. Any file handle is released before returning.
    fn read(&self) -> Result<RawTable, PipelineError>;
}

/// Everything a run produced, borrowed by each sink in turn.
pub struct RunArtifacts<'a> {
    pub dataset: &'a MergedDataset,
    pub manager: &'a BuildingManager,
    pub views: &'a AggregateViews,
    pub summary: &'a Summary,
}

pub trait Sink {
    fn name(&self) -> &'static str;

    /// Writes one output. Sinks never mutate the artifacts.
    fn write(&self, run: &RunArtifacts<'_>) -> Result<(), PipelineError>;
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    pub dataset: MergedDataset,
    pub manager: BuildingManager,
    pub views: AggregateViews,
    pub summary: Summary,
}

/// Normalizes every source and merges the survivors into one dataset.
///
/// A source that cannot be read or lacks the required columns is skipped
/// with a warning; it never aborts the merge. With no surviving rows the
/// result is an empty dataset.
pub fn merge_sources(sources: &[Box<dyn Source>]) -> MergedDataset {
    let mut combined = Vec::new();

    for source in sources {
        let id = source.id();
        metrics::counter!("energy_sources_total").increment(1);

        let table = match source.read() {
            Ok(t) => t,
            Err(e) => {
                metrics::counter!("energy_sources_skipped_total", "reason" => "unreadable").increment(1);
                tracing::warn!(source = %id, error = %e, "skipping unreadable source");
                continue;
            }
        };

        match transform::normalize(id, &table) {
            Ok(normalized) => {
                metrics::counter!("energy_rows_ingested_total").increment(normalized.records.len() as u64);
                tracing::info!(
                    source = %id,
                    rows = normalized.records.len(),
                    dropped = normalized.dropped_rows,
                    "normalized source"
                );
                combined.extend(normalized.records);
            }
            Err(e) => {
                metrics::counter!("energy_sources_skipped_total", "reason" => "schema_invalid").increment(1);
                tracing::warn!(source = %id, error = %e, "skipping source");
            }
        }
    }

    if combined.is_empty() {
        tracing::warn!(sources = sources.len(), "no valid data found in any source");
    }

    MergedDataset::from_records(combined)
}

pub struct Pipeline {
    pub sources: Vec<Box<dyn Source>>,
    pub sinks: Vec<Box<dyn Sink>>,
}

impl Pipeline {
    pub fn run(self) -> Result<RunOutcome, PipelineError> {
        let dataset = merge_sources(&self.sources);
        let manager = BuildingManager::from_dataset(&dataset);
        let views = AggregateViews::compute(&dataset);
        let summary = report::synthesize(&dataset, &manager, &views);

        tracing::info!(
            rows = dataset.len(),
            buildings = manager.len(),
            days = views.daily.len(),
            weeks = views.weekly.len(),
            fingerprint = %views.fingerprint(),
            "aggregated merged dataset"
        );

        let artifacts = RunArtifacts {
            dataset: &dataset,
            manager: &manager,
            views: &views,
            summary: &summary,
        };
        for sink in &self.sinks {
            sink.write(&artifacts)?;
            metrics::counter!("energy_sink_writes_total", "sink" => sink.name()).increment(1);
        }

        Ok(RunOutcome {
            dataset,
            manager,
            views,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemorySource;
    use std::{cell::RefCell, rc::Rc};

    struct FailingSource;

    impl Source for FailingSource {
        fn id(&self) -> &str {
            "Broken_Jan"
        }

        fn read(&self) -> Result<RawTable, PipelineError> {
            Err(PipelineError::SourceUnreadable {
                source_id: "Broken_Jan".to_string(),
                reason: "simulated".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        seen_rows: Rc<RefCell<Vec<usize>>>,
    }

    impl Sink for RecordingSink {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn write(&self, run: &RunArtifacts<'_>) -> Result<(), PipelineError> {
            self.seen_rows.borrow_mut().push(run.dataset.len());
            Ok(())
        }
    }

    fn memory(id: &str, rows: &[&[&str]]) -> Box<dyn Source> {
        Box::new(MemorySource::new(id, RawTable::from_rows(&["timestamp", "kwh"], rows)))
    }

    #[test]
    fn failing_sources_are_skipped() {
        let sources: Vec<Box<dyn Source>> = vec![
            Box::new(FailingSource),
            memory("East_Jan", &[&["2024-01-02 00:00", "1.0"]]),
            Box::new(MemorySource::new(
                "Odd_Jan",
                RawTable::from_rows(&["when", "kwh"], &[&["2024-01-01 00:00", "1.0"]]),
            )),
            memory("West_Jan", &[&["2024-01-01 00:00", "2.0"], &["bad", "3.0"]]),
        ];

        let ds = merge_sources(&sources);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].building, "West");
        assert_eq!(ds.records()[1].building, "East");
    }

    #[test]
    fn no_sources_gives_empty_dataset_with_columns() {
        let ds = merge_sources(&[]);
        assert!(ds.is_empty());
        assert_eq!(ds.columns().len(), 4);
    }

    #[test]
    fn run_hands_artifacts_to_every_sink() {
        let sink = RecordingSink::default();
        let seen_rows = Rc::clone(&sink.seen_rows);
        let pipeline = Pipeline {
            sources: vec![memory("East_Jan", &[&["2024-01-01 00:00", "10.0"]])],
            sinks: vec![Box::new(sink)],
        };

        let outcome = pipeline.run().expect("run succeeds");
        assert_eq!(outcome.dataset.len(), 1);
        assert_eq!(seen_rows.borrow().as_slice(), &[1]);
        assert!(matches!(outcome.summary, Summary::Report(_)));
    }
}
