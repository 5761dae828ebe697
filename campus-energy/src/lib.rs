pub mod aggregate;
pub mod config;
pub mod metrics_snapshot;
pub mod observability;
pub mod pipeline;
pub mod report;
pub mod sinks;
pub mod sources;
pub mod transform;

pub use pipeline::{Pipeline, PipelineError, RawTable, Sink, Source};
