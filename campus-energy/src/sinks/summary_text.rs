use std::{fs, path::{Path, PathBuf}};

use crate::pipeline::{PipelineError, RunArtifacts, Sink};

pub const SUMMARY_FILE: &str = "summary.txt";

pub struct SummaryTextSink {
    path: PathBuf,
}

impl SummaryTextSink {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            path: output_dir.join(SUMMARY_FILE),
        }
    }
}

impl Sink for SummaryTextSink {
    fn name(&self) -> &'static str {
        "summary_text"
    }

    fn write(&self, run: &RunArtifacts<'_>) -> Result<(), PipelineError> {
        fs::write(&self.path, run.summary.to_string())
            .map_err(|e| PipelineError::Sink(format!("failed to write {}: {e}", self.path.display())))?;
        tracing::info!(path = %self.path.display(), "wrote summary");
        Ok(())
    }
}
