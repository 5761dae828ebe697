use crate::pipeline::{PipelineError, RawTable, Source};

/// A raw table already in memory, with an explicit identifier.
pub struct MemorySource {
    id: String,
    table: RawTable,
}

impl MemorySource {
    pub fn new(id: impl Into<String>, table: RawTable) -> Self {
        Self { id: id.into(), table }
    }
}

impl Source for MemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn read(&self) -> Result<RawTable, PipelineError> {
        Ok(self.table.clone())
    }
}
