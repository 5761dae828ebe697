use std::{fs::File, path::{Path, PathBuf}};

use crate::pipeline::{PipelineError, RawTable, Source};

/// Delimited text file source: `,` for `.csv`, `|` for `.dat`.
///
/// The header row is required. Rows shorter than the header are kept; their
/// missing cells read as absent values.
pub struct DelimitedFileSource {
    path: PathBuf,
    id: String,
    delimiter: u8,
}

impl DelimitedFileSource {
    pub fn new<P: Into<PathBuf>>(path: P, delimiter: u8) -> Self {
        let path = path.into();
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, id, delimiter }
    }

    pub fn csv<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(path, b',')
    }

    pub fn dat<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(path, b'|')
    }

    /// Picks the delimiter from the file extension, `None` for unknown ones.
    pub fn for_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::csv(path)),
            "dat" => Some(Self::dat(path)),
            _ => None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for DelimitedFileSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn read(&self) -> Result<RawTable, PipelineError> {
        let unreadable = |reason: String| PipelineError::SourceUnreadable {
            source_id: self.id.clone(),
            reason,
        };

        let file = File::open(&self.path).map_err(|e| unreadable(format!("failed to open file: {e}")))?;
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(file);
        let headers = rdr
            .headers()
            .map_err(|e| unreadable(format!("failed to read headers: {e}")))?
            .clone();

        let mut records = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| unreadable(format!("failed to read record: {e}")))?;
            records.push(record);
        }

        Ok(RawTable { headers, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_the_file_stem() {
        let src = DelimitedFileSource::csv("/data/East_Jan.csv");
        assert_eq!(src.id(), "East_Jan");
    }

    #[test]
    fn delimiter_follows_extension() {
        assert_eq!(DelimitedFileSource::for_path(Path::new("a/Gym_Feb.DAT")).map(|s| s.delimiter), Some(b'|'));
        assert_eq!(DelimitedFileSource::for_path(Path::new("a/Gym_Feb.csv")).map(|s| s.delimiter), Some(b','));
        assert!(DelimitedFileSource::for_path(Path::new("a/notes.txt")).is_none());
    }

    #[test]
    fn missing_file_is_unreadable() {
        let src = DelimitedFileSource::csv("/definitely/not/here/East_Jan.csv");
        assert!(matches!(src.read(), Err(PipelineError::SourceUnreadable { .. })));
    }
}
