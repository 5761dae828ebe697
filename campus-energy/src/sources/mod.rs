use std::{fs, io, path::Path};

use crate::pipeline::Source;

pub mod delimited_file;
pub mod memory;

pub use delimited_file::DelimitedFileSource;
pub use memory::MemorySource;

/// Lists `dir` (non-recursive) and builds one source per file whose extension
/// is in `extensions`. Sources are sorted by path.
///
/// A missing directory yields no sources.
pub fn discover(dir: &Path, extensions: &[String]) -> io::Result<Vec<Box<dyn Source>>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(dir = %dir.display(), "input directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| extensions.iter().any(|want| want.eq_ignore_ascii_case(e)))
            .unwrap_or(false);
        if matches {
            paths.push(path);
        }
    }
    paths.sort();

    let mut sources: Vec<Box<dyn Source>> = Vec::with_capacity(paths.len());
    for path in paths {
        match DelimitedFileSource::for_path(&path) {
            Some(src) => sources.push(Box::new(src)),
            None => tracing::warn!(path = %path.display(), "no reader for file extension, skipping"),
        }
    }

    tracing::info!(dir = %dir.display(), sources = sources.len(), "discovered input sources");
    Ok(sources)
}
