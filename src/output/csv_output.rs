//! CSV sink writing `<directory>/<user>.csv`

use crate::output::traits::{MovieRecord, ResultSink};
use crate::Result;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Header row of every export
pub const CSV_HEADER: [&str; 4] = ["Title", "Directors", "Year", "Rating"];

/// Writes each export to its own CSV file inside a directory
#[derive(Debug, Clone)]
pub struct CsvSink {
    directory: PathBuf,
    last_path: Option<PathBuf>,
}

impl CsvSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            last_path: None,
        }
    }

    /// Path the export of `user` is written to
    pub fn path_for(&self, user: &str) -> PathBuf {
        self.directory.join(format!("{}.csv", user))
    }

    /// Path of the most recently written file
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }
}

impl ResultSink for CsvSink {
    fn write_records(&mut self, user: &str, records: &[MovieRecord]) -> Result<()> {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.path_for(user);

        replace_file(&self.directory, &path, |file| write_csv(file, records))?;

        tracing::info!("Wrote {} movies to {}", records.len(), path.display());
        self.last_path = Some(path);
        Ok(())
    }
}

/// Writes a sibling temporary file and renames it over `path` once `write` succeeds
///
/// On failure the temporary file is removed and any existing file at `path`
/// is left untouched.
fn replace_file<F>(directory: &Path, path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let mut temp = NamedTempFile::new_in(directory)?;
    write(temp.as_file_mut())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Serializes records as CSV; `None` fields become empty cells
///
/// The header is written even when there are no records.
pub fn write_csv<W: Write>(writer: W, records: &[MovieRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads records back from CSV written by [`write_csv`]
pub fn read_csv<R: std::io::Read>(reader: R) -> Result<Vec<MovieRecord>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: MovieRecord = row?;
        records.push(record);
    }
    Ok(records)
}
