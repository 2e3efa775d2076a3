//! Output sink trait and the record type it consumes

use serde::{Deserialize, Serialize};

/// One watched movie, created once per processed detail page
///
/// Serialized column names match the exported header `Title,Directors,Year,Rating`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Directors")]
    pub director: Option<String>,

    #[serde(rename = "Year")]
    pub year: Option<String>,

    #[serde(rename = "Rating")]
    pub rating: Option<String>,
}

/// Consumer of a completed crawl's ordered records
///
/// Sinks are only invoked after a crawl reaches `Completed`, so an
/// implementation never sees partial results.
pub trait ResultSink {
    /// Consumes the ordered records of `user`'s export
    fn write_records(&mut self, user: &str, records: &[MovieRecord]) -> crate::Result<()>;
}

/// Sink that keeps records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub user: Option<String>,
    pub records: Vec<MovieRecord>,
}

impl ResultSink for MemorySink {
    fn write_records(&mut self, user: &str, records: &[MovieRecord]) -> crate::Result<()> {
        self.user = Some(user.to_string());
        self.records = records.to_vec();
        Ok(())
    }
}
