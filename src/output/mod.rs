//! Output module for exported movie records
//!
//! This module handles:
//! - The `MovieRecord` row type and the `ResultSink` trait
//! - Writing CSV files with the `Title,Directors,Year,Rating` header
//! - Data-quality statistics for an export

mod csv_output;
pub mod stats;
mod traits;

pub use csv_output::{read_csv, write_csv, CsvSink, CSV_HEADER};
pub use stats::{print_statistics, ExportStatistics};
pub use traits::{MemorySink, MovieRecord, ResultSink};
