//! Data-quality statistics for an export
//!
//! Field misses never fail a crawl, so this summary is the only place they
//! become visible.

use crate::output::traits::MovieRecord;

/// Summary of an exported record set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportStatistics {
    /// Number of listing pages crawled
    pub pages: u32,

    /// Number of movies exported
    pub movies: usize,

    /// Movies without a director
    pub missing_director: usize,

    /// Movies without a release year
    pub missing_year: usize,

    /// Movies the user watched but did not rate
    pub missing_rating: usize,

    /// Movies with director, year and rating all present
    pub complete: usize,
}

impl ExportStatistics {
    /// Computes statistics over the ordered records of one crawl
    pub fn from_records(pages: u32, records: &[MovieRecord]) -> Self {
        Self {
            pages,
            movies: records.len(),
            missing_director: records.iter().filter(|r| r.director.is_none()).count(),
            missing_year: records.iter().filter(|r| r.year.is_none()).count(),
            missing_rating: records.iter().filter(|r| r.rating.is_none()).count(),
            complete: records
                .iter()
                .filter(|r| r.director.is_some() && r.year.is_some() && r.rating.is_some())
                .count(),
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(user: &str, stats: &ExportStatistics) {
    println!("=== Export Statistics ({}) ===\n", user);

    println!("Overview:");
    println!("  Listing pages: {}", stats.pages);
    println!("  Movies exported: {}", stats.movies);
    println!("  Complete records: {}", stats.complete);
    println!();

    println!("Missing Fields:");
    for (field, count) in [
        ("Directors", stats.missing_director),
        ("Year", stats.missing_year),
        ("Rating", stats.missing_rating),
    ] {
        let percentage = if stats.movies > 0 {
            (count as f64 / stats.movies as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", field, count, percentage);
    }
}
