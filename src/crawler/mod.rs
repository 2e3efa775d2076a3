//! Crawler module for fetching and extracting a user's watched movies
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching through a shared, bounded, cancellable session
//! - HTML parsing of profile, listing and detail pages
//! - User validation and page count discovery
//! - Concurrent listing and detail crawling with ordered results
//! - Overall crawl orchestration

mod coordinator;
mod detail;
mod discovery;
mod fetcher;
mod listing;
mod parser;
mod pool;
mod session;
mod validator;

pub use coordinator::{CrawlProgress, Orchestrator};
pub use detail::extract_movie;
pub use discovery::discover_page_count;
pub use fetcher::{build_http_client, FetchedPage, HttpFetcher};
pub use listing::crawl_page;
pub use parser::{Listing, MovieDetails, MovieStub, PageParser};
pub use pool::run_ordered;
pub use session::CrawlSession;
pub use validator::validate_user;

use crate::config::Config;
use crate::output::{ExportStatistics, ResultSink};
use crate::ExporterError;

/// Runs a complete export for one user
///
/// This is the main entry point. It will:
/// 1. Validate the user
/// 2. Discover the number of listing pages
/// 3. Crawl every page and movie
/// 4. Hand the ordered records to `sink`
///
/// The sink is only called once the crawl has completed, so a failed crawl
/// never produces partial output.
///
/// # Example
///
/// ```no_run
/// use filmow_exporter::config::Config;
/// use filmow_exporter::crawler::export_user;
/// use filmow_exporter::output::CsvSink;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut sink = CsvSink::new(".");
/// let stats = export_user(Config::default(), "imp2", &mut sink).await?;
/// println!("{} movies exported", stats.movies);
/// # Ok(())
/// # }
/// ```
pub async fn export_user<S>(
    config: Config,
    user: &str,
    sink: &mut S,
) -> Result<ExportStatistics, ExporterError>
where
    S: ResultSink + ?Sized,
{
    export(Orchestrator::new(config, user), sink).await
}

/// Runs an already configured orchestrator and writes its records to `sink`
pub async fn export<S>(
    mut orchestrator: Orchestrator,
    sink: &mut S,
) -> Result<ExportStatistics, ExporterError>
where
    S: ResultSink + ?Sized,
{
    let records = orchestrator.run().await?;
    let state = orchestrator.state();

    sink.write_records(state.user(), &records)?;
    Ok(ExportStatistics::from_records(
        state.total_pages().unwrap_or(1),
        &records,
    ))
}

/// Checks whether `user` has a profile, without crawling anything else
pub async fn check_user(config: &Config, user: &str) -> Result<bool, ExporterError> {
    let session = CrawlSession::open(config)?;
    validate_user(&session, user).await
}
