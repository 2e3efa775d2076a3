//! Listing page count discovery

use crate::crawler::session::CrawlSession;
use crate::ExporterError;

/// Determines how many listing pages `user` has
///
/// Reads the pagination control of the first listing page. Any structural
/// anomaly falls back to a single page; only fetch failures are errors.
/// Under-counting is not corrected later in the crawl.
pub async fn discover_page_count(session: &CrawlSession, user: &str) -> Result<u32, ExporterError> {
    let url = session.urls().listing_url(user, 1);

    let total_pages = session.fetch_page_count(&url).await?;

    tracing::info!("User '{}' has {} listing page(s)", user, total_pages);
    Ok(total_pages)
}
