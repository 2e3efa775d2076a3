//! Listing page crawler

use crate::crawler::parser::{Listing, MovieStub};
use crate::crawler::session::CrawlSession;
use crate::ExporterError;

/// Enumerates the movie stubs of one listing page, in document order
///
/// A page showing the not-found heading fails with `PageVanished`: the page
/// count discovered earlier no longer matches the site.
pub async fn crawl_page(
    session: &CrawlSession,
    user: &str,
    page: u32,
) -> Result<Vec<MovieStub>, ExporterError> {
    let url = session.urls().listing_url(user, page);

    let Some(Listing { stubs, skipped }) = session.fetch_listing(&url).await? else {
        return Err(ExporterError::PageVanished {
            page,
            url: url.to_string(),
        });
    };

    if skipped > 0 {
        tracing::warn!(
            "Skipped {} entries without a movie link on page {}",
            skipped,
            page
        );
    }
    tracing::debug!("Page {} lists {} movies", page, stubs.len());
    Ok(stubs)
}
