//! Movie detail extraction

use crate::crawler::parser::MovieStub;
use crate::crawler::session::CrawlSession;
use crate::output::MovieRecord;
use crate::url::last_segment;
use crate::ExporterError;

/// Fetches a stub's detail page and builds its record
///
/// Missing fields become `None`; fetch failures and non-2xx responses are
/// errors. The title falls back to the detail URL's slug so it is never empty.
pub async fn extract_movie(
    session: &CrawlSession,
    stub: &MovieStub,
) -> Result<MovieRecord, ExporterError> {
    let details = session.fetch_detail(&stub.detail_url).await?;

    let title = details.title.unwrap_or_else(|| {
        tracing::warn!("No title on {}, using its slug", stub.detail_url);
        last_segment(&stub.detail_url).unwrap_or_else(|| stub.detail_url.to_string())
    });

    Ok(MovieRecord {
        title,
        director: details.director,
        year: details.year,
        rating: stub.rating.clone(),
    })
}
