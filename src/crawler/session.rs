//! Per-crawl context: the shared HTTP session, parser and cancellation token

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, HttpFetcher};
use crate::crawler::parser::{Listing, MovieDetails, PageParser};
use crate::url::SiteUrls;
use crate::ExporterError;
use reqwest::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Everything one crawl shares between its concurrent tasks
///
/// Opened once at crawl start and handed to every step explicitly. The HTTP
/// client is released when the last handle is dropped, which the orchestrator
/// guarantees happens only after every spawned task has been joined.
#[derive(Debug)]
pub struct CrawlSession {
    fetcher: HttpFetcher,
    parser: PageParser,
    urls: SiteUrls,
}

impl CrawlSession {
    /// Builds a fresh HTTP client and session for one crawl
    pub fn open(config: &Config) -> Result<Arc<Self>, ExporterError> {
        let client = build_http_client(config).map_err(ExporterError::ClientBuild)?;
        Self::with_client(config, client)
    }

    /// Builds a session around an existing client
    pub fn with_client(config: &Config, client: Client) -> Result<Arc<Self>, ExporterError> {
        let urls = SiteUrls::new(&config.site.base_url)?;
        let parser = PageParser::new(urls.clone(), config.site.not_found_heading.clone());
        let fetcher = HttpFetcher::new(
            client,
            config.crawler.max_concurrent_fetches as usize,
            CancellationToken::new(),
        );

        tracing::debug!("HTTP session opened for {}", urls.base());
        Ok(Arc::new(Self {
            fetcher,
            parser,
            urls,
        }))
    }

    pub fn urls(&self) -> &SiteUrls {
        &self.urls
    }

    /// Token every fetch of this crawl observes
    pub fn cancel_token(&self) -> &CancellationToken {
        self.fetcher.cancel_token()
    }

    /// Fetches a profile page and reports whether the profile exists
    ///
    /// The not-found heading means "no such user" whether it is served with a
    /// 2xx or a 404. A 404 without the heading is a `Status` error.
    pub async fn profile_exists(&self, url: &Url) -> Result<bool, ExporterError> {
        let page = self.fetcher.fetch_page(url).await?;
        if !self.parser.profile_exists(&page.body) {
            return Ok(false);
        }
        page.ensure_success()?;
        Ok(true)
    }

    /// Fetches the first listing page and reads its page count
    pub async fn fetch_page_count(&self, url: &Url) -> Result<u32, ExporterError> {
        let html = self.fetcher.fetch(url).await?;
        Ok(self.parser.parse_page_count(&html))
    }

    /// Fetches a listing page; `None` when it shows the not-found heading
    ///
    /// Same status rules as [`profile_exists`](Self::profile_exists).
    pub async fn fetch_listing(&self, url: &Url) -> Result<Option<Listing>, ExporterError> {
        let page = self.fetcher.fetch_page(url).await?;
        let Some(listing) = self.parser.parse_listing(&page.body) else {
            return Ok(None);
        };
        page.ensure_success()?;
        Ok(Some(listing))
    }

    /// Fetches a movie detail page; any non-2xx status is an error
    pub async fn fetch_detail(&self, url: &Url) -> Result<MovieDetails, ExporterError> {
        let html = self.fetcher.fetch(url).await?;
        Ok(self.parser.parse_detail(&html))
    }
}

impl Drop for CrawlSession {
    fn drop(&mut self) {
        tracing::debug!("HTTP session for {} released", self.urls.base());
    }
}
