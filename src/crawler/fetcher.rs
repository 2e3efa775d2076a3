//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the exporter, including:
//! - Building the HTTP client with proper user agent and timeouts
//! - GET requests returning the raw response body
//! - A shared permit pool bounding in-flight fetches
//! - Early exit when the crawl has been cancelled
//!
//! The fetcher never retries and never inspects the body.

use crate::config::Config;
use crate::ExporterError;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use filmow_exporter::config::Config;
/// use filmow_exporter::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.crawler.request_timeout))
        .connect_timeout(Duration::from_secs(config.crawler.connect_timeout))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// A response the fetcher accepted: any 2xx, or a 404 kept for its body
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub status: StatusCode,
    pub body: String,
}

impl FetchedPage {
    /// Fails with `Status` unless the response was a 2xx
    pub fn ensure_success(&self) -> Result<(), ExporterError> {
        if self.status.is_success() {
            Ok(())
        } else {
            Err(ExporterError::Status {
                url: self.url.to_string(),
                status: self.status.as_u16(),
            })
        }
    }

    pub fn into_body(self) -> Result<String, ExporterError> {
        self.ensure_success()?;
        Ok(self.body)
    }
}

/// Issues GET requests over one shared client
///
/// Every fetch holds a permit from the shared gate for the duration of the
/// request, so at most `max_concurrent` requests are in flight no matter how
/// many tasks are waiting.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    gate: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl HttpFetcher {
    pub fn new(client: Client, max_concurrent: usize, cancel: CancellationToken) -> Self {
        Self {
            client,
            gate: Arc::new(Semaphore::new(max_concurrent.max(1))),
            cancel,
        }
    }

    /// Fetches a URL and returns the response body
    ///
    /// # Status Handling
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | Body |
    /// | Any other status, 404 included | `Status` error |
    /// | Timeout | `Timeout` error |
    /// | Connection or body failure | `Http` error |
    /// | Crawl cancelled | `Cancelled` |
    pub async fn fetch(&self, url: &Url) -> Result<String, ExporterError> {
        self.fetch_page(url).await?.into_body()
    }

    /// Like [`fetch`](Self::fetch), but a 404 response is returned with its body
    ///
    /// Used for pages where the site may answer a missing profile or listing
    /// with a 404 that still carries its not-found heading. The caller decides
    /// whether such a response is acceptable.
    pub async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, ExporterError> {
        if self.cancel.is_cancelled() {
            return Err(ExporterError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::trace!("Fetch of {} cancelled", url);
                Err(ExporterError::Cancelled)
            }
            result = self.fetch_gated(url) => result,
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    async fn fetch_gated(&self, url: &Url) -> Result<FetchedPage, ExporterError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| ExporterError::Cancelled)?;

        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(ExporterError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify_error(url, e))?;
        Ok(FetchedPage {
            url: url.clone(),
            status,
            body,
        })
    }
}

fn classify_error(url: &Url, error: reqwest::Error) -> ExporterError {
    if error.is_timeout() {
        ExporterError::Timeout {
            url: url.to_string(),
        }
    } else {
        ExporterError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
