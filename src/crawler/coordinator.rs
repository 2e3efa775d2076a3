//! Crawl orchestration
//!
//! This module drives one export through its phases:
//! - Validating that the user exists
//! - Discovering the number of listing pages
//! - Crawling every listing page and every movie on it concurrently
//! - Flattening the records in page order, then document order

use crate::config::Config;
use crate::crawler::detail::extract_movie;
use crate::crawler::discovery::discover_page_count;
use crate::crawler::listing::crawl_page;
use crate::crawler::pool::run_ordered;
use crate::crawler::session::CrawlSession;
use crate::crawler::validator::validate_user;
use crate::output::MovieRecord;
use crate::state::{CrawlState, CrawlStatus, PageCounter};
use crate::ExporterError;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Progress events emitted while a crawl runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlProgress {
    /// Discovery finished; the page count is now fixed
    PagesDiscovered { total: u32 },

    /// A listing page and all of its movies were extracted
    PageCompleted { page: u32, completed: u32, total: u32 },
}

/// Drives a single user's crawl through its state machine
pub struct Orchestrator {
    config: Arc<Config>,
    state: CrawlState,
    progress: Option<UnboundedSender<CrawlProgress>>,
}

impl Orchestrator {
    pub fn new(config: Config, user: impl Into<String>) -> Self {
        Self {
            config: Arc::new(config),
            state: CrawlState::new(user),
            progress: None,
        }
    }

    /// Sends progress events to `sender` while crawling
    pub fn with_progress(mut self, sender: UnboundedSender<CrawlProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Runs the crawl to completion or failure
    ///
    /// The HTTP session is opened once validation starts and released before
    /// returning on every path, including an invalid user. On failure the
    /// state records the phase that failed and the error is logged with the
    /// failing URL.
    ///
    /// # Returns
    ///
    /// * `Ok(records)` - Every movie, ordered by page then by position on the page
    /// * `Err(ExporterError::InvalidUser)` - The profile does not exist
    /// * `Err(_)` - The first `PageVanished` or network error observed
    pub async fn run(&mut self) -> Result<Vec<MovieRecord>, ExporterError> {
        let result = self.run_phases().await;

        if let Err(error) = &result {
            self.fail(error);
        }
        result
    }

    async fn run_phases(&mut self) -> Result<Vec<MovieRecord>, ExporterError> {
        let user = self.state.user().to_string();

        self.state.transition(CrawlStatus::ValidatingUser)?;
        // Dropped when this returns; every task holding a clone is joined by then
        let session = CrawlSession::open(&self.config)?;
        if !validate_user(&session, &user).await? {
            return Err(ExporterError::InvalidUser { user });
        }

        self.state.transition(CrawlStatus::Discovering)?;
        let total_pages = discover_page_count(&session, &user).await?;
        self.state.set_total_pages(total_pages)?;
        self.notify(CrawlProgress::PagesDiscovered { total: total_pages });

        self.state.transition(CrawlStatus::Crawling)?;
        let counter = self.state.progress_counter();
        let page_tasks = (1..=total_pages).map(|page| {
            crawl_page_records(
                Arc::clone(&session),
                user.clone(),
                page,
                counter.clone(),
                self.progress.clone(),
            )
        });
        let pages = run_ordered(page_tasks, session.cancel_token()).await?;

        let records: Vec<MovieRecord> = pages.into_iter().flatten().collect();
        self.state.transition(CrawlStatus::Completed)?;
        tracing::info!(
            "Crawl of '{}' completed: {} movies on {} page(s)",
            user,
            records.len(),
            total_pages
        );
        Ok(records)
    }

    fn fail(&mut self, error: &ExporterError) {
        let phase = self.state.status();
        if phase.is_active() {
            // Active states can always fail
            let _ = self.state.transition(CrawlStatus::Failed);
        }

        match error {
            ExporterError::InvalidUser { user } => {
                tracing::warn!("Crawl stopped: user '{}' does not exist", user)
            }
            _ => tracing::error!(
                phase = %phase,
                url = error.url().unwrap_or("-"),
                "Crawl of '{}' failed: {}",
                self.state.user(),
                error
            ),
        }
    }

    fn notify(&self, event: CrawlProgress) {
        if let Some(sender) = &self.progress {
            // A dropped receiver only means nobody is watching
            let _ = sender.send(event);
        }
    }
}

/// One page task: list the page, then extract each of its movies concurrently
async fn crawl_page_records(
    session: Arc<CrawlSession>,
    user: String,
    page: u32,
    counter: PageCounter,
    progress: Option<UnboundedSender<CrawlProgress>>,
) -> Result<Vec<MovieRecord>, ExporterError> {
    let stubs = crawl_page(&session, &user, page).await?;

    let movie_tasks = stubs.into_iter().map(|stub| {
        let session = Arc::clone(&session);
        async move { extract_movie(&session, &stub).await }
    });
    let records = run_ordered(movie_tasks, session.cancel_token()).await?;

    let completed = counter.increment();
    tracing::info!(
        "Page {}/{} done ({} completed)",
        page,
        counter.total(),
        completed
    );
    if let Some(sender) = &progress {
        let _ = sender.send(CrawlProgress::PageCompleted {
            page,
            completed,
            total: counter.total(),
        });
    }

    Ok(records)
}
