//! Per-crawl state owned by the orchestrator

use crate::state::CrawlStatus;
use crate::ExporterError;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// State of a single export, discarded when the crawl finishes or fails
#[derive(Debug)]
pub struct CrawlState {
    user: String,
    status: CrawlStatus,
    total_pages: Option<u32>,
    pages_completed: Arc<AtomicU32>,
    failed_phase: Option<CrawlStatus>,
}

impl CrawlState {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            status: CrawlStatus::NotStarted,
            total_pages: None,
            pages_completed: Arc::new(AtomicU32::new(0)),
            failed_phase: None,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn status(&self) -> CrawlStatus {
        self.status
    }

    /// Page count fixed at the end of discovery
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn pages_completed(&self) -> u32 {
        self.pages_completed.load(Ordering::SeqCst)
    }

    /// Phase the crawl was in when it failed
    pub fn failed_phase(&self) -> Option<CrawlStatus> {
        self.failed_phase
    }

    /// Moves the crawl to `next`, rejecting moves the state machine forbids
    pub fn transition(&mut self, next: CrawlStatus) -> Result<(), ExporterError> {
        if !self.status.can_transition_to(next) {
            return Err(ExporterError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        tracing::debug!(user = %self.user, "crawl {} -> {}", self.status, next);
        if next == CrawlStatus::Failed {
            self.failed_phase = Some(self.status);
        }
        self.status = next;
        Ok(())
    }

    /// Fixes the page count; only allowed once, while discovering
    pub fn set_total_pages(&mut self, total: u32) -> Result<(), ExporterError> {
        if self.status != CrawlStatus::Discovering || self.total_pages.is_some() {
            return Err(ExporterError::InvalidTransition {
                from: self.status,
                to: CrawlStatus::Crawling,
            });
        }
        self.total_pages = Some(total.max(1));
        Ok(())
    }

    /// Shared handle page tasks use to count finished pages
    pub fn progress_counter(&self) -> PageCounter {
        PageCounter {
            completed: Arc::clone(&self.pages_completed),
            total: self.total_pages.unwrap_or(1),
        }
    }
}

/// Atomic completed-pages counter shared with concurrent page tasks
#[derive(Debug, Clone)]
pub struct PageCounter {
    completed: Arc<AtomicU32>,
    total: u32,
}

impl PageCounter {
    /// Records one finished page and returns the new count, never above the total
    pub fn increment(&self) -> u32 {
        let previous = self
            .completed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |done| {
                (done < self.total).then_some(done + 1)
            })
            .unwrap_or(self.total);
        (previous + 1).min(self.total)
    }

    pub fn total(&self) -> u32 {
        self.total
    }
}
