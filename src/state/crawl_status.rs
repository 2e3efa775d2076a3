/// Crawl status definitions for tracking the progress of one export
///
/// A crawl moves strictly forward through these states; any other move is
/// rejected as an invalid transition.
use std::fmt;

/// Represents the current phase of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlStatus {
    /// Crawl object created, nothing requested yet
    NotStarted,

    /// Checking that the user's profile exists
    ValidatingUser,

    /// Reading the first listing page to learn the page count
    Discovering,

    /// Fetching listing pages and movie detail pages
    Crawling,

    // ===== Terminal States =====
    /// Every page and movie was fetched and extracted
    Completed,

    /// The crawl stopped on an invalid user, vanished page or network error
    Failed,
}

impl CrawlStatus {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if the crawl is issuing requests in this state
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::ValidatingUser | Self::Discovering | Self::Crawling
        )
    }

    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// Every active state may fail; success only follows the forward chain
    /// `NotStarted -> ValidatingUser -> Discovering -> Crawling -> Completed`.
    pub fn can_transition_to(&self, next: CrawlStatus) -> bool {
        match (self, next) {
            (Self::NotStarted, Self::ValidatingUser) => true,
            (Self::ValidatingUser, Self::Discovering) => true,
            (Self::Discovering, Self::Crawling) => true,
            (Self::Crawling, Self::Completed) => true,
            (from, Self::Failed) => from.is_active(),
            _ => false,
        }
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::ValidatingUser => "validating_user",
            Self::Discovering => "discovering",
            Self::Crawling => "crawling",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
