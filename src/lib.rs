//! Filmow Exporter: watched-movies history exporter
//!
//! This crate crawls a user's "already watched" listing on filmow.com, follows every
//! movie to its detail page and produces one flat record per movie
//! (title, director, release year, user rating).

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for exporter operations
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid user: {user}")]
    InvalidUser { user: String },

    #[error("Listing page {page} vanished during crawl: {url}")]
    PageVanished { page: u32, url: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Crawl cancelled")]
    Cancelled,

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlStatus,
        to: state::CrawlStatus,
    },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExporterError {
    /// Returns true for transport failures, timeouts and unexpected status codes
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Timeout { .. } | Self::Status { .. }
        )
    }

    /// Returns the URL that failed, if the error is tied to one
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::PageVanished { url, .. }
            | Self::Http { url, .. }
            | Self::Timeout { url }
            | Self::Status { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for exporter operations
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{export_user, Orchestrator};
pub use output::MovieRecord;
pub use state::{CrawlState, CrawlStatus};
