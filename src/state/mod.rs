//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlStatus`: The phase a crawl is in (validating, discovering, crawling, ...)
//! - `CrawlState`: Per-crawl bookkeeping, including the atomic completed-pages counter

mod crawl_state;
mod crawl_status;

// Re-export main types
pub use crawl_state::{CrawlState, PageCounter};
pub use crawl_status::CrawlStatus;
