//! Configuration module for Filmow Exporter
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so running without a file is equivalent to an
//! empty configuration.
//!
//! # Example
//!
//! ```no_run
//! use filmow_exporter::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("exporter.toml")).unwrap();
//! println!("Fetching from: {}", config.site.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
