use serde::Deserialize;

/// Canonical heading the site renders for any nonexistent resource
pub const DEFAULT_NOT_FOUND_HEADING: &str = "Vixi! - Página não encontrada";

/// Main configuration structure for Filmow Exporter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL every profile, listing and detail link is resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Top-level heading text that marks a missing user or page
    #[serde(rename = "not-found-heading")]
    pub not_found_heading: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://filmow.com".to_string(),
            not_found_heading: DEFAULT_NOT_FOUND_HEADING.to_string(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of fetches in flight across all pages and movies
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// Total request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout")]
    pub connect_timeout: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 16,
            request_timeout: 30,
            connect_timeout: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "filmow-exporter".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/filmow-exporter/filmow-exporter".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the `<user>.csv` file is written to
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
        }
    }
}
