use crate::crawler::CrawlTarget;
use crate::sitemap::DEFAULT_SITEMAP_MAX_DEPTH;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Crawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub politeness: PolitenessConfig,
    #[serde(default)]
    pub sitemap: SitemapConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// URLs the crawl starts from
    pub seeds: Vec<String>,

    /// Maximum number of targets to crawl or discover
    #[serde(default)]
    pub limit: Option<usize>,

    /// Unit the limit is measured in
    #[serde(default)]
    pub target: CrawlTarget,

    /// Only follow links on the host and port of the page they were found on
    #[serde(default = "default_true")]
    pub internal_only: bool,

    /// Wall-clock budget of the crawl in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Maximum number of requests in flight at once
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl CrawlerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Robots.txt and request spacing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolitenessConfig {
    /// Honor robots.txt permissions and crawl delays
    #[serde(default = "default_true")]
    pub respect_robots: bool,

    /// Minimum time between any two requests (milliseconds)
    #[serde(default)]
    pub request_delay_ms: u64,

    /// How long a fetched robots.txt is reused; absent to fetch it for every request
    #[serde(default)]
    pub robots_cache_ttl_secs: Option<u64>,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            respect_robots: true,
            request_delay_ms: 0,
            robots_cache_ttl_secs: None,
        }
    }
}

impl PolitenessConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// Sitemap seeding configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SitemapConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Also look for sitemaps at well-known paths
    #[serde(default)]
    pub use_known_paths: bool,

    /// Levels of sitemap indexes to follow
    #[serde(default = "default_sitemap_max_depth")]
    pub max_depth: usize,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            use_known_paths: false,
            max_depth: DEFAULT_SITEMAP_MAX_DEPTH,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
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

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent_requests() -> usize {
    16
}

fn default_sitemap_max_depth() -> usize {
    DEFAULT_SITEMAP_MAX_DEPTH
}
