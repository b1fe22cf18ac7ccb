//! Crawler module for URL discovery
//!
//! This module contains the core crawling logic, including:
//! - HTML link extraction
//! - The breadth-first discovery algorithm
//! - The crawl session that keeps visited URLs across runs
//! - Assembly of the client chain from configuration

mod breadth;
mod parser;
mod session;

pub use breadth::{BreadthCrawl, CrawlTarget};
pub use parser::{extract_absolute_urls, extract_internal_urls};
pub use session::{CrawlOptions, Crawler};

use crate::client::{BoundedClient, DelayedClient, HttpClient, PoliteClient, WebClient};
use crate::config::{Config, CrawlerConfig};
use crate::robots::{CachingRobotsResolver, HttpRobotsResolver, RobotsResolver};
use crate::sitemap::{HttpSitemapSource, SitemapCache};
use crate::{ConfigError, Result};
use std::collections::HashSet;
use std::sync::Arc;

impl From<&CrawlerConfig> for CrawlOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            limit: config.limit,
            timeout: config.timeout(),
            target: config.target,
            internal_only: config.internal_only,
        }
    }
}

/// Assembles a crawl session from configuration
///
/// The client chain is `PoliteClient -> DelayedClient -> BoundedClient -> HttpClient`,
/// where the politeness layer is present only when robots.txt is respected and
/// the delay layer only when a request delay is configured.
///
/// # Returns
///
/// * `Ok(Crawler)` - A session ready to crawl
/// * `Err(CrawlError)` - The HTTP client could not be built or the configuration is out of range
pub fn build_crawler(config: &Config) -> Result<Crawler> {
    let http = crate::client::build_http_client(&config.user_agent).map_err(|source| {
        ConfigError::Validation(format!("failed to build HTTP client: {}", source))
    })?;
    let user_agent = crate::client::format_user_agent(&config.user_agent);

    let mut client: Box<dyn WebClient> = Box::new(BoundedClient::new(
        HttpClient::with_client(http.clone(), Some(user_agent)),
        config.crawler.max_concurrent_requests,
    )?);

    let request_delay = config.politeness.request_delay();
    if !request_delay.is_zero() {
        tracing::debug!("Spacing requests by {:?}", request_delay);
        client = Box::new(DelayedClient::new(client, request_delay));
    }

    if config.politeness.respect_robots {
        let resolver: Arc<dyn RobotsResolver> = match config.politeness.robots_cache_ttl_secs {
            Some(ttl) => Arc::new(CachingRobotsResolver::new(
                HttpRobotsResolver::new(http.clone()),
                chrono::Duration::seconds(i64::try_from(ttl).unwrap_or(i64::MAX)),
            )),
            None => Arc::new(HttpRobotsResolver::new(http.clone())),
        };
        client = Box::new(PoliteClient::new(client, resolver));
    } else {
        tracing::warn!("robots.txt is not respected");
    }

    let sitemap_cache = if config.sitemap.enabled {
        SitemapCache::new(Arc::new(HttpSitemapSource::new(
            http,
            config.sitemap.use_known_paths,
            config.sitemap.max_depth,
        )))
    } else {
        SitemapCache::disabled()
    };

    Ok(Crawler::new(Arc::from(client), sitemap_cache))
}

/// Runs a complete crawl operation
///
/// This is the main entry point for a one-off crawl. It will:
/// 1. Build the client chain and sitemap source
/// 2. Discover URLs from the configured seeds
/// 3. Release the client
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(HashSet<String>)` - The discovered URLs
/// * `Err(CrawlError)` - The crawl could not be set up
pub async fn crawl(config: Config) -> Result<HashSet<String>> {
    let mut crawler = build_crawler(&config)?;
    let options = CrawlOptions::from(&config.crawler);

    tracing::info!(
        "Crawling from {} seeds (limit: {:?} {}, internal only: {})",
        config.crawler.seeds.len(),
        options.limit,
        options.target,
        options.internal_only
    );

    let discovered = crawler.crawl(config.crawler.seeds.iter().cloned(), &options).await;
    crawler.close().await?;
    Ok(discovered)
}
