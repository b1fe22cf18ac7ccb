//! Robots.txt politeness decorator
//!
//! Every fetch resolves the robots.txt policy of the URL's homepage, refuses
//! disallowed URLs, and spaces requests to a homepage by its declared crawl delay.

use crate::client::{RateLimiter, Response, WebClient};
use crate::robots::RobotsResolver;
use crate::url::get_homepage;
use crate::{CrawlError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// User agent used for robots.txt matching when the wrapped client reports none
pub const WILDCARD_USER_AGENT: &str = "*";

/// A client that enforces robots.txt permissions and crawl delays for each domain independently
///
/// Per-homepage limiters are created lazily the first time a crawl delay is
/// observed and live as long as the client.
pub struct PoliteClient<C> {
    client: C,
    robots: Arc<dyn RobotsResolver>,
    limiters: DashMap<String, Arc<RateLimiter>>,
}

impl<C: WebClient> PoliteClient<C> {
    /// Creates a new PoliteClient
    ///
    /// # Arguments
    ///
    /// * `client` - The client that makes the requests
    /// * `robots` - Resolves the robots.txt policy of a homepage
    pub fn new(client: C, robots: Arc<dyn RobotsResolver>) -> Self {
        Self {
            client,
            robots,
            limiters: DashMap::new(),
        }
    }

    /// Returns the wrapped client
    pub fn inner(&self) -> &C {
        &self.client
    }

    /// Number of homepages with an established crawl-delay limiter
    pub fn limited_homepages(&self) -> usize {
        self.limiters.len()
    }

    fn existing_limiter(&self, homepage: &str) -> Option<Arc<RateLimiter>> {
        self.limiters
            .get(homepage)
            .map(|limiter| Arc::clone(limiter.value()))
    }

    /// Stores a limiter for the homepage unless another fetch already did
    fn establish_limiter(&self, homepage: String, crawl_delay: f64) -> Arc<RateLimiter> {
        let entry = self.limiters.entry(homepage).or_insert_with(|| {
            tracing::debug!("Applying crawl delay of {}s", crawl_delay);
            Arc::new(RateLimiter::from_secs_f64(crawl_delay))
        });
        Arc::clone(entry.value())
    }
}

#[async_trait]
impl<C: WebClient> WebClient for PoliteClient<C> {
    async fn fetch(&self, url: &str) -> Result<Response> {
        let homepage = get_homepage(url)?;
        let robots = self.robots.resolve(&homepage).await?;
        let user_agent = self
            .user_agent()
            .await
            .unwrap_or_else(|| WILDCARD_USER_AGENT.to_string());

        if !robots.is_allowed(url, &user_agent) {
            tracing::info!("URL {} disallowed by robots.txt", url);
            return Err(CrawlError::Disallowed {
                url: url.to_string(),
                user_agent,
            });
        }

        let limiter = match self.existing_limiter(&homepage) {
            Some(limiter) => Some(limiter),
            None => robots
                .crawl_delay(&user_agent)
                .map(|delay| self.establish_limiter(homepage, delay)),
        };

        if let Some(limiter) = limiter {
            limiter.acquire().await;
        }
        self.client.fetch(url).await
    }

    async fn user_agent(&self) -> Option<String> {
        Some(
            self.client
                .user_agent()
                .await
                .unwrap_or_else(|| WILDCARD_USER_AGENT.to_string()),
        )
    }

    async fn close(&self) -> Result<()> {
        self.client.close().await
    }
}
