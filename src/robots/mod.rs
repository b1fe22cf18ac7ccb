//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! A [`RobotsResolver`] turns a homepage into a [`ParsedRobots`] permission checker;
//! the politeness layer consults it before every request.

mod cache;
mod parser;

pub use cache::{CachedRobots, DEFAULT_ROBOTS_TTL_HOURS};
pub use parser::ParsedRobots;

use crate::{CrawlError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::{Client, StatusCode};

/// Retrieves the robots.txt policy of a website
#[async_trait]
pub trait RobotsResolver: Send + Sync {
    /// Resolves the policy for a homepage (`scheme://host[:port]/`)
    async fn resolve(&self, homepage: &str) -> Result<ParsedRobots>;
}

#[async_trait]
impl<T: RobotsResolver + ?Sized> RobotsResolver for std::sync::Arc<T> {
    async fn resolve(&self, homepage: &str) -> Result<ParsedRobots> {
        (**self).resolve(homepage).await
    }
}

/// Fetches robots.txt over HTTP on every resolution
pub struct HttpRobotsResolver {
    client: Client,
}

impl HttpRobotsResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Maps a robots.txt response status to a policy when there is no usable body
///
/// * 401/403 - access to the rules is denied, so everything is disallowed
/// * other 4xx - the site has no rules, so everything is allowed
/// * 5xx - the site is unavailable, so everything is disallowed
fn policy_for_status(status: StatusCode) -> ParsedRobots {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ParsedRobots::disallow_all()
    } else if status.is_client_error() {
        ParsedRobots::allow_all()
    } else {
        ParsedRobots::disallow_all()
    }
}

#[async_trait]
impl RobotsResolver for HttpRobotsResolver {
    async fn resolve(&self, homepage: &str) -> Result<ParsedRobots> {
        let robots_url = crate::url::get_robots(homepage)?;
        tracing::debug!("Fetching robots.txt: {}", robots_url);

        let response = self
            .client
            .get(&robots_url)
            .send()
            .await
            .map_err(|e| CrawlError::Robots {
                homepage: homepage.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("robots.txt for {} returned {}", homepage, status);
            return Ok(policy_for_status(status));
        }

        let body = response.text().await.map_err(|e| CrawlError::Robots {
            homepage: homepage.to_string(),
            message: e.to_string(),
        })?;

        Ok(ParsedRobots::from_content(&body))
    }
}

/// Memoizes another resolver per homepage for a limited time
pub struct CachingRobotsResolver<R> {
    resolver: R,
    ttl: chrono::Duration,
    entries: DashMap<String, CachedRobots>,
}

impl<R: RobotsResolver> CachingRobotsResolver<R> {
    /// Creates a caching resolver
    ///
    /// # Arguments
    ///
    /// * `resolver` - The resolver used on a cache miss or for a stale entry
    /// * `ttl` - How long a resolved policy stays fresh
    pub fn new(resolver: R, ttl: chrono::Duration) -> Self {
        Self {
            resolver,
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Number of homepages currently cached
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl<R: RobotsResolver> RobotsResolver for CachingRobotsResolver<R> {
    async fn resolve(&self, homepage: &str) -> Result<ParsedRobots> {
        let fresh = self
            .entries
            .get(homepage)
            .filter(|cached| !cached.is_stale(self.ttl))
            .map(|cached| cached.content.clone());
        if let Some(robots) = fresh {
            tracing::trace!("Using cached robots.txt for {}", homepage);
            return Ok(robots);
        }

        let robots = self.resolver.resolve(homepage).await?;
        self.entries
            .insert(homepage.to_string(), CachedRobots::new(robots.clone()));
        Ok(robots)
    }
}
