//! Robots.txt caching implementation
//!
//! This module provides caching functionality for robots.txt files, including
//! expiration after a configurable time to live.

use crate::robots::ParsedRobots;
use chrono::{DateTime, Duration, Utc};

/// Default time to live of a cached robots.txt
pub const DEFAULT_ROBOTS_TTL_HOURS: i64 = 24;

/// Cached robots.txt data for a homepage
///
/// This structure stores parsed robots.txt content along with the timestamp
/// when it was fetched, allowing for cache expiration checks.
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed robots.txt content
    pub content: ParsedRobots,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Creates a new CachedRobots instance stamped with the current time
    pub fn new(content: ParsedRobots) -> Self {
        Self {
            content,
            fetched_at: Utc::now(),
        }
    }

    /// Checks if the cached robots.txt is older than `ttl`
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }

    /// Returns the age of the cached robots.txt
    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }
}
