//! Sumi-Crawl: a polite, embeddable URL discovery engine
//!
//! This crate implements a breadth-first crawler that discovers URLs from a set of
//! seeds, respecting robots.txt permissions, per-domain crawl delays and global
//! request spacing, and deduplicating work across repeated runs of one session.

pub mod client;
pub mod config;
pub mod crawler;
pub mod robots;
pub mod sitemap;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} disallowed by robots.txt for user agent '{user_agent}'")]
    Disallowed { url: String, user_agent: String },

    #[error("Failed to retrieve robots.txt for {homepage}: {message}")]
    Robots { homepage: String, message: String },

    #[error("Fetch task failed: {0}")]
    Task(String),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),
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

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Sumi-Crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use client::{fetch_multiple, FetchStream, Response, WebClient};
pub use config::Config;
pub use crawler::{BreadthCrawl, CrawlOptions, CrawlTarget, Crawler};
pub use crate::sitemap::SitemapCache;
